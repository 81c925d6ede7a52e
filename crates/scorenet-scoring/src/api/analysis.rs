//! Explanations and indictments.
//!
//! [`ScoreExplanation`] answers "which constraints cost what", and
//! [`IndictmentMap`] answers "which facts cost what". Both are snapshots
//! taken from a session after its queued changes were propagated.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use scorenet_core::{ConstraintRef, Fact, Score};

use crate::value::Value;

/// A tuple element as seen from outside the network.
///
/// Equality and hashing follow the underlying [`Value`]: a fact is
/// identified by its id, so an old and a new version of the same fact
/// compare equal.
#[derive(Clone)]
pub struct EntityRef {
    /// Full type name, e.g. `my_crate::Shift`.
    pub type_name: String,
    /// `Debug` rendering of the element.
    pub display: String,
    value: Value,
}

impl EntityRef {
    pub(crate) fn from_value(value: &Value) -> Self {
        Self {
            type_name: value.type_name().to_string(),
            display: format!("{value:?}"),
            value: value.clone(),
        }
    }

    pub fn as_entity<T: 'static>(&self) -> Option<&T> {
        self.value.get::<T>()
    }

    /// False for group keys, collector results and mapped values.
    pub fn is_fact(&self) -> bool {
        self.value.is_fact()
    }

    /// Type name without its module path.
    pub fn short_type_name(&self) -> &str {
        match self.type_name.rfind("::") {
            Some(pos) => &self.type_name[pos + 2..],
            None => &self.type_name,
        }
    }

    fn refers_to<T: Fact>(&self, fact: &T) -> bool {
        self.is_fact()
            && self
                .as_entity::<T>()
                .is_some_and(|own| own.fact_id() == fact.fact_id())
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.short_type_name(), self.display)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

/// The elements of a matching tuple and a description of the match.
#[derive(Debug, Clone)]
pub struct ConstraintJustification {
    pub entities: Vec<EntityRef>,
    pub description: String,
}

impl ConstraintJustification {
    /// Describes the match by listing its elements.
    pub fn new(entities: Vec<EntityRef>) -> Self {
        let description = match entities.split_first() {
            None => "No entities".to_string(),
            Some((first, rest)) => rest.iter().fold(first.display.clone(), |mut text, e| {
                text.push_str(", ");
                text.push_str(&e.display);
                text
            }),
        };
        Self::with_description(entities, description)
    }

    pub fn with_description(entities: Vec<EntityRef>, description: String) -> Self {
        Self {
            entities,
            description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetailedConstraintMatch<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Weighted impact of this one match.
    pub score: Sc,
    pub justification: ConstraintJustification,
}

impl<Sc: Score> DetailedConstraintMatch<Sc> {
    pub fn new(constraint_ref: ConstraintRef, score: Sc, justification: ConstraintJustification) -> Self {
        Self {
            constraint_ref,
            score,
            justification,
        }
    }

    /// Distinct facts of the match, in tuple order.
    fn distinct_facts(&self) -> Vec<&EntityRef> {
        let mut facts: Vec<&EntityRef> = Vec::with_capacity(self.justification.entities.len());
        for entity in &self.justification.entities {
            if entity.is_fact() && !facts.contains(&entity) {
                facts.push(entity);
            }
        }
        facts
    }
}

/// One constraint's share of the score.
#[derive(Debug, Clone)]
pub struct ConstraintAnalysis<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Effective weight after overrides and configuration.
    pub weight: Sc,
    pub score: Sc,
    /// Known even when `matches` is not recorded.
    pub match_count: usize,
    /// Empty unless justifications are enabled.
    pub matches: Vec<DetailedConstraintMatch<Sc>>,
    pub is_hard: bool,
}

impl<Sc: Score> ConstraintAnalysis<Sc> {
    pub fn new(
        constraint_ref: ConstraintRef,
        weight: Sc,
        score: Sc,
        match_count: usize,
        matches: Vec<DetailedConstraintMatch<Sc>>,
        is_hard: bool,
    ) -> Self {
        Self {
            constraint_ref,
            weight,
            score,
            match_count,
            matches,
            is_hard,
        }
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

/// The score broken down per constraint, in declaration order.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    pub score: Sc,
    pub constraint_analyses: Vec<ConstraintAnalysis<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn new(score: Sc, constraint_analyses: Vec<ConstraintAnalysis<Sc>>) -> Self {
        Self {
            score,
            constraint_analyses,
        }
    }

    pub fn total_match_count(&self) -> usize {
        self.constraint_analyses.iter().map(ConstraintAnalysis::match_count).sum()
    }

    /// Constraints that currently contribute to the score.
    pub fn non_zero_constraints(&self) -> Vec<&ConstraintAnalysis<Sc>> {
        self.constraint_analyses
            .iter()
            .filter(|analysis| !analysis.score.is_zero())
            .collect()
    }

    /// Looks up a constraint by full name (`package/name`, or `name`
    /// without a package).
    pub fn constraint(&self, full_name: &str) -> Option<&ConstraintAnalysis<Sc>> {
        self.constraint_analyses
            .iter()
            .find(|analysis| analysis.constraint_ref.full_name() == full_name)
    }

    pub fn all_matches(&self) -> Vec<&DetailedConstraintMatch<Sc>> {
        self.constraint_analyses
            .iter()
            .flat_map(|analysis| analysis.matches.iter())
            .collect()
    }
}

/// One line for the score, then one per contributing constraint.
impl<Sc: Score> fmt::Display for ScoreExplanation<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {}", self.score)?;
        for analysis in self.non_zero_constraints() {
            write!(
                f,
                "\n  {}: {} ({} matches)",
                analysis.constraint_ref.full_name(),
                analysis.score,
                analysis.match_count
            )?;
        }
        Ok(())
    }
}

/// Everything one fact is blamed for.
#[derive(Debug, Clone)]
pub struct Indictment<Sc: Score> {
    pub entity: EntityRef,
    /// Sum of the impacts of `matches`.
    pub score: Sc,
    pub matches: Vec<DetailedConstraintMatch<Sc>>,
}

impl<Sc: Score> Indictment<Sc> {
    fn empty(entity: EntityRef) -> Self {
        Self {
            entity,
            score: Sc::zero(),
            matches: Vec::new(),
        }
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Constraints with at least one match involving this fact.
    pub fn violated_constraints(&self) -> Vec<&ConstraintRef> {
        let mut refs: Vec<&ConstraintRef> = Vec::new();
        for m in &self.matches {
            if !refs.contains(&&m.constraint_ref) {
                refs.push(&m.constraint_ref);
            }
        }
        refs
    }

    pub fn constraint_count(&self) -> usize {
        self.violated_constraints().len()
    }

    /// The matches of one constraint involving this fact.
    pub fn matches_of<'a>(
        &'a self,
        constraint_ref: &'a ConstraintRef,
    ) -> impl Iterator<Item = &'a DetailedConstraintMatch<Sc>> + 'a {
        self.matches
            .iter()
            .filter(move |m| &m.constraint_ref == constraint_ref)
    }
}

/// Per-fact indictments.
///
/// Derived values such as group keys are never indicted. A fact that
/// occurs twice in one match is blamed for it once.
#[derive(Debug, Clone)]
pub struct IndictmentMap<Sc: Score> {
    by_entity: HashMap<EntityRef, Indictment<Sc>>,
}

impl<Sc: Score> IndictmentMap<Sc> {
    pub fn from_matches(matches: Vec<DetailedConstraintMatch<Sc>>) -> Self {
        let mut by_entity: HashMap<EntityRef, Indictment<Sc>> = HashMap::new();
        for m in &matches {
            for fact in m.distinct_facts() {
                let indictment = by_entity
                    .entry(fact.clone())
                    .or_insert_with(|| Indictment::empty(fact.clone()));
                indictment.score = indictment.score + m.score;
                indictment.matches.push(m.clone());
            }
        }
        Self { by_entity }
    }

    pub fn get(&self, entity: &EntityRef) -> Option<&Indictment<Sc>> {
        self.by_entity.get(entity)
    }

    /// Looks up a fact by id, whichever version of it is passed.
    pub fn get_fact<T: Fact>(&self, fact: &T) -> Option<&Indictment<Sc>> {
        self.by_entity
            .values()
            .find(|indictment| indictment.entity.refers_to(fact))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indictment<Sc>> {
        self.by_entity.values()
    }

    /// Facts ordered from the most to the least harmful.
    pub fn worst_entities(&self) -> Vec<&EntityRef> {
        let mut ranked: Vec<&Indictment<Sc>> = self.by_entity.values().collect();
        ranked.sort_by(|a, b| a.score.cmp(&b.score));
        ranked.into_iter().map(|indictment| &indictment.entity).collect()
    }

    pub fn len(&self) -> usize {
        self.by_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }
}

impl<Sc: Score> Default for IndictmentMap<Sc> {
    fn default() -> Self {
        Self {
            by_entity: HashMap::new(),
        }
    }
}

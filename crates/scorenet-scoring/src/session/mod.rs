//! Score sessions.
//!
//! A [`ScoreSession`] owns the mutable state of one network: node memories,
//! tuples and the tracked facts. Mutations only queue work at the source
//! nodes; [`ScoreSession::calculate_score`] propagates it.

#[cfg(test)]
mod tests;

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use smallvec::{smallvec, SmallVec};
use tracing::{debug, error, trace};

use scorenet_core::{ConstraintRef, Fact, Result, Score, ScoreNetError};

use crate::api::{
    ConstraintAnalysis, ConstraintJustification, DetailedConstraintMatch, EntityRef,
    IndictmentMap, ScoreExplanation,
};
use crate::network::{flush, ConstraintEntry, NetworkTemplate};
use crate::node::{Node, NodeContext, NodeId, NodeKind, TerminalNode};
use crate::tuple::{TupleArena, TupleId, TupleState};
use crate::value::Value;

/// Where a session stands between flushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Every change has been propagated.
    Idle,
    /// Changes are queued and will propagate on the next score calculation.
    Dirty,
    /// A flush failed; the session refuses further work.
    Corrupted,
}

/// Identity of a tracked fact: its type and declared id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FactKey {
    type_id: TypeId,
    id: Value,
}

impl FactKey {
    fn of<T: Fact>(id: &T::Id) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            id: Value::key(id.clone()),
        }
    }
}

struct Tracked {
    value: Value,
    type_name: &'static str,
    /// The tuples of this fact, one per source node of its type.
    tuples: SmallVec<[(NodeId, TupleId); 1]>,
}

/// Incrementally maintained score over a changing set of facts.
///
/// # Example
///
/// ```
/// use scorenet_config::NetworkConfig;
/// use scorenet_core::{HardSoftScore, PlanningId};
/// use scorenet_scoring::stream::joiner::equal;
/// use scorenet_scoring::stream::ConstraintFactory;
/// use scorenet_scoring::NetworkTemplate;
///
/// #[derive(Debug, Clone)]
/// struct Lesson { id: u32, room: &'static str }
///
/// impl PlanningId for Lesson {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
///
/// let factory = ConstraintFactory::<HardSoftScore>::new();
/// let conflict = factory
///     .for_each_unique_pair::<Lesson>(equal(|l: &Lesson| l.room))
///     .penalize(HardSoftScore::of_hard(1))
///     .as_constraint("Room conflict");
///
/// let template = NetworkTemplate::build(vec![conflict], &NetworkConfig::default()).unwrap();
/// let mut session = template.new_session().unwrap();
/// session.insert(Lesson { id: 1, room: "A" }).unwrap();
/// session.insert(Lesson { id: 2, room: "A" }).unwrap();
/// assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_hard(-1));
///
/// session.update(Lesson { id: 2, room: "B" }).unwrap();
/// assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);
/// ```
pub struct ScoreSession<Sc: Score> {
    template: NetworkTemplate<Sc>,
    nodes: Vec<Node<Sc>>,
    tuples: TupleArena,
    facts: HashMap<FactKey, Tracked>,
    state: SessionState,
    /// Cleared for the scratch sessions built by full assertion.
    self_checks: bool,
}

impl<Sc: Score> ScoreSession<Sc> {
    pub(crate) fn new(template: NetworkTemplate<Sc>) -> Result<Self> {
        let nodes = instantiate(&template)?;
        Ok(Self {
            template,
            nodes,
            tuples: TupleArena::new(),
            facts: HashMap::new(),
            state: SessionState::Idle,
            self_checks: true,
        })
    }

    pub fn template(&self) -> &NetworkTemplate<Sc> {
        &self.template
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of tracked facts.
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Number of live tuples across all nodes.
    pub fn tuple_count(&self) -> usize {
        self.tuples.len()
    }

    /// Returns true if a fact of type `T` with this id is tracked.
    pub fn contains<T: Fact>(&self, id: &T::Id) -> bool {
        self.facts.contains_key(&FactKey::of::<T>(id))
    }

    /// Returns the tracked state of a fact.
    pub fn get<T: Fact>(&self, id: &T::Id) -> Option<&T> {
        self.facts
            .get(&FactKey::of::<T>(id))
            .and_then(|tracked| tracked.value.get::<T>())
    }

    /// Starts tracking a fact.
    ///
    /// # Errors
    ///
    /// [`ScoreNetError::FactAlreadyTracked`] if a fact of the same type and
    /// id is tracked.
    pub fn insert<T: Fact>(&mut self, fact: T) -> Result<()> {
        self.ensure_usable()?;
        let key = FactKey::of::<T>(&fact.fact_id());
        if self.facts.contains_key(&key) {
            return Err(ScoreNetError::FactAlreadyTracked {
                type_name: type_name::<T>(),
                id: format!("{:?}", fact.fact_id()),
            });
        }
        self.insert_value(key, Value::fact(fact), type_name::<T>());
        Ok(())
    }

    /// Replaces the state of a tracked fact.
    ///
    /// # Errors
    ///
    /// [`ScoreNetError::FactNotTracked`] if no fact with this id is tracked.
    pub fn update<T: Fact>(&mut self, fact: T) -> Result<()> {
        self.ensure_usable()?;
        let key = FactKey::of::<T>(&fact.fact_id());
        let Some(tracked) = self.facts.get_mut(&key) else {
            return Err(not_tracked::<T>(&fact.fact_id()));
        };
        let value = Value::fact(fact);
        tracked.value = value.clone();
        let mut result = Ok(());
        for &(source, tuple) in &tracked.tuples {
            let node = &mut self.nodes[source.0];
            let width = node.downstream.len();
            result = NodeContext::new(&mut self.tuples, &mut node.queue, width)
                .refresh_out(tuple, smallvec![value.clone()]);
            if result.is_err() {
                break;
            }
        }
        self.state = SessionState::Dirty;
        result.map_err(|e| self.corrupt(e))
    }

    /// Stops tracking a fact.
    ///
    /// # Errors
    ///
    /// [`ScoreNetError::FactNotTracked`] if no fact with this id is tracked.
    pub fn retract<T: Fact>(&mut self, fact: &T) -> Result<()> {
        self.ensure_usable()?;
        let Some(tracked) = self.facts.remove(&FactKey::of::<T>(&fact.fact_id())) else {
            return Err(not_tracked::<T>(&fact.fact_id()));
        };
        self.state = SessionState::Dirty;
        for (source, tuple) in tracked.tuples {
            let node = &mut self.nodes[source.0];
            let width = node.downstream.len();
            let result = NodeContext::new(&mut self.tuples, &mut node.queue, width).retract_out(tuple);
            if let Err(e) = result {
                return Err(self.corrupt(e));
            }
        }
        Ok(())
    }

    /// Propagates queued changes and returns the total score.
    ///
    /// # Errors
    ///
    /// Any error raised while propagating corrupts the session; later calls
    /// return [`ScoreNetError::SessionCorrupted`].
    pub fn calculate_score(&mut self) -> Result<Sc> {
        self.ensure_usable()?;
        if self.state == SessionState::Dirty {
            let topology = self.template.topology();
            let stats = match flush(&mut self.nodes, &topology.layers, &mut self.tuples) {
                Ok(stats) => stats,
                Err(e) => return Err(self.corrupt(e)),
            };
            trace!(
                event = "flush",
                inserts = stats.inserts,
                updates = stats.updates,
                retracts = stats.retracts,
                visited = stats.visited,
                tuples = self.tuples.len(),
            );
            self.state = SessionState::Idle;

            let mode = self.template.config().environment_mode;
            if self.self_checks && mode.is_asserted() {
                if let Err(e) = self.assert_consistency(mode.is_fully_asserted()) {
                    return Err(self.corrupt(e));
                }
            }
        }
        self.total()
    }

    /// Breaks the score down per constraint.
    ///
    /// The matches of each constraint are listed only when justifications
    /// are enabled in the network configuration.
    pub fn explain(&mut self) -> Result<ScoreExplanation<Sc>> {
        let score = self.calculate_score()?;
        let detailed = self.template.config().justifications;
        let analyses = self
            .template
            .topology()
            .constraints
            .iter()
            .map(|entry| {
                let terminal = self.terminal(entry)?;
                let matches = if detailed {
                    self.constraint_matches(entry)?
                } else {
                    Vec::new()
                };
                Ok(ConstraintAnalysis::new(
                    entry.spec.constraint_ref.clone(),
                    entry.spec.weight,
                    terminal.total(),
                    terminal.match_count(),
                    matches,
                    entry.is_hard,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ScoreExplanation::new(score, analyses))
    }

    /// Sums the impact of every match per fact.
    pub fn indictments(&mut self) -> Result<IndictmentMap<Sc>> {
        self.calculate_score()?;
        let mut matches = Vec::new();
        for entry in &self.template.topology().constraints {
            matches.extend(self.constraint_matches(entry)?);
        }
        Ok(IndictmentMap::from_matches(matches))
    }

    /// Total of one constraint by full name, after propagating queued
    /// changes.
    pub fn constraint_score(&mut self, full_name: &str) -> Result<Option<Sc>> {
        self.calculate_score()?;
        self.template
            .topology()
            .constraints
            .iter()
            .find(|entry| entry.spec.constraint_ref.full_name() == full_name)
            .map(|entry| self.terminal(entry).map(TerminalNode::total))
            .transpose()
    }

    /// Forgets every fact, keeping the network.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_usable()?;
        self.nodes = instantiate(&self.template)?;
        self.tuples.clear();
        self.facts.clear();
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Ends the session, releasing its tuples and node memories.
    pub fn close(self) {
        debug!(
            event = "session_closed",
            facts = self.facts.len(),
            tuples = self.tuples.len(),
        );
    }

    fn insert_value(&mut self, key: FactKey, value: Value, type_name: &'static str) {
        let mut tuples = SmallVec::new();
        if let Some(sources) = self.template.topology().sources.get(&key.type_id) {
            for &source in sources {
                let node = &mut self.nodes[source.0];
                let width = node.downstream.len();
                let tuple = NodeContext::new(&mut self.tuples, &mut node.queue, width)
                    .insert_out(smallvec![value.clone()]);
                tuples.push((source, tuple));
            }
        }
        self.facts.insert(
            key,
            Tracked {
                value,
                type_name,
                tuples,
            },
        );
        self.state = SessionState::Dirty;
    }

    fn ensure_usable(&self) -> Result<()> {
        match self.state {
            SessionState::Corrupted => Err(ScoreNetError::SessionCorrupted),
            _ => Ok(()),
        }
    }

    fn corrupt(&mut self, err: ScoreNetError) -> ScoreNetError {
        error!(event = "session_corrupted", error = %err);
        self.state = SessionState::Corrupted;
        err
    }

    fn total(&self) -> Result<Sc> {
        let mut total = Sc::zero();
        for entry in &self.template.topology().constraints {
            total = total
                .checked_add(&self.terminal(entry)?.total())
                .ok_or_else(|| entry.spec.overflow())?;
        }
        Ok(total)
    }

    fn terminal(&self, entry: &ConstraintEntry<Sc>) -> Result<&TerminalNode<Sc>> {
        match &self.nodes[entry.terminal.0].kind {
            NodeKind::Terminal(terminal) => Ok(terminal),
            _ => Err(ScoreNetError::Internal(format!(
                "node {} of constraint '{}' is not a terminal",
                entry.terminal, entry.spec.constraint_ref
            ))),
        }
    }

    /// The matches of one constraint, ordered by tuple.
    fn constraint_matches(&self, entry: &ConstraintEntry<Sc>) -> Result<Vec<DetailedConstraintMatch<Sc>>> {
        let mut matches: Vec<(TupleId, Sc)> = self.terminal(entry)?.matches().collect();
        matches.sort_by_key(|(tuple, _)| *tuple);
        matches
            .into_iter()
            .map(|(tuple, impact)| {
                let facts = self.tuples.facts(tuple)?;
                let entities = facts.iter().map(EntityRef::from_value).collect();
                let justification = match &entry.spec.justifier {
                    Some(justify) => ConstraintJustification::with_description(entities, justify(facts)),
                    None => ConstraintJustification::new(entities),
                };
                Ok(DetailedConstraintMatch::new(
                    entry.spec.constraint_ref.clone(),
                    impact,
                    justification,
                ))
            })
            .collect()
    }

    /// Checks the running totals against the recorded matches and, when
    /// `full`, the score against a session rebuilt from the tracked facts.
    fn assert_consistency(&self, full: bool) -> Result<()> {
        if let Some((tuple, t)) = self.tuples.iter().find(|(_, t)| t.state != TupleState::Ok) {
            return Err(ScoreNetError::Internal(format!(
                "tuple {} left in state {} after a flush",
                tuple, t.state
            )));
        }
        for entry in &self.template.topology().constraints {
            let terminal = self.terminal(entry)?;
            let recounted = terminal.recount()?;
            if recounted != terminal.total() {
                return Err(drift(&entry.spec.constraint_ref, terminal.total(), recounted));
            }
        }
        if full {
            let mut scratch = ScoreSession::new(self.template.clone())?;
            scratch.self_checks = false;
            for (key, tracked) in &self.facts {
                scratch.insert_value(key.clone(), tracked.value.clone(), tracked.type_name);
            }
            let expected = scratch.calculate_score()?;
            let actual = self.total()?;
            if expected != actual {
                return Err(ScoreNetError::Internal(format!(
                    "score corruption: incremental score {} but {} when calculated from scratch",
                    actual, expected
                )));
            }
        }
        Ok(())
    }
}

impl<Sc: Score> fmt::Debug for ScoreSession<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreSession")
            .field("state", &self.state)
            .field("facts", &self.facts.len())
            .field("tuples", &self.tuples.len())
            .finish()
    }
}

fn instantiate<Sc: Score>(template: &NetworkTemplate<Sc>) -> Result<Vec<Node<Sc>>> {
    template
        .topology()
        .nodes
        .iter()
        .map(|node| {
            Ok(Node {
                kind: NodeKind::instantiate(&node.spec, &node.input_slots)?,
                downstream: node.downstream.clone(),
                queue: Vec::new(),
            })
        })
        .collect()
}

fn not_tracked<T: Fact>(id: &T::Id) -> ScoreNetError {
    ScoreNetError::FactNotTracked {
        type_name: type_name::<T>(),
        id: format!("{:?}", id),
    }
}

fn drift<Sc: Score>(constraint: &ConstraintRef, running: Sc, recounted: Sc) -> ScoreNetError {
    ScoreNetError::Internal(format!(
        "constraint '{}' total drifted: running {} but {} from its matches",
        constraint, running, recounted
    ))
}

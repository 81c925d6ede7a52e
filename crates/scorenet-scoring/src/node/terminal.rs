use std::collections::HashMap;
use std::sync::Arc;

use scorenet_core::{ConstraintRef, ImpactType, Result, Score, ScoreNetError};

use crate::stream::function::ErasedFn;
use crate::tuple::TupleId;
use crate::value::Facts;

/// Everything a terminal needs to score a match.
pub(crate) struct TerminalSpec<Sc: Score> {
    pub(crate) constraint_ref: ConstraintRef,
    pub(crate) impact: ImpactType,
    pub(crate) weight: Sc,
    pub(crate) weigher: Option<ErasedFn<i64>>,
    pub(crate) justifier: Option<ErasedFn<String>>,
}

impl<Sc: Score> TerminalSpec<Sc> {
    /// `weight x match_weight`, signed by the impact type.
    pub(crate) fn impact(&self, facts: &Facts) -> Result<Sc> {
        let match_weight = self.weigher.as_ref().map_or(1, |weigher| weigher(facts));
        self.weight
            .checked_mul(match_weight)
            .and_then(|score| score.checked_mul(self.impact.sign()))
            .ok_or_else(|| self.overflow())
    }

    pub(crate) fn overflow(&self) -> ScoreNetError {
        ScoreNetError::ScoreOverflow {
            constraint: self.constraint_ref.full_name(),
        }
    }
}

/// Sums the impact of every tuple reaching a constraint.
pub(crate) struct TerminalNode<Sc: Score> {
    spec: Arc<TerminalSpec<Sc>>,
    matches: HashMap<TupleId, Sc>,
    total: Sc,
}

impl<Sc: Score> TerminalNode<Sc> {
    pub(crate) fn new(spec: Arc<TerminalSpec<Sc>>) -> Self {
        Self {
            spec,
            matches: HashMap::new(),
            total: Sc::zero(),
        }
    }

    pub(crate) fn spec(&self) -> &TerminalSpec<Sc> {
        &self.spec
    }

    pub(crate) fn total(&self) -> Sc {
        self.total
    }

    /// Current matches with their impact.
    pub(crate) fn matches(&self) -> impl Iterator<Item = (TupleId, Sc)> + '_ {
        self.matches.iter().map(|(tuple, impact)| (*tuple, *impact))
    }

    pub(crate) fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub(crate) fn insert(&mut self, tuple: TupleId, facts: &Facts) -> Result<()> {
        let impact = self.spec.impact(facts)?;
        self.total = self
            .total
            .checked_add(&impact)
            .ok_or_else(|| self.spec.overflow())?;
        self.matches.insert(tuple, impact);
        Ok(())
    }

    pub(crate) fn update(&mut self, tuple: TupleId, facts: &Facts) -> Result<()> {
        let impact = self.spec.impact(facts)?;
        let old = self.matches.get(&tuple).copied().ok_or_else(|| unknown(tuple))?;
        self.total = self
            .total
            .checked_sub(&old)
            .and_then(|total| total.checked_add(&impact))
            .ok_or_else(|| self.spec.overflow())?;
        self.matches.insert(tuple, impact);
        Ok(())
    }

    pub(crate) fn retract(&mut self, tuple: TupleId) -> Result<()> {
        let old = self.matches.remove(&tuple).ok_or_else(|| unknown(tuple))?;
        self.total = self
            .total
            .checked_sub(&old)
            .ok_or_else(|| self.spec.overflow())?;
        Ok(())
    }

    /// Recomputes the total from the recorded matches.
    pub(crate) fn recount(&self) -> Result<Sc> {
        self.matches.values().try_fold(Sc::zero(), |total, impact| {
            total.checked_add(impact).ok_or_else(|| self.spec.overflow())
        })
    }
}

fn unknown(tuple: TupleId) -> ScoreNetError {
    ScoreNetError::Internal(format!("terminal has no match for tuple {}", tuple))
}

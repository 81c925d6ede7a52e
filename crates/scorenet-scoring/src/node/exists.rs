use std::collections::HashSet;
use std::sync::Arc;

use scorenet_core::{Result, ScoreNetError};

use super::{unexpected_slot, NodeContext, Side};
use crate::index::{IndexKey, Indexer};
use crate::stream::definition::ExistenceMode;
use crate::stream::joiner::JoinerSet;
use crate::tuple::{Slot, TupleArena, TupleId};
use crate::value::Facts;

/// Semi-join: forwards left tuples depending on whether a matching right
/// tuple exists.
///
/// Each left tuple counts its matching right tuples. Without filtering
/// joiners the count follows from the right index alone. With them, the
/// matching pairs are tracked on both sides so that a re-test can adjust
/// exactly the affected counters. Only transitions between zero and one
/// match reach downstream nodes.
pub(crate) struct ExistsNode {
    mode: ExistenceMode,
    joiners: Arc<JoinerSet>,
    left_slot: usize,
    right_slot: usize,
    left_index: Indexer,
    right_index: Indexer,
}

impl ExistsNode {
    pub(crate) fn new(mode: ExistenceMode, joiners: Arc<JoinerSet>, left_slot: usize, right_slot: usize) -> Self {
        Self {
            mode,
            left_index: Indexer::new(joiners.left_comparisons()),
            right_index: Indexer::new(joiners.right_comparisons()),
            joiners,
            left_slot,
            right_slot,
        }
    }

    fn propagates(&self, count: usize) -> bool {
        (count > 0) == (self.mode == ExistenceMode::Exists)
    }

    pub(crate) fn insert(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match side {
            Side::Left => self.insert_left(tuple, ctx),
            Side::Right => self.insert_right(tuple, ctx),
        }
    }

    pub(crate) fn update(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match side {
            Side::Left => self.update_left(tuple, ctx),
            Side::Right => self.update_right(tuple, ctx),
        }
    }

    pub(crate) fn retract(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match side {
            Side::Left => self.retract_left(tuple, ctx),
            Side::Right => self.retract_right(tuple, ctx),
        }
    }

    fn insert_left(&mut self, left: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let facts = ctx.tuples.facts(left)?.clone();
        let key = self.joiners.left_key(&facts);
        self.left_index.put(&key, left)?;
        let (count, matched) = self.count_matches(left, &facts, &key, ctx.tuples)?;
        let out = self.propagates(count).then(|| ctx.insert_out(facts));
        ctx.tuples.put_slot(
            left,
            self.left_slot,
            Slot::ExistsLeft {
                key,
                count,
                matched,
                out,
            },
        )
    }

    fn update_left(&mut self, left: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let facts = ctx.tuples.facts(left)?.clone();
        let new_key = self.joiners.left_key(&facts);
        let (key, count, matched, out) = match ctx.tuples.take_slot(left, self.left_slot)? {
            Slot::ExistsLeft {
                key,
                count,
                matched,
                out,
            } => (key, count, matched, out),
            other => return Err(unexpected_slot("exists", left, &other)),
        };
        if new_key != key {
            self.left_index.remove(&key, left)?;
            self.left_index.put(&new_key, left)?;
        }
        let (count, matched) = if self.joiners.has_filter() {
            for right in &matched {
                self.right_lefts(ctx.tuples, *right)?.remove(&left);
            }
            self.count_matches(left, &facts, &new_key, ctx.tuples)?
        } else if new_key != key {
            self.count_matches(left, &facts, &new_key, ctx.tuples)?
        } else {
            (count, matched)
        };
        let out = match (out, self.propagates(count)) {
            (Some(out), true) => {
                ctx.refresh_out(out, facts)?;
                Some(out)
            }
            (Some(out), false) => {
                ctx.retract_out(out)?;
                None
            }
            (None, true) => Some(ctx.insert_out(facts)),
            (None, false) => None,
        };
        ctx.tuples.put_slot(
            left,
            self.left_slot,
            Slot::ExistsLeft {
                key: new_key,
                count,
                matched,
                out,
            },
        )
    }

    fn retract_left(&mut self, left: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let (key, matched, out) = match ctx.tuples.take_slot(left, self.left_slot)? {
            Slot::ExistsLeft {
                key, matched, out, ..
            } => (key, matched, out),
            other => return Err(unexpected_slot("exists", left, &other)),
        };
        self.left_index.remove(&key, left)?;
        for right in matched {
            self.right_lefts(ctx.tuples, right)?.remove(&left);
        }
        match out {
            Some(out) => ctx.retract_out(out),
            None => Ok(()),
        }
    }

    /// Counts the right tuples matching a left tuple. With filtering
    /// joiners, also registers the pairs on the matching right tuples.
    fn count_matches(
        &self,
        left: TupleId,
        facts: &Facts,
        key: &IndexKey,
        tuples: &mut TupleArena,
    ) -> Result<(usize, HashSet<TupleId>)> {
        if !self.joiners.has_filter() {
            return Ok((self.right_index.count(key), HashSet::new()));
        }
        let mut matched = HashSet::new();
        for right in self.right_index.matches(key) {
            let mut combined = facts.clone();
            combined.extend(tuples.facts(right)?.iter().cloned());
            if self.joiners.test(&combined) {
                self.right_lefts(tuples, right)?.insert(left);
                matched.insert(right);
            }
        }
        Ok((matched.len(), matched))
    }

    fn insert_right(&mut self, right: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let facts = ctx.tuples.facts(right)?.clone();
        let key = self.joiners.right_key(&facts);
        self.right_index.put(&key, right)?;
        let mut lefts = HashSet::new();
        for left in self.left_index.matches(&key) {
            if self.joiners.has_filter() {
                if !self.test_pair(ctx.tuples, left, &facts)? {
                    continue;
                }
                lefts.insert(left);
            }
            self.adjust(left, right, true, ctx)?;
        }
        ctx.tuples
            .put_slot(right, self.right_slot, Slot::ExistsRight { key, lefts })
    }

    fn update_right(&mut self, right: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let facts = ctx.tuples.facts(right)?.clone();
        let new_key = self.joiners.right_key(&facts);
        let (key, lefts) = match ctx.tuples.take_slot(right, self.right_slot)? {
            Slot::ExistsRight { key, lefts } => (key, lefts),
            other => return Err(unexpected_slot("exists", right, &other)),
        };
        if new_key != key {
            ctx.tuples
                .put_slot(right, self.right_slot, Slot::ExistsRight { key, lefts })?;
            self.retract_right(right, ctx)?;
            return self.insert_right(right, ctx);
        }
        if !self.joiners.has_filter() {
            return ctx
                .tuples
                .put_slot(right, self.right_slot, Slot::ExistsRight { key, lefts });
        }
        let mut still = HashSet::with_capacity(lefts.len());
        for left in self.left_index.matches(&key) {
            let passes = self.test_pair(ctx.tuples, left, &facts)?;
            let was = lefts.contains(&left);
            if passes {
                still.insert(left);
            }
            if passes != was {
                self.adjust(left, right, passes, ctx)?;
            }
        }
        ctx.tuples
            .put_slot(right, self.right_slot, Slot::ExistsRight { key, lefts: still })
    }

    fn retract_right(&mut self, right: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let (key, lefts) = match ctx.tuples.take_slot(right, self.right_slot)? {
            Slot::ExistsRight { key, lefts } => (key, lefts),
            other => return Err(unexpected_slot("exists", right, &other)),
        };
        self.right_index.remove(&key, right)?;
        let affected: Vec<TupleId> = if self.joiners.has_filter() {
            lefts.into_iter().collect()
        } else {
            self.left_index.matches(&key)
        };
        for left in affected {
            self.adjust(left, right, false, ctx)?;
        }
        Ok(())
    }

    fn test_pair(&self, tuples: &TupleArena, left: TupleId, right_facts: &Facts) -> Result<bool> {
        let mut combined = tuples.facts(left)?.clone();
        combined.extend(right_facts.iter().cloned());
        Ok(self.joiners.test(&combined))
    }

    /// Adds or removes one match of a left tuple and propagates a change of
    /// existence.
    fn adjust(&self, left: TupleId, right: TupleId, add: bool, ctx: &mut NodeContext<'_>) -> Result<()> {
        let filtering = self.joiners.has_filter();
        let (count, out) = match ctx.tuples.slot_mut(left, self.left_slot)? {
            Slot::ExistsLeft {
                count,
                matched,
                out,
                ..
            } => {
                if filtering {
                    if add {
                        matched.insert(right);
                    } else {
                        matched.remove(&right);
                    }
                    *count = matched.len();
                } else if add {
                    *count += 1;
                } else {
                    *count = count.checked_sub(1).ok_or_else(|| {
                        ScoreNetError::Internal(format!("exists counter of tuple {} below zero", left))
                    })?;
                }
                (*count, *out)
            }
            other => return Err(unexpected_slot("exists", left, other)),
        };
        let new_out = match (out, self.propagates(count)) {
            (None, true) => {
                let facts = ctx.tuples.facts(left)?.clone();
                Some(ctx.insert_out(facts))
            }
            (Some(out), false) => {
                ctx.retract_out(out)?;
                None
            }
            _ => return Ok(()),
        };
        if let Slot::ExistsLeft { out, .. } = ctx.tuples.slot_mut(left, self.left_slot)? {
            *out = new_out;
        }
        Ok(())
    }

    fn right_lefts<'t>(&self, tuples: &'t mut TupleArena, right: TupleId) -> Result<&'t mut HashSet<TupleId>> {
        match tuples.slot_mut(right, self.right_slot)? {
            Slot::ExistsRight { lefts, .. } => Ok(lefts),
            other => Err(unexpected_slot("exists", right, other)),
        }
    }
}

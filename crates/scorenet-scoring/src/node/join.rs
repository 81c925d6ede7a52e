use std::collections::HashMap;
use std::sync::Arc;

use scorenet_core::{Result, ScoreNetError};

use super::{unexpected_slot, NodeContext, Side};
use crate::index::{IndexKey, Indexer};
use crate::stream::joiner::JoinerSet;
use crate::tuple::{Slot, TupleArena, TupleId};
use crate::value::Facts;

/// Joins a left stream of any arity with a uni right stream.
///
/// Each side keeps an index of its tuples by join key. An incoming tuple is
/// indexed on its own side and matched against the other side's index.
/// Every pair is remembered on both input tuples, keyed by the partner, so
/// a retract on either side finds its pairs directly.
pub(crate) struct JoinNode {
    joiners: Arc<JoinerSet>,
    left_slot: usize,
    right_slot: usize,
    left_index: Indexer,
    right_index: Indexer,
}

impl JoinNode {
    pub(crate) fn new(joiners: Arc<JoinerSet>, left_slot: usize, right_slot: usize) -> Self {
        Self {
            left_index: Indexer::new(joiners.left_comparisons()),
            right_index: Indexer::new(joiners.right_comparisons()),
            joiners,
            left_slot,
            right_slot,
        }
    }

    fn key(&self, side: Side, facts: &Facts) -> IndexKey {
        match side {
            Side::Left => self.joiners.left_key(facts),
            Side::Right => self.joiners.right_key(facts),
        }
    }

    fn slots(&self, side: Side) -> (usize, usize) {
        match side {
            Side::Left => (self.left_slot, self.right_slot),
            Side::Right => (self.right_slot, self.left_slot),
        }
    }

    pub(crate) fn insert(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let key = self.key(side, ctx.tuples.facts(tuple)?);
        let (own_slot, other_slot) = self.slots(side);
        let candidates = match side {
            Side::Left => {
                self.left_index.put(&key, tuple)?;
                self.right_index.matches(&key)
            }
            Side::Right => {
                self.right_index.put(&key, tuple)?;
                self.left_index.matches(&key)
            }
        };
        let mut outs = HashMap::with_capacity(candidates.len());
        for other in candidates {
            let facts = combine(ctx.tuples, side, tuple, other)?;
            if self.joiners.has_filter() && !self.joiners.test(&facts) {
                continue;
            }
            let out = ctx.insert_out(facts);
            link(ctx.tuples, other, other_slot, tuple, out)?;
            outs.insert(other, out);
        }
        ctx.tuples.put_slot(tuple, own_slot, Slot::Join { key, outs })
    }

    /// Same key: the pairs are refreshed, and re-tested when a filtering
    /// joiner is present. Changed key: the tuple is re-indexed, retracting
    /// every pair and matching again.
    pub(crate) fn update(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let new_key = self.key(side, ctx.tuples.facts(tuple)?);
        let (own_slot, other_slot) = self.slots(side);
        let (key, mut outs) = match ctx.tuples.take_slot(tuple, own_slot)? {
            Slot::Join { key, outs } => (key, outs),
            other => return Err(unexpected_slot("join", tuple, &other)),
        };

        if new_key != key {
            ctx.tuples.put_slot(tuple, own_slot, Slot::Join { key, outs })?;
            self.retract(side, tuple, ctx)?;
            return self.insert(side, tuple, ctx);
        }

        if !self.joiners.has_filter() {
            for (&other, &out) in &outs {
                let facts = combine(ctx.tuples, side, tuple, other)?;
                ctx.refresh_out(out, facts)?;
            }
            return ctx.tuples.put_slot(tuple, own_slot, Slot::Join { key, outs });
        }

        let candidates = match side {
            Side::Left => self.right_index.matches(&key),
            Side::Right => self.left_index.matches(&key),
        };
        let mut kept = HashMap::with_capacity(outs.len());
        for other in candidates {
            let facts = combine(ctx.tuples, side, tuple, other)?;
            let passes = self.joiners.test(&facts);
            match (outs.remove(&other), passes) {
                (Some(out), true) => {
                    ctx.refresh_out(out, facts)?;
                    kept.insert(other, out);
                }
                (Some(out), false) => {
                    unlink(ctx.tuples, other, other_slot, tuple)?;
                    ctx.retract_out(out)?;
                }
                (None, true) => {
                    let out = ctx.insert_out(facts);
                    link(ctx.tuples, other, other_slot, tuple, out)?;
                    kept.insert(other, out);
                }
                (None, false) => {}
            }
        }
        if !outs.is_empty() {
            return Err(ScoreNetError::Internal(format!(
                "join tuple {} has {} pairs with unindexed partners",
                tuple,
                outs.len()
            )));
        }
        ctx.tuples.put_slot(tuple, own_slot, Slot::Join { key, outs: kept })
    }

    pub(crate) fn retract(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let (own_slot, other_slot) = self.slots(side);
        let (key, outs) = match ctx.tuples.take_slot(tuple, own_slot)? {
            Slot::Join { key, outs } => (key, outs),
            other => return Err(unexpected_slot("join", tuple, &other)),
        };
        match side {
            Side::Left => self.left_index.remove(&key, tuple)?,
            Side::Right => self.right_index.remove(&key, tuple)?,
        }
        for (other, out) in outs {
            unlink(ctx.tuples, other, other_slot, tuple)?;
            ctx.retract_out(out)?;
        }
        Ok(())
    }
}

/// Facts of the pair, left facts first.
fn combine(tuples: &TupleArena, side: Side, tuple: TupleId, other: TupleId) -> Result<Facts> {
    let (left, right) = match side {
        Side::Left => (tuple, other),
        Side::Right => (other, tuple),
    };
    let mut facts = tuples.facts(left)?.clone();
    facts.extend(tuples.facts(right)?.iter().cloned());
    Ok(facts)
}

fn link(tuples: &mut TupleArena, tuple: TupleId, slot: usize, partner: TupleId, out: TupleId) -> Result<()> {
    match tuples.slot_mut(tuple, slot)? {
        Slot::Join { outs, .. } => {
            outs.insert(partner, out);
            Ok(())
        }
        other => Err(unexpected_slot("join", tuple, other)),
    }
}

fn unlink(tuples: &mut TupleArena, tuple: TupleId, slot: usize, partner: TupleId) -> Result<()> {
    match tuples.slot_mut(tuple, slot)? {
        Slot::Join { outs, .. } => {
            outs.remove(&partner);
            Ok(())
        }
        other => Err(unexpected_slot("join", tuple, other)),
    }
}

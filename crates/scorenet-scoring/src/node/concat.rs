use scorenet_core::Result;

use super::{unexpected_slot, NodeContext, Side};
use crate::tuple::{Slot, TupleId};

/// Passes the tuples of two inputs through, one output tuple per input
/// tuple. A producer feeding both sides yields every tuple twice.
pub(crate) struct ConcatNode {
    left_slot: usize,
    right_slot: usize,
}

impl ConcatNode {
    pub(crate) fn new(left_slot: usize, right_slot: usize) -> Self {
        Self { left_slot, right_slot }
    }

    fn slot(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left_slot,
            Side::Right => self.right_slot,
        }
    }

    pub(crate) fn insert(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let facts = ctx.tuples.facts(tuple)?.clone();
        let out = ctx.insert_out(facts);
        ctx.tuples.put_slot(tuple, self.slot(side), Slot::Concat { out })
    }

    pub(crate) fn update(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let facts = ctx.tuples.facts(tuple)?.clone();
        match ctx.tuples.slot_mut(tuple, self.slot(side))? {
            Slot::Concat { out } => {
                let out = *out;
                ctx.refresh_out(out, facts)
            }
            other => Err(unexpected_slot("concat", tuple, other)),
        }
    }

    pub(crate) fn retract(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match ctx.tuples.take_slot(tuple, self.slot(side))? {
            Slot::Concat { out } => ctx.retract_out(out),
            other => Err(unexpected_slot("concat", tuple, &other)),
        }
    }
}

use scorenet_core::Result;

use super::{unexpected_slot, NodeContext};
use crate::stream::function::ErasedFn;
use crate::tuple::{Slot, TupleId};

/// Forwards the tuples that pass a predicate.
pub(crate) struct FilterNode {
    predicate: ErasedFn<bool>,
    slot: usize,
}

impl FilterNode {
    pub(crate) fn new(predicate: ErasedFn<bool>, slot: usize) -> Self {
        Self { predicate, slot }
    }

    pub(crate) fn insert(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let facts = ctx.tuples.facts(tuple)?.clone();
        let out = (self.predicate)(&facts).then(|| ctx.insert_out(facts));
        ctx.tuples.put_slot(tuple, self.slot, Slot::Filter { out })
    }

    /// A flipped outcome becomes an insert or a retract downstream.
    pub(crate) fn update(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let facts = ctx.tuples.facts(tuple)?.clone();
        let passes = (self.predicate)(&facts);
        let out = match ctx.tuples.take_slot(tuple, self.slot)? {
            Slot::Filter { out } => out,
            other => return Err(unexpected_slot("filter", tuple, &other)),
        };
        let out = match (out, passes) {
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
        ctx.tuples.put_slot(tuple, self.slot, Slot::Filter { out })
    }

    pub(crate) fn retract(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match ctx.tuples.take_slot(tuple, self.slot)? {
            Slot::Filter { out: Some(out) } => ctx.retract_out(out),
            Slot::Filter { out: None } => Ok(()),
            other => Err(unexpected_slot("filter", tuple, &other)),
        }
    }
}

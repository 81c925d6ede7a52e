use scorenet_core::Result;
use smallvec::smallvec;

use super::{unexpected_slot, NodeContext};
use crate::stream::function::ErasedFn;
use crate::tuple::{Slot, TupleId};

/// Maps each tuple to a uni tuple holding one derived value.
pub(crate) struct MapNode {
    mapper: ErasedFn<crate::value::Value>,
    slot: usize,
}

impl MapNode {
    pub(crate) fn new(mapper: ErasedFn<crate::value::Value>, slot: usize) -> Self {
        Self { mapper, slot }
    }

    pub(crate) fn insert(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let value = (self.mapper)(ctx.tuples.facts(tuple)?);
        let out = ctx.insert_out(smallvec![value]);
        ctx.tuples.put_slot(tuple, self.slot, Slot::Map { out })
    }

    /// An equal mapped value is absorbed.
    pub(crate) fn update(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let value = (self.mapper)(ctx.tuples.facts(tuple)?);
        match ctx.tuples.slot_mut(tuple, self.slot)? {
            Slot::Map { out } => {
                let out = *out;
                ctx.refresh_out(out, smallvec![value])
            }
            other => Err(unexpected_slot("map", tuple, other)),
        }
    }

    pub(crate) fn retract(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match ctx.tuples.take_slot(tuple, self.slot)? {
            Slot::Map { out } => ctx.retract_out(out),
            other => Err(unexpected_slot("map", tuple, &other)),
        }
    }
}

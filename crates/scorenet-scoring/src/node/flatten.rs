use scorenet_core::Result;

use super::{unexpected_slot, NodeContext};
use crate::stream::definition::Expansion;
use crate::tuple::{Slot, TupleId};
use crate::value::{Facts, Value};

/// Expands the last element of each tuple into one tuple per item.
pub(crate) struct FlattenLastNode {
    expand: Expansion,
    slot: usize,
}

impl FlattenLastNode {
    pub(crate) fn new(expand: Expansion, slot: usize) -> Self {
        Self { expand, slot }
    }

    fn expand(&self, facts: &Facts) -> (Facts, Vec<Value>) {
        let (last, prefix) = match facts.split_last() {
            Some(split) => split,
            None => return (Facts::new(), Vec::new()),
        };
        (prefix.iter().cloned().collect(), (self.expand)(last))
    }

    fn with_item(prefix: &Facts, item: Value) -> Facts {
        let mut facts = prefix.clone();
        facts.push(item);
        facts
    }

    pub(crate) fn insert(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let (prefix, items) = self.expand(ctx.tuples.facts(tuple)?);
        let outs = items
            .into_iter()
            .map(|item| {
                let out = ctx.insert_out(Self::with_item(&prefix, item.clone()));
                (item, out)
            })
            .collect();
        ctx.tuples.put_slot(tuple, self.slot, Slot::Flatten { outs })
    }

    /// Diffs the old and new items as multisets: kept items are refreshed,
    /// new ones inserted, missing ones retracted.
    pub(crate) fn update(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let (prefix, items) = self.expand(ctx.tuples.facts(tuple)?);
        let mut remaining = match ctx.tuples.take_slot(tuple, self.slot)? {
            Slot::Flatten { outs } => outs,
            other => return Err(unexpected_slot("flatten_last", tuple, &other)),
        };
        let mut outs = Vec::with_capacity(items.len());
        for item in items {
            let facts = Self::with_item(&prefix, item.clone());
            match remaining.iter().position(|(old, _)| *old == item) {
                Some(at) => {
                    let (_, out) = remaining.swap_remove(at);
                    ctx.refresh_out(out, facts)?;
                    outs.push((item, out));
                }
                None => outs.push((item, ctx.insert_out(facts))),
            }
        }
        for (_, out) in remaining {
            ctx.retract_out(out)?;
        }
        ctx.tuples.put_slot(tuple, self.slot, Slot::Flatten { outs })
    }

    pub(crate) fn retract(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match ctx.tuples.take_slot(tuple, self.slot)? {
            Slot::Flatten { outs } => outs.into_iter().try_for_each(|(_, out)| ctx.retract_out(out)),
            other => Err(unexpected_slot("flatten_last", tuple, &other)),
        }
    }
}

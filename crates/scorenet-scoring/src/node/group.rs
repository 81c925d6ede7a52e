use std::collections::HashMap;
use std::sync::Arc;

use smallvec::smallvec;

use scorenet_core::{Result, ScoreNetError};

use super::{unexpected_slot, NodeContext};
use crate::stream::collector::{invariant, ErasedAccumulator, ErasedCollector};
use crate::stream::function::ErasedFn;
use crate::tuple::{Slot, TupleId, UndoToken};
use crate::value::{Facts, Value};

struct Group {
    accumulator: Option<Box<dyn ErasedAccumulator>>,
    size: usize,
    out: Option<TupleId>,
    dirty: bool,
}

/// Groups tuples by key and folds each group through a collector.
///
/// Inputs only touch accumulators and mark groups dirty. Output tuples are
/// created, refreshed or retracted when the node settles, once per flush,
/// so a group changed by many inputs emits at most one change.
pub(crate) struct GroupNode {
    key: Option<ErasedFn<Value>>,
    collector: Option<Arc<dyn ErasedCollector>>,
    slot: usize,
    groups: HashMap<Value, Group>,
    dirty: Vec<Value>,
}

impl GroupNode {
    pub(crate) fn new(
        key: Option<ErasedFn<Value>>,
        collector: Option<Arc<dyn ErasedCollector>>,
        slot: usize,
    ) -> Self {
        Self {
            key,
            collector,
            slot,
            groups: HashMap::new(),
            dirty: Vec::new(),
        }
    }

    fn contribution(&self, facts: &Facts) -> (Value, Option<UndoToken>) {
        let key = self.key.as_ref().map_or_else(Value::unit, |key| key(facts));
        let token = self.collector.as_ref().map(|c| c.extract(facts));
        (key, token)
    }

    pub(crate) fn insert(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let (key, token) = self.contribution(ctx.tuples.facts(tuple)?);
        self.accumulate(&key, token.as_ref())?;
        ctx.tuples.put_slot(tuple, self.slot, Slot::Group { key, token })
    }

    pub(crate) fn update(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let (key, token) = self.contribution(ctx.tuples.facts(tuple)?);
        match ctx.tuples.take_slot(tuple, self.slot)? {
            Slot::Group {
                key: old_key,
                token: old_token,
            } => self.retract_from(&old_key, old_token.as_ref())?,
            other => return Err(unexpected_slot("group_by", tuple, &other)),
        }
        self.accumulate(&key, token.as_ref())?;
        ctx.tuples.put_slot(tuple, self.slot, Slot::Group { key, token })
    }

    pub(crate) fn retract(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match ctx.tuples.take_slot(tuple, self.slot)? {
            Slot::Group { key, token } => self.retract_from(&key, token.as_ref()),
            other => Err(unexpected_slot("group_by", tuple, &other)),
        }
    }

    fn accumulate(&mut self, key: &Value, token: Option<&UndoToken>) -> Result<()> {
        let collector = &self.collector;
        let group = self.groups.entry(key.clone()).or_insert_with(|| Group {
            accumulator: collector.as_ref().map(|c| c.create()),
            size: 0,
            out: None,
            dirty: false,
        });
        if let (Some(accumulator), Some(token)) = (group.accumulator.as_mut(), token) {
            accumulator.accumulate(token)?;
        }
        group.size += 1;
        if !group.dirty {
            group.dirty = true;
            self.dirty.push(key.clone());
        }
        Ok(())
    }

    fn retract_from(&mut self, key: &Value, token: Option<&UndoToken>) -> Result<()> {
        let group = self
            .groups
            .get_mut(key)
            .ok_or_else(|| invariant(format!("retract from unknown group {:?}", key)))?;
        if let (Some(accumulator), Some(token)) = (group.accumulator.as_mut(), token) {
            accumulator.retract(token)?;
        }
        group.size = group
            .size
            .checked_sub(1)
            .ok_or_else(|| invariant(format!("group {:?} retracted below zero", key)))?;
        if !group.dirty {
            group.dirty = true;
            self.dirty.push(key.clone());
        }
        Ok(())
    }

    /// Emits the changes of every dirty group.
    ///
    /// An emptied group is removed and its tuple retracted. A group whose
    /// result did not change emits nothing.
    pub(crate) fn settle(&mut self, ctx: &mut NodeContext<'_>) -> Result<()> {
        for key in std::mem::take(&mut self.dirty) {
            let Some(group) = self.groups.get_mut(&key) else {
                continue;
            };
            group.dirty = false;
            if group.size == 0 {
                let out = group.out;
                self.groups.remove(&key);
                if let Some(out) = out {
                    ctx.retract_out(out)?;
                }
                continue;
            }
            let result = group.accumulator.as_ref().map(|a| a.result());
            let facts: Facts = match (self.key.is_some(), result) {
                (true, Some(result)) => smallvec![key.clone(), result],
                (true, None) => smallvec![key.clone()],
                (false, Some(result)) => smallvec![result],
                (false, None) => {
                    return Err(ScoreNetError::Internal(
                        "group_by without key or collector".to_string(),
                    ))
                }
            };
            match group.out {
                Some(out) => ctx.refresh_out(out, facts)?,
                None => group.out = Some(ctx.insert_out(facts)),
            }
        }
        Ok(())
    }
}

use std::collections::HashMap;

use scorenet_core::{Result, ScoreNetError};

use super::{unexpected_slot, NodeContext};
use crate::tuple::{Slot, TupleId};
use crate::value::Facts;

struct Bucket {
    contributors: usize,
    out: TupleId,
}

/// Collapses equal tuples. The first contributor inserts, the last retract
/// retracts.
pub(crate) struct DistinctNode {
    buckets: HashMap<Facts, Bucket>,
    slot: usize,
}

impl DistinctNode {
    pub(crate) fn new(slot: usize) -> Self {
        Self {
            buckets: HashMap::new(),
            slot,
        }
    }

    pub(crate) fn insert(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let key = ctx.tuples.facts(tuple)?.clone();
        self.add(&key, ctx);
        ctx.tuples.put_slot(tuple, self.slot, Slot::Distinct { key })
    }

    pub(crate) fn update(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        let key = ctx.tuples.facts(tuple)?.clone();
        let old = match ctx.tuples.take_slot(tuple, self.slot)? {
            Slot::Distinct { key } => key,
            other => return Err(unexpected_slot("distinct", tuple, &other)),
        };
        if old == key {
            let out = self.bucket(&key)?.out;
            ctx.refresh_out(out, key.clone())?;
        } else {
            self.remove(&old, ctx)?;
            self.add(&key, ctx);
        }
        ctx.tuples.put_slot(tuple, self.slot, Slot::Distinct { key })
    }

    pub(crate) fn retract(&mut self, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match ctx.tuples.take_slot(tuple, self.slot)? {
            Slot::Distinct { key } => self.remove(&key, ctx),
            other => Err(unexpected_slot("distinct", tuple, &other)),
        }
    }

    fn add(&mut self, key: &Facts, ctx: &mut NodeContext<'_>) {
        match self.buckets.get_mut(key) {
            Some(bucket) => bucket.contributors += 1,
            None => {
                let out = ctx.insert_out(key.clone());
                self.buckets.insert(
                    key.clone(),
                    Bucket {
                        contributors: 1,
                        out,
                    },
                );
            }
        }
    }

    fn remove(&mut self, key: &Facts, ctx: &mut NodeContext<'_>) -> Result<()> {
        let bucket = self
            .buckets
            .get_mut(key)
            .ok_or_else(|| ScoreNetError::Internal(format!("distinct has no bucket for {:?}", key)))?;
        bucket.contributors -= 1;
        if bucket.contributors == 0 {
            let out = bucket.out;
            self.buckets.remove(key);
            ctx.retract_out(out)?;
        }
        Ok(())
    }

    fn bucket(&self, key: &Facts) -> Result<&Bucket> {
        self.buckets
            .get(key)
            .ok_or_else(|| ScoreNetError::Internal(format!("distinct has no bucket for {:?}", key)))
    }
}

use std::fmt;

use scorenet_core::{Result, ScoreNetError};

use super::{Slot, TupleState};
use crate::value::Facts;

/// Handle of a tuple in a [`TupleArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TupleId(usize);

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A tuple: its facts, lifecycle state and per-consumer store.
#[derive(Debug)]
pub(crate) struct Tuple {
    pub(crate) facts: Facts,
    pub(crate) state: TupleState,
    pub(crate) store: Vec<Slot>,
}

/// Slab of tuples with index reuse.
#[derive(Debug, Default)]
pub(crate) struct TupleArena {
    entries: Vec<Option<Tuple>>,
    free: Vec<usize>,
    live: usize,
}

impl TupleArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates a tuple in state `Creating` with `width` vacant slots.
    pub(crate) fn alloc(&mut self, facts: Facts, width: usize) -> TupleId {
        let mut store = Vec::with_capacity(width);
        store.resize_with(width, Slot::default);
        let tuple = Tuple {
            facts,
            state: TupleState::Creating,
            store,
        };
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.entries[index] = Some(tuple);
                TupleId(index)
            }
            None => {
                self.entries.push(Some(tuple));
                TupleId(self.entries.len() - 1)
            }
        }
    }

    /// Releases a tuple. Its id may be reused by a later `alloc`.
    pub(crate) fn release(&mut self, id: TupleId) -> Result<Tuple> {
        let mut tuple = self
            .entries
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or_else(|| missing(id))?;
        tuple.state = TupleState::Dead;
        self.free.push(id.0);
        self.live -= 1;
        Ok(tuple)
    }

    pub(crate) fn get(&self, id: TupleId) -> Result<&Tuple> {
        self.entries
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| missing(id))
    }

    pub(crate) fn get_mut(&mut self, id: TupleId) -> Result<&mut Tuple> {
        self.entries
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| missing(id))
    }

    pub(crate) fn facts(&self, id: TupleId) -> Result<&Facts> {
        Ok(&self.get(id)?.facts)
    }

    pub(crate) fn state(&self, id: TupleId) -> Result<TupleState> {
        Ok(self.get(id)?.state)
    }

    pub(crate) fn set_state(&mut self, id: TupleId, state: TupleState) -> Result<()> {
        self.get_mut(id)?.state = state;
        Ok(())
    }

    /// Replaces the facts of a tuple unless every element is the same.
    ///
    /// Returns true if anything changed.
    pub(crate) fn refresh_facts(&mut self, id: TupleId, facts: Facts) -> Result<bool> {
        let tuple = self.get_mut(id)?;
        if crate::value::all_same(&tuple.facts, &facts) {
            return Ok(false);
        }
        tuple.facts = facts;
        Ok(true)
    }

    pub(crate) fn slot_mut(&mut self, id: TupleId, slot: usize) -> Result<&mut Slot> {
        self.get_mut(id)?
            .store
            .get_mut(slot)
            .ok_or_else(|| ScoreNetError::Internal(format!("tuple {} has no slot {}", id, slot)))
    }

    /// Moves a slot out of the tuple, leaving it vacant.
    pub(crate) fn take_slot(&mut self, id: TupleId, slot: usize) -> Result<Slot> {
        Ok(std::mem::take(self.slot_mut(id, slot)?))
    }

    pub(crate) fn put_slot(&mut self, id: TupleId, slot: usize, value: Slot) -> Result<()> {
        *self.slot_mut(id, slot)? = value;
        Ok(())
    }

    /// Number of live tuples.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (TupleId, &Tuple)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (TupleId(i), t)))
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.free.clear();
        self.live = 0;
    }
}

fn missing(id: TupleId) -> ScoreNetError {
    ScoreNetError::Internal(format!("tuple {} is not alive", id))
}

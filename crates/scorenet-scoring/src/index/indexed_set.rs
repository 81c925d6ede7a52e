use std::collections::HashMap;

use crate::tuple::TupleId;

/// Set of tuples with O(1) insert, remove and iteration.
#[derive(Debug, Default)]
pub(crate) struct IndexedSet {
    items: Vec<TupleId>,
    positions: HashMap<TupleId, usize>,
}

impl IndexedSet {
    pub(crate) fn insert(&mut self, id: TupleId) -> bool {
        if self.positions.contains_key(&id) {
            return false;
        }
        self.positions.insert(id, self.items.len());
        self.items.push(id);
        true
    }

    pub(crate) fn remove(&mut self, id: TupleId) -> bool {
        let Some(position) = self.positions.remove(&id) else {
            return false;
        };
        self.items.swap_remove(position);
        if let Some(moved) = self.items.get(position) {
            self.positions.insert(*moved, position);
        }
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = TupleId> + '_ {
        self.items.iter().copied()
    }
}

//! Seeded random operation sequences.
//!
//! An [`OpGenerator`] produces inserts, updates and retracts that are always
//! legal for the facts it has handed out so far, and a [`FactStore`] replays
//! them into a plain map for the oracle.
//!
//! # Example
//!
//! ```
//! use rand::Rng;
//! use scorenet_test::entity::Entity;
//! use scorenet_test::ops::{FactStore, Op, OpGenerator};
//!
//! let mut generator = OpGenerator::new(7, 5);
//! let mut store = FactStore::new();
//! for _ in 0..20 {
//!     let op = generator.next_op(|rng, id| Entity::new(id, ["X", "Y"][rng.random_range(0..2)]));
//!     store.apply(&op, |e| e.id);
//! }
//! assert!(store.len() <= 5);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One session call.
#[derive(Clone, Debug, PartialEq)]
pub enum Op<T> {
    Insert(T),
    Update(T),
    Retract(T),
}

impl<T> Op<T> {
    pub fn fact(&self) -> &T {
        match self {
            Op::Insert(fact) | Op::Update(fact) | Op::Retract(fact) => fact,
        }
    }
}

/// Generates legal operations over ids `0..max_id`.
pub struct OpGenerator {
    rng: ChaCha8Rng,
    max_id: u32,
    live: BTreeSet<u32>,
}

impl OpGenerator {
    pub fn new(seed: u64, max_id: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_id,
            live: BTreeSet::new(),
        }
    }

    /// Draws the next operation, building facts with `make`.
    ///
    /// A free id is inserted, a live id is updated or, less often,
    /// retracted. Retracts carry a freshly made fact with the live id.
    pub fn next_op<T>(&mut self, mut make: impl FnMut(&mut ChaCha8Rng, u32) -> T) -> Op<T> {
        let id = self.rng.random_range(0..self.max_id);
        if self.live.insert(id) {
            return Op::Insert(make(&mut self.rng, id));
        }
        if self.rng.random_bool(0.7) {
            Op::Update(make(&mut self.rng, id))
        } else {
            self.live.remove(&id);
            Op::Retract(make(&mut self.rng, id))
        }
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

/// The fact set an operation sequence leaves behind.
#[derive(Clone, Debug)]
pub struct FactStore<T> {
    facts: BTreeMap<u32, T>,
}

impl<T: Clone> FactStore<T> {
    pub fn new() -> Self {
        Self {
            facts: BTreeMap::new(),
        }
    }

    pub fn apply(&mut self, op: &Op<T>, id: impl Fn(&T) -> u32) {
        match op {
            Op::Insert(fact) | Op::Update(fact) => {
                self.facts.insert(id(fact), fact.clone());
            }
            Op::Retract(fact) => {
                self.facts.remove(&id(fact));
            }
        }
    }

    /// Current facts ordered by id.
    pub fn facts(&self) -> Vec<T> {
        self.facts.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl<T: Clone> Default for FactStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

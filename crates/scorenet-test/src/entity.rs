//! Minimal entity fixtures.
//!
//! # Example
//!
//! ```
//! use scorenet_test::entity::{same_value_ordered_pairs, Entity};
//!
//! let entities = vec![Entity::new(1, "X"), Entity::new(2, "X"), Entity::new(3, "Y")];
//! assert_eq!(same_value_ordered_pairs(&entities), 2);
//! ```

use scorenet_core::PlanningId;

/// An entity with one value that constraints compare.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: u32,
    pub value: String,
}

impl Entity {
    pub fn new(id: u32, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}

impl PlanningId for Entity {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

/// Ordered pairs `(a, b)` of distinct entities sharing a value.
pub fn same_value_ordered_pairs(entities: &[Entity]) -> i64 {
    let mut pairs = 0;
    for a in entities {
        for b in entities {
            if a.id != b.id && a.value == b.value {
                pairs += 1;
            }
        }
    }
    pairs
}

/// Unordered pairs of distinct entities sharing a value.
pub fn same_value_unique_pairs(entities: &[Entity]) -> i64 {
    same_value_ordered_pairs(entities) / 2
}

/// Entities whose value no other entity shares.
pub fn lonely_entities(entities: &[Entity]) -> i64 {
    entities
        .iter()
        .filter(|a| !entities.iter().any(|b| b.id != a.id && b.value == a.value))
        .count() as i64
}

//! Joiners: matching conditions between the left tuple and a right fact.
//!
//! Equality and comparison joiners become index keys, so a join only looks
//! at candidates that can match. Filtering joiners are tested on every
//! indexed candidate.
//!
//! ```
//! use scorenet_scoring::stream::joiner::{equal, less_than};
//!
//! #[derive(Debug)]
//! struct Shift { employee: u32, start: i64, end: i64 }
//!
//! // same employee, and the left shift starts before the right one ends
//! let overlapping = equal(|s: &Shift| s.employee)
//!     .and(less_than(|a: &Shift| a.start, |b: &Shift| b.end));
//! assert_eq!(overlapping.len(), 2);
//! ```

mod comparison;
mod equal;
mod filtering;

#[cfg(test)]
mod tests;

use std::marker::PhantomData;
use std::sync::Arc;

use smallvec::SmallVec;

pub use comparison::{greater_than, greater_than_or_equal, less_than, less_than_or_equal};
pub use equal::{equal, equal_bi};
pub use filtering::filtering;

use super::function::{fn_identity, ErasedFn};
use crate::index::{Comparison, IndexKey};
use crate::value::Value;

/// One matching condition of a join.
#[derive(Clone)]
pub(crate) enum JoinerPart {
    Equal {
        left: ErasedFn<Value>,
        right: ErasedFn<Value>,
    },
    Compare {
        comparison: Comparison,
        left: ErasedFn<Value>,
        right: ErasedFn<Value>,
    },
    /// Tested on the left facts followed by the right fact.
    Filter(ErasedFn<bool>),
}

/// Conditions joining a tuple of shape `L` with a fact `B`.
///
/// Combine conditions with [`Joiner::and`]. A pair matches only if every
/// condition holds.
pub struct Joiner<L, B> {
    pub(crate) parts: Vec<JoinerPart>,
    _phantom: PhantomData<fn() -> (L, B)>,
}

impl<L, B> Joiner<L, B> {
    pub(crate) fn from_part(part: JoinerPart) -> Self {
        Self {
            parts: vec![part],
            _phantom: PhantomData,
        }
    }

    /// A joiner without conditions: every pair matches.
    pub fn cross() -> Self {
        Self {
            parts: Vec::new(),
            _phantom: PhantomData,
        }
    }

    /// Requires both joiners to match.
    pub fn and(mut self, other: Joiner<L, B>) -> Self {
        self.parts.extend(other.parts);
        self
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl<L, B> Clone for Joiner<L, B> {
    fn clone(&self) -> Self {
        Self {
            parts: self.parts.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<L, B> Default for Joiner<L, B> {
    fn default() -> Self {
        Self::cross()
    }
}

/// The erased joiners of one join or existence node.
pub(crate) struct JoinerSet {
    parts: Vec<JoinerPart>,
    left_comparisons: Arc<[Comparison]>,
    right_comparisons: Arc<[Comparison]>,
    has_filter: bool,
}

impl JoinerSet {
    pub(crate) fn new(parts: Vec<JoinerPart>) -> Self {
        let comparisons: Vec<Comparison> = parts
            .iter()
            .filter_map(|part| match part {
                JoinerPart::Compare { comparison, .. } => Some(*comparison),
                _ => None,
            })
            .collect();
        let right_comparisons = comparisons.iter().map(|c| c.flip()).collect::<Vec<_>>();
        let has_filter = parts.iter().any(|p| matches!(p, JoinerPart::Filter(_)));
        Self {
            parts,
            left_comparisons: comparisons.into(),
            right_comparisons: right_comparisons.into(),
            has_filter,
        }
    }

    /// Comparisons for the left index: stored left key against a right query.
    pub(crate) fn left_comparisons(&self) -> Arc<[Comparison]> {
        self.left_comparisons.clone()
    }

    /// Comparisons for the right index, flipped to read stored right against
    /// a left query.
    pub(crate) fn right_comparisons(&self) -> Arc<[Comparison]> {
        self.right_comparisons.clone()
    }

    pub(crate) fn has_filter(&self) -> bool {
        self.has_filter
    }

    pub(crate) fn left_key(&self, facts: &[Value]) -> IndexKey {
        self.key(facts, true)
    }

    pub(crate) fn right_key(&self, facts: &[Value]) -> IndexKey {
        self.key(facts, false)
    }

    fn key(&self, facts: &[Value], left: bool) -> IndexKey {
        let mut key = IndexKey::default();
        for part in &self.parts {
            match part {
                JoinerPart::Equal { left: l, right: r } => {
                    key.equal.push(if left { l(facts) } else { r(facts) });
                }
                JoinerPart::Compare {
                    left: l, right: r, ..
                } => {
                    key.compare.push(if left { l(facts) } else { r(facts) });
                }
                JoinerPart::Filter(_) => {}
            }
        }
        key
    }

    /// Tests the filtering joiners on the concatenated facts of a pair.
    pub(crate) fn test(&self, combined: &[Value]) -> bool {
        self.parts.iter().all(|part| match part {
            JoinerPart::Filter(predicate) => predicate(combined),
            _ => true,
        })
    }

    /// Closure identities, used to recognize equivalent joins.
    pub(crate) fn signature(&self) -> SmallVec<[usize; 4]> {
        let mut signature = SmallVec::new();
        for part in &self.parts {
            match part {
                JoinerPart::Equal { left, right } => {
                    signature.extend([0, fn_identity(left), fn_identity(right)]);
                }
                JoinerPart::Compare {
                    comparison,
                    left,
                    right,
                } => {
                    let tag = match comparison {
                        Comparison::Less => 1,
                        Comparison::LessOrEqual => 2,
                        Comparison::Greater => 3,
                        Comparison::GreaterOrEqual => 4,
                    };
                    signature.extend([tag, fn_identity(left), fn_identity(right)]);
                }
                JoinerPart::Filter(predicate) => {
                    signature.extend([5, fn_identity(predicate)]);
                }
            }
        }
        signature
    }
}

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use super::{Joiner, JoinerPart};
use crate::index::Comparison;
use crate::stream::function::TupleFn;
use crate::value::{fact_at, Value};

fn compare<L, B, K, Fl, Fr>(comparison: Comparison, left: Fl, right: Fr) -> Joiner<L, B>
where
    L: 'static,
    B: Send + Sync + 'static,
    K: Ord + Hash + Debug + Send + Sync + 'static,
    Fl: TupleFn<L, K>,
    Fr: Fn(&B) -> K + Send + Sync + 'static,
{
    Joiner::from_part(JoinerPart::Compare {
        comparison,
        left: Arc::new(move |facts: &[Value]| Value::ordered(left.call(facts))),
        right: Arc::new(move |facts: &[Value]| Value::ordered(right(fact_at::<B>(facts, 0)))),
    })
}

/// Matches when `left(a) < right(b)`.
///
/// ```
/// use scorenet_scoring::stream::joiner::{less_than, Joiner};
///
/// #[derive(Debug)]
/// struct Task { start: i64, end: i64 }
///
/// // the left task ends before the right one starts
/// let sequential: Joiner<(Task,), Task> = less_than(|a: &Task| a.end, |b: &Task| b.start);
/// assert!(!sequential.is_empty());
/// ```
pub fn less_than<L, B, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, B>
where
    L: 'static,
    B: Send + Sync + 'static,
    K: Ord + Hash + Debug + Send + Sync + 'static,
    Fl: TupleFn<L, K>,
    Fr: Fn(&B) -> K + Send + Sync + 'static,
{
    compare(Comparison::Less, left, right)
}

/// Matches when `left(a) <= right(b)`.
pub fn less_than_or_equal<L, B, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, B>
where
    L: 'static,
    B: Send + Sync + 'static,
    K: Ord + Hash + Debug + Send + Sync + 'static,
    Fl: TupleFn<L, K>,
    Fr: Fn(&B) -> K + Send + Sync + 'static,
{
    compare(Comparison::LessOrEqual, left, right)
}

/// Matches when `left(a) > right(b)`.
pub fn greater_than<L, B, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, B>
where
    L: 'static,
    B: Send + Sync + 'static,
    K: Ord + Hash + Debug + Send + Sync + 'static,
    Fl: TupleFn<L, K>,
    Fr: Fn(&B) -> K + Send + Sync + 'static,
{
    compare(Comparison::Greater, left, right)
}

/// Matches when `left(a) >= right(b)`.
pub fn greater_than_or_equal<L, B, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, B>
where
    L: 'static,
    B: Send + Sync + 'static,
    K: Ord + Hash + Debug + Send + Sync + 'static,
    Fl: TupleFn<L, K>,
    Fr: Fn(&B) -> K + Send + Sync + 'static,
{
    compare(Comparison::GreaterOrEqual, left, right)
}

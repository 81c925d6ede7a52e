use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use super::{Joiner, JoinerPart};
use crate::stream::function::{erase_key, TupleFn};
use crate::value::{fact_at, Value};

/// Matches when a property is equal on both sides.
///
/// The same key function is applied to the left uni tuple and the right fact,
/// which makes this the joiner for self-joins.
///
/// ```
/// use scorenet_scoring::stream::joiner::equal;
///
/// #[derive(Debug)]
/// struct Shift { employee: u32 }
///
/// let same_employee = equal(|s: &Shift| s.employee);
/// assert_eq!(same_employee.len(), 1);
/// ```
pub fn equal<A, K, F>(key: F) -> Joiner<(A,), A>
where
    A: Send + Sync + 'static,
    K: Eq + Hash + Debug + Send + Sync + 'static,
    F: Fn(&A) -> K + Send + Sync + 'static,
{
    let key = Arc::new(key);
    let right = key.clone();
    Joiner::from_part(JoinerPart::Equal {
        left: Arc::new(move |facts: &[Value]| Value::key(key(fact_at::<A>(facts, 0)))),
        right: Arc::new(move |facts: &[Value]| Value::key(right(fact_at::<A>(facts, 0)))),
    })
}

/// Matches when the key of the left tuple equals the key of the right fact.
pub fn equal_bi<L, B, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<L, B>
where
    L: 'static,
    B: Send + Sync + 'static,
    K: Eq + Hash + Debug + Send + Sync + 'static,
    Fl: TupleFn<L, K>,
    Fr: Fn(&B) -> K + Send + Sync + 'static,
{
    Joiner::from_part(JoinerPart::Equal {
        left: erase_key(left),
        right: Arc::new(move |facts: &[Value]| Value::key(right(fact_at::<B>(facts, 0)))),
    })
}

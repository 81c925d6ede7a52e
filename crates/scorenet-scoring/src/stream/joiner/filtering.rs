use super::{Joiner, JoinerPart};
use crate::stream::function::{erase, Append, TupleFn};

/// Matches when a predicate over the left facts and the right fact holds.
///
/// Filtering joiners cannot be indexed. They are tested against every
/// candidate the other joiners leave.
///
/// ```
/// use scorenet_scoring::stream::joiner::{filtering, Joiner};
///
/// #[derive(Debug)]
/// struct Task { priority: i32 }
///
/// let higher: Joiner<(Task,), Task> =
///     filtering(|a: &Task, b: &Task| a.priority > b.priority);
/// assert_eq!(higher.len(), 1);
/// ```
pub fn filtering<L, B, F>(predicate: F) -> Joiner<L, B>
where
    L: Append<B> + 'static,
    L::Output: 'static,
    B: 'static,
    F: TupleFn<L::Output, bool>,
{
    Joiner::from_part(JoinerPart::Filter(erase(predicate)))
}

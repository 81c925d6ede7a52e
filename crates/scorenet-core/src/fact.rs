//! Fact identity.
//!
//! A session tracks facts by a declared identity, never by structural
//! equality of the whole value: facts change between updates, their ids
//! do not.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for values that carry a stable planning identity.
///
/// # Example
///
/// ```
/// use scorenet_core::PlanningId;
///
/// #[derive(Debug, Clone)]
/// struct Shift {
///     id: u32,
///     employee: Option<u32>,
/// }
///
/// impl PlanningId for Shift {
///     type Id = u32;
///
///     fn planning_id(&self) -> u32 {
///         self.id
///     }
/// }
///
/// let a = Shift { id: 7, employee: None };
/// let b = Shift { id: 7, employee: Some(1) };
/// assert_eq!(a.planning_id(), b.planning_id());
/// ```
pub trait PlanningId {
    /// The identity type. Must be hashable and cheap to clone.
    type Id: Eq + Hash + Clone + Debug + Send + Sync + 'static;

    /// Returns the identity of this value.
    fn planning_id(&self) -> Self::Id;
}

/// A value that can be inserted into a score session.
///
/// Blanket-implemented for every thread-safe [`PlanningId`] type, so
/// domain types only implement [`PlanningId`].
pub trait Fact: PlanningId + Debug + Send + Sync + 'static {
    /// Identity used by the session and by fact equality inside tuples.
    fn fact_id(&self) -> Self::Id {
        self.planning_id()
    }
}

impl<T> Fact for T where T: PlanningId + Debug + Send + Sync + 'static {}

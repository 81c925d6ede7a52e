//! Type-erased values carried by tuples.
//!
//! Every element of a tuple is a [`Value`]: a reference-counted cell holding
//! either a fact, a derived key, or a computed result. Cells decide their own
//! equality. Facts compare by identity (their [`Fact::fact_id`]), derived
//! values compare structurally.

use std::any::{type_name, Any};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use scorenet_core::Fact;

/// The facts of one tuple.
pub type Facts = SmallVec<[Value; 4]>;

/// Object-safe behavior of a value cell.
pub(crate) trait DynValue: Send + Sync + 'static {
    /// The wrapped payload, for typed access.
    fn payload(&self) -> &dyn Any;

    fn eq_dyn(&self, other: &dyn DynValue) -> bool;

    fn hash_dyn(&self, state: &mut dyn Hasher);

    /// Ordering within one cell type, `None` for unordered payloads.
    fn cmp_dyn(&self, other: &dyn DynValue) -> Option<Ordering>;

    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn type_name(&self) -> &'static str;

    fn is_fact(&self) -> bool {
        false
    }
}

/// A fact, equal to another fact of the same type with the same id.
struct FactCell<T: Fact>(T);

impl<T: Fact> DynValue for FactCell<T> {
    fn payload(&self) -> &dyn Any {
        &self.0
    }

    fn eq_dyn(&self, other: &dyn DynValue) -> bool {
        other
            .payload()
            .downcast_ref::<T>()
            .is_some_and(|o| other.is_fact() && o.fact_id() == self.0.fact_id())
    }

    fn hash_dyn(&self, mut state: &mut dyn Hasher) {
        self.0.fact_id().hash(&mut state);
    }

    fn cmp_dyn(&self, _other: &dyn DynValue) -> Option<Ordering> {
        None
    }

    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn is_fact(&self) -> bool {
        true
    }
}

/// A hashable derived value: group keys, mapped values, fact ids.
struct KeyCell<T>(T);

impl<T> DynValue for KeyCell<T>
where
    T: Eq + Hash + fmt::Debug + Send + Sync + 'static,
{
    fn payload(&self) -> &dyn Any {
        &self.0
    }

    fn eq_dyn(&self, other: &dyn DynValue) -> bool {
        !other.is_fact() && other.payload().downcast_ref::<T>() == Some(&self.0)
    }

    fn hash_dyn(&self, mut state: &mut dyn Hasher) {
        self.0.hash(&mut state);
    }

    fn cmp_dyn(&self, _other: &dyn DynValue) -> Option<Ordering> {
        None
    }

    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// An ordered derived value, used by comparison joiners.
struct OrdCell<T>(T);

impl<T> DynValue for OrdCell<T>
where
    T: Ord + Hash + fmt::Debug + Send + Sync + 'static,
{
    fn payload(&self) -> &dyn Any {
        &self.0
    }

    fn eq_dyn(&self, other: &dyn DynValue) -> bool {
        !other.is_fact() && other.payload().downcast_ref::<T>() == Some(&self.0)
    }

    fn hash_dyn(&self, mut state: &mut dyn Hasher) {
        self.0.hash(&mut state);
    }

    fn cmp_dyn(&self, other: &dyn DynValue) -> Option<Ordering> {
        other.payload().downcast_ref::<T>().map(|o| self.0.cmp(o))
    }

    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// A computed result that only supports equality, such as an average.
struct DataCell<T>(T);

impl<T> DynValue for DataCell<T>
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn payload(&self) -> &dyn Any {
        &self.0
    }

    fn eq_dyn(&self, other: &dyn DynValue) -> bool {
        !other.is_fact() && other.payload().downcast_ref::<T>() == Some(&self.0)
    }

    fn hash_dyn(&self, mut state: &mut dyn Hasher) {
        // unhashable payloads share one bucket per type
        type_name::<T>().hash(&mut state);
    }

    fn cmp_dyn(&self, _other: &dyn DynValue) -> Option<Ordering> {
        None
    }

    fn fmt_dyn(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// A type-erased, cheaply cloneable tuple element.
#[derive(Clone)]
pub struct Value(Arc<dyn DynValue>);

impl Value {
    /// Wraps a fact. Equality follows the fact's id.
    pub fn fact<T: Fact>(fact: T) -> Self {
        Value(Arc::new(FactCell(fact)))
    }

    /// Wraps a hashable derived value.
    pub fn key<T>(value: T) -> Self
    where
        T: Eq + Hash + fmt::Debug + Send + Sync + 'static,
    {
        Value(Arc::new(KeyCell(value)))
    }

    /// Wraps an ordered derived value.
    pub fn ordered<T>(value: T) -> Self
    where
        T: Ord + Hash + fmt::Debug + Send + Sync + 'static,
    {
        Value(Arc::new(OrdCell(value)))
    }

    /// Wraps a value that only supports equality.
    pub fn data<T>(value: T) -> Self
    where
        T: PartialEq + fmt::Debug + Send + Sync + 'static,
    {
        Value(Arc::new(DataCell(value)))
    }

    /// The unit value, used as the key of ungrouped collectors.
    pub fn unit() -> Self {
        Value::key(())
    }

    /// Returns the payload if it is a `T`.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.0.payload().downcast_ref::<T>()
    }

    /// Returns true if this value wraps a fact.
    pub fn is_fact(&self) -> bool {
        self.0.is_fact()
    }

    /// Full type name of the payload.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Identity check used to absorb redundant updates.
    ///
    /// Facts are the same only if they are the same allocation, so a fact
    /// handed in again through `update` always counts as changed. Derived
    /// values are the same when they are equal.
    pub fn is_same(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || (!self.is_fact() && self == other)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.eq_dyn(&*other.0)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash_dyn(state);
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .cmp_dyn(&*other.0)
            .unwrap_or_else(|| self.type_name().cmp(other.type_name()))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_dyn(f)
    }
}

/// Returns true if both fact lists hold the same values position by position.
pub(crate) fn all_same(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_same(y))
}

/// Typed view of one tuple element.
///
/// # Panics
///
/// Panics if the element is not a `T`. The typed stream API guarantees the
/// element types of every tuple, so a mismatch is an engine bug.
#[inline]
pub(crate) fn fact_at<T: 'static>(facts: &[Value], index: usize) -> &T {
    facts[index].get::<T>().unwrap_or_else(|| {
        panic!(
            "Impossible state: tuple element {} is {}, expected {}",
            index,
            facts[index].type_name(),
            type_name::<T>()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Lesson {
        id: u32,
        room: &'static str,
    }

    impl scorenet_core::PlanningId for Lesson {
        type Id = u32;

        fn planning_id(&self) -> u32 {
            self.id
        }
    }

    #[test]
    fn test_fact_equality_by_id() {
        let a = Value::fact(Lesson { id: 1, room: "A" });
        let b = Value::fact(Lesson { id: 1, room: "B" });
        let c = Value::fact(Lesson { id: 2, room: "A" });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_same(&b));
        assert!(a.is_same(&a.clone()));
        assert_eq!(a.get::<Lesson>().unwrap().room, "A");
    }

    #[test]
    fn test_fact_never_equals_key() {
        let fact = Value::fact(Lesson { id: 1, room: "A" });
        let key = Value::key(1u32);
        assert_ne!(fact, key);
        assert_ne!(key, fact);
    }

    #[test]
    fn test_derived_values_are_structural() {
        assert_eq!(Value::key("x"), Value::key("x"));
        assert!(Value::key(3).is_same(&Value::key(3)));
        assert_ne!(Value::key(3i32), Value::key(3i64));
        assert_eq!(Value::data(1.5f64), Value::data(1.5f64));
    }

    #[test]
    fn test_ordered_values() {
        let mut values = vec![Value::ordered(5), Value::ordered(1), Value::ordered(3)];
        values.sort();
        let sorted: Vec<i32> = values.iter().map(|v| *v.get::<i32>().unwrap()).collect();
        assert_eq!(sorted, vec![1, 3, 5]);
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Value::fact(Lesson { id: 9, room: "A" }));
        assert!(set.contains(&Value::fact(Lesson { id: 9, room: "C" })));
        assert!(!set.contains(&Value::fact(Lesson { id: 8, room: "A" })));
    }
}

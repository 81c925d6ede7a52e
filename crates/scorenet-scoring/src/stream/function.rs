//! Typed closures over tuples and their type-erased form.
//!
//! Streams are typed (`UniConstraintStream<A>`, `BiConstraintStream<A, B>`),
//! the network is not. [`TupleFn`] bridges the two: a closure taking
//! `(&A, &B)` is a `TupleFn<(A, B), O>` and can be called on the erased facts
//! of a bi tuple.

use std::sync::Arc;

use crate::value::{fact_at, Value};

/// A closure over the facts of a tuple of shape `L`.
///
/// Implemented for `Fn(&A) -> O` with `L = (A,)`, `Fn(&A, &B) -> O` with
/// `L = (A, B)`, and so on up to four elements.
pub trait TupleFn<L, O>: Send + Sync + 'static {
    /// Calls the closure on erased facts.
    ///
    /// # Panics
    ///
    /// Panics if the facts do not have shape `L`.
    fn call(&self, facts: &[Value]) -> O;
}

macro_rules! impl_tuple_fn {
    ($($t:ident => $i:tt),+) => {
        impl<$($t,)+ O, F> TupleFn<($($t,)+), O> for F
        where
            $($t: Send + Sync + 'static,)+
            F: Fn($(&$t),+) -> O + Send + Sync + 'static,
        {
            #[inline]
            fn call(&self, facts: &[Value]) -> O {
                self($(fact_at::<$t>(facts, $i)),+)
            }
        }
    };
}

impl_tuple_fn!(A => 0);
impl_tuple_fn!(A => 0, B => 1);
impl_tuple_fn!(A => 0, B => 1, C => 2);
impl_tuple_fn!(A => 0, B => 1, C => 2, D => 3);

/// Tuple shapes that can grow by one element through a join.
pub trait Append<B> {
    type Output;
}

impl<A, B> Append<B> for (A,) {
    type Output = (A, B);
}

impl<A, B, C> Append<C> for (A, B) {
    type Output = (A, B, C);
}

impl<A, B, C, D> Append<D> for (A, B, C) {
    type Output = (A, B, C, D);
}

/// An erased closure over tuple facts.
pub(crate) type ErasedFn<O> = Arc<dyn Fn(&[Value]) -> O + Send + Sync>;

/// Erases a typed tuple closure.
pub(crate) fn erase<L, O, F>(f: F) -> ErasedFn<O>
where
    L: 'static,
    O: 'static,
    F: TupleFn<L, O>,
{
    Arc::new(move |facts: &[Value]| f.call(facts))
}

/// Erases a closure and wraps its output in a hashable value.
pub(crate) fn erase_key<L, K, F>(f: F) -> ErasedFn<Value>
where
    L: 'static,
    K: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
    F: TupleFn<L, K>,
{
    Arc::new(move |facts: &[Value]| Value::key(f.call(facts)))
}

/// Address of an erased closure, used as its identity for node sharing.
pub(crate) fn fn_identity<T: ?Sized>(f: &Arc<T>) -> usize {
    Arc::as_ptr(f) as *const () as usize
}

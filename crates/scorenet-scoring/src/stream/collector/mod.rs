//! Collectors for grouping and aggregating tuples.
//!
//! A collector extracts one contribution per tuple and folds contributions
//! into an accumulator. Every contribution can be retracted again, leaving
//! the accumulator exactly as it was before.
//!
//! ```
//! use scorenet_scoring::stream::collector::{max, Accumulator, Collector};
//!
//! let collector = max(|x: &i64| *x);
//! let mut acc = Collector::<(i64,)>::create_accumulator(&collector);
//! acc.accumulate(&3).unwrap();
//! acc.accumulate(&7).unwrap();
//! assert_eq!(acc.finish(), Some(7));
//!
//! acc.retract(&7).unwrap();
//! assert_eq!(acc.finish(), Some(3));
//! ```

mod average;
mod compose;
mod count;
mod min_max;
mod sum;
mod to_list;


use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use scorenet_core::{Result, ScoreNetError};

pub use average::{average, AverageAccumulator, AverageCollector};
pub use compose::{compose, ComposeAccumulator, ComposeCollector};
pub use count::{count, count_distinct, CountAccumulator, CountCollector, CountDistinctAccumulator, CountDistinctCollector};
pub use min_max::{max, min, MinMaxAccumulator, MinMaxCollector};
pub use sum::{sum, SumAccumulator, SumCollector};
pub use to_list::{to_list, ToListAccumulator, ToListCollector};

use crate::tuple::UndoToken;
use crate::value::Value;

/// Running state of one group.
pub trait Accumulator<V, R>: Send + Sync + 'static {
    /// Adds a contribution.
    fn accumulate(&mut self, value: &V) -> Result<()>;

    /// Removes a contribution added earlier.
    ///
    /// Fails with [`ScoreNetError::CollectorInvariant`] if no such
    /// contribution is present.
    fn retract(&mut self, value: &V) -> Result<()>;

    /// The current result.
    fn finish(&self) -> R;
}

/// Aggregation over tuples of shape `L`.
pub trait Collector<L>: Send + Sync + 'static {
    /// The contribution extracted from one tuple.
    type Value: Send + Sync + 'static;

    /// The aggregate. Results are compared to absorb unchanged groups.
    type Result: PartialEq + Debug + Send + Sync + 'static;

    type Accumulator: Accumulator<Self::Value, Self::Result>;

    /// Extracts the contribution of a tuple's facts.
    fn extract(&self, facts: &[Value]) -> Self::Value;

    fn create_accumulator(&self) -> Self::Accumulator;
}

pub(crate) fn invariant(message: impl Into<String>) -> ScoreNetError {
    ScoreNetError::CollectorInvariant(message.into())
}

/// An aggregate left the range of its numeric type. Collectors do not know
/// which constraints read them, so the collector names itself.
pub(crate) fn overflow(collector: &str) -> ScoreNetError {
    ScoreNetError::ScoreOverflow {
        constraint: format!("{collector} collector"),
    }
}

/// A collector with its tuple shape and value types erased.
pub(crate) trait ErasedCollector: Send + Sync {
    fn create(&self) -> Box<dyn ErasedAccumulator>;

    /// Extracts a contribution, boxed so it can later be retracted.
    fn extract(&self, facts: &[Value]) -> UndoToken;
}

pub(crate) trait ErasedAccumulator: Send + Sync {
    fn accumulate(&mut self, token: &UndoToken) -> Result<()>;

    fn retract(&mut self, token: &UndoToken) -> Result<()>;

    fn result(&self) -> Value;
}

struct CollectorAdapter<L, C> {
    collector: C,
    _phantom: PhantomData<fn() -> L>,
}

struct AccumulatorAdapter<V, R, A> {
    inner: A,
    _phantom: PhantomData<fn(V) -> R>,
}

pub(crate) fn erase_collector<L, C>(collector: C) -> Arc<dyn ErasedCollector>
where
    L: 'static,
    C: Collector<L>,
{
    Arc::new(CollectorAdapter {
        collector,
        _phantom: PhantomData,
    })
}

impl<L, C> ErasedCollector for CollectorAdapter<L, C>
where
    L: 'static,
    C: Collector<L>,
{
    fn create(&self) -> Box<dyn ErasedAccumulator> {
        Box::new(AccumulatorAdapter::<C::Value, C::Result, C::Accumulator> {
            inner: self.collector.create_accumulator(),
            _phantom: PhantomData,
        })
    }

    fn extract(&self, facts: &[Value]) -> UndoToken {
        UndoToken(Box::new(self.collector.extract(facts)))
    }
}

impl<V, R, A> AccumulatorAdapter<V, R, A>
where
    V: Send + Sync + 'static,
{
    fn contribution(token: &UndoToken) -> Result<&V> {
        token.0.downcast_ref::<V>().ok_or_else(|| {
            invariant(format!(
                "undo token does not hold a {}",
                std::any::type_name::<V>()
            ))
        })
    }
}

impl<V, R, A> ErasedAccumulator for AccumulatorAdapter<V, R, A>
where
    V: Send + Sync + 'static,
    R: PartialEq + Debug + Send + Sync + 'static,
    A: Accumulator<V, R>,
{
    fn accumulate(&mut self, token: &UndoToken) -> Result<()> {
        self.inner.accumulate(Self::contribution(token)?)
    }

    fn retract(&mut self, token: &UndoToken) -> Result<()> {
        self.inner.retract(Self::contribution(token)?)
    }

    fn result(&self) -> Value {
        Value::data(self.inner.finish())
    }
}

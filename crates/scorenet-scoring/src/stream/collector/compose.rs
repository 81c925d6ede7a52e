use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use scorenet_core::Result;

use super::{Accumulator, Collector};
use crate::value::Value;

/// Runs two collectors over the same group and combines their results.
///
/// ```
/// use scorenet_scoring::stream::collector::{compose, count, sum, Accumulator, Collector};
///
/// let mean = compose(count::<(i64,)>(), sum(|x: &i64| *x), |n: &usize, total: &i64| {
///     *total / (*n).max(1) as i64
/// });
/// let mut acc = mean.create_accumulator();
/// acc.accumulate(&((), 4)).unwrap();
/// acc.accumulate(&((), 8)).unwrap();
/// assert_eq!(acc.finish(), 6);
/// ```
pub fn compose<L, C1, C2, O, F>(first: C1, second: C2, combiner: F) -> ComposeCollector<L, C1, C2, F>
where
    L: 'static,
    C1: Collector<L>,
    C2: Collector<L>,
    O: PartialEq + Debug + Send + Sync + 'static,
    F: Fn(&C1::Result, &C2::Result) -> O + Send + Sync + 'static,
{
    ComposeCollector {
        first,
        second,
        combiner: Arc::new(combiner),
        _phantom: PhantomData,
    }
}

pub struct ComposeCollector<L, C1, C2, F> {
    first: C1,
    second: C2,
    combiner: Arc<F>,
    _phantom: PhantomData<fn() -> L>,
}

impl<L, C1, C2, O, F> Collector<L> for ComposeCollector<L, C1, C2, F>
where
    L: 'static,
    C1: Collector<L>,
    C2: Collector<L>,
    O: PartialEq + Debug + Send + Sync + 'static,
    F: Fn(&C1::Result, &C2::Result) -> O + Send + Sync + 'static,
{
    type Value = (C1::Value, C2::Value);
    type Result = O;
    type Accumulator = ComposeAccumulator<C1::Accumulator, C2::Accumulator, C1::Result, C2::Result, F>;

    fn extract(&self, facts: &[Value]) -> Self::Value {
        (self.first.extract(facts), self.second.extract(facts))
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        ComposeAccumulator {
            first: self.first.create_accumulator(),
            second: self.second.create_accumulator(),
            combiner: self.combiner.clone(),
            _phantom: PhantomData,
        }
    }
}

pub struct ComposeAccumulator<A1, A2, R1, R2, F> {
    first: A1,
    second: A2,
    combiner: Arc<F>,
    _phantom: PhantomData<fn() -> (R1, R2)>,
}

impl<V1, V2, R1, R2, O, A1, A2, F> Accumulator<(V1, V2), O> for ComposeAccumulator<A1, A2, R1, R2, F>
where
    V1: 'static,
    V2: 'static,
    R1: 'static,
    R2: 'static,
    A1: Accumulator<V1, R1>,
    A2: Accumulator<V2, R2>,
    F: Fn(&R1, &R2) -> O + Send + Sync + 'static,
{
    fn accumulate(&mut self, value: &(V1, V2)) -> Result<()> {
        self.first.accumulate(&value.0)?;
        self.second.accumulate(&value.1)
    }

    fn retract(&mut self, value: &(V1, V2)) -> Result<()> {
        self.first.retract(&value.0)?;
        self.second.retract(&value.1)
    }

    fn finish(&self) -> O {
        (self.combiner)(&self.first.finish(), &self.second.finish())
    }
}

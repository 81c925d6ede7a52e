use std::fmt::Debug;
use std::marker::PhantomData;

use num_traits::{CheckedAdd, CheckedSub, Zero};
use scorenet_core::Result;

use super::{invariant, overflow, Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::value::Value;

/// Sums the values a mapper extracts from a group.
///
/// Arithmetic is checked; an overflowing sum is a score overflow.
///
/// ```
/// use scorenet_scoring::stream::collector::{sum, Accumulator, Collector};
///
/// let hours = sum(|hours: &i64| *hours);
/// let mut acc = Collector::<(i64,)>::create_accumulator(&hours);
/// acc.accumulate(&5).unwrap();
/// acc.accumulate(&3).unwrap();
/// assert_eq!(acc.finish(), 8);
/// acc.retract(&5).unwrap();
/// assert_eq!(acc.finish(), 3);
/// ```
pub fn sum<L, T, F>(mapper: F) -> SumCollector<L, T, F>
where
    L: 'static,
    T: CheckedAdd + CheckedSub + Zero + Copy + PartialEq + Debug + Send + Sync + 'static,
    F: TupleFn<L, T>,
{
    SumCollector {
        mapper,
        _phantom: PhantomData,
    }
}

pub struct SumCollector<L, T, F> {
    mapper: F,
    _phantom: PhantomData<fn(L) -> T>,
}

impl<L, T, F> Collector<L> for SumCollector<L, T, F>
where
    L: 'static,
    T: CheckedAdd + CheckedSub + Zero + Copy + PartialEq + Debug + Send + Sync + 'static,
    F: TupleFn<L, T>,
{
    type Value = T;
    type Result = T;
    type Accumulator = SumAccumulator<T>;

    #[inline]
    fn extract(&self, facts: &[Value]) -> T {
        self.mapper.call(facts)
    }

    fn create_accumulator(&self) -> SumAccumulator<T> {
        SumAccumulator {
            sum: T::zero(),
            count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SumAccumulator<T> {
    sum: T,
    count: usize,
}

impl<T> Accumulator<T, T> for SumAccumulator<T>
where
    T: CheckedAdd + CheckedSub + Zero + Copy + PartialEq + Debug + Send + Sync + 'static,
{
    fn accumulate(&mut self, value: &T) -> Result<()> {
        self.sum = self
            .sum
            .checked_add(value)
            .ok_or_else(|| overflow("sum"))?;
        self.count += 1;
        Ok(())
    }

    fn retract(&mut self, value: &T) -> Result<()> {
        self.count = self
            .count
            .checked_sub(1)
            .ok_or_else(|| invariant("sum retracted from an empty group"))?;
        self.sum = self
            .sum
            .checked_sub(value)
            .ok_or_else(|| overflow("sum"))?;
        Ok(())
    }

    fn finish(&self) -> T {
        self.sum
    }
}

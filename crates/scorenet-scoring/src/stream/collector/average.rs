use std::marker::PhantomData;

use scorenet_core::Result;

use super::{invariant, Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::value::Value;

/// Mean of the integer values a mapper extracts from a group.
///
/// The result is `None` for an empty accumulator.
pub fn average<L, F>(mapper: F) -> AverageCollector<L, F>
where
    L: 'static,
    F: TupleFn<L, i64>,
{
    AverageCollector {
        mapper,
        _phantom: PhantomData,
    }
}

pub struct AverageCollector<L, F> {
    mapper: F,
    _phantom: PhantomData<fn() -> L>,
}

impl<L, F> Collector<L> for AverageCollector<L, F>
where
    L: 'static,
    F: TupleFn<L, i64>,
{
    type Value = i64;
    type Result = Option<f64>;
    type Accumulator = AverageAccumulator;

    #[inline]
    fn extract(&self, facts: &[Value]) -> i64 {
        self.mapper.call(facts)
    }

    fn create_accumulator(&self) -> AverageAccumulator {
        AverageAccumulator::default()
    }
}

/// Exact running sum and count; the division happens in `finish`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AverageAccumulator {
    sum: i128,
    count: usize,
}

impl Accumulator<i64, Option<f64>> for AverageAccumulator {
    fn accumulate(&mut self, value: &i64) -> Result<()> {
        self.sum += i128::from(*value);
        self.count += 1;
        Ok(())
    }

    fn retract(&mut self, value: &i64) -> Result<()> {
        self.count = self
            .count
            .checked_sub(1)
            .ok_or_else(|| invariant("average retracted from an empty group"))?;
        self.sum -= i128::from(*value);
        Ok(())
    }

    fn finish(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

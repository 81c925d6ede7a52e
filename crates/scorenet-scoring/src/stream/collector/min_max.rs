use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;

use scorenet_core::Result;

use super::{invariant, Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::value::Value;

/// Smallest value a mapper extracts from a group.
pub fn min<L, T, F>(mapper: F) -> MinMaxCollector<L, T, F>
where
    L: 'static,
    T: Ord + Clone + Debug + Send + Sync + 'static,
    F: TupleFn<L, T>,
{
    MinMaxCollector {
        mapper,
        max: false,
        _phantom: PhantomData,
    }
}

/// Largest value a mapper extracts from a group.
pub fn max<L, T, F>(mapper: F) -> MinMaxCollector<L, T, F>
where
    L: 'static,
    T: Ord + Clone + Debug + Send + Sync + 'static,
    F: TupleFn<L, T>,
{
    MinMaxCollector {
        mapper,
        max: true,
        _phantom: PhantomData,
    }
}

pub struct MinMaxCollector<L, T, F> {
    mapper: F,
    max: bool,
    _phantom: PhantomData<fn(L) -> T>,
}

impl<L, T, F> Collector<L> for MinMaxCollector<L, T, F>
where
    L: 'static,
    T: Ord + Clone + Debug + Send + Sync + 'static,
    F: TupleFn<L, T>,
{
    type Value = T;
    type Result = Option<T>;
    type Accumulator = MinMaxAccumulator<T>;

    #[inline]
    fn extract(&self, facts: &[Value]) -> T {
        self.mapper.call(facts)
    }

    fn create_accumulator(&self) -> MinMaxAccumulator<T> {
        MinMaxAccumulator {
            counts: BTreeMap::new(),
            max: self.max,
        }
    }
}

/// Ordered multiset of the extracted values.
///
/// Retracting the current extreme exposes the next one without a rescan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinMaxAccumulator<T: Ord> {
    counts: BTreeMap<T, usize>,
    max: bool,
}

impl<T> Accumulator<T, Option<T>> for MinMaxAccumulator<T>
where
    T: Ord + Clone + Debug + Send + Sync + 'static,
{
    fn accumulate(&mut self, value: &T) -> Result<()> {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
        Ok(())
    }

    fn retract(&mut self, value: &T) -> Result<()> {
        let count = self.counts.get_mut(value).ok_or_else(|| {
            invariant(format!("min/max retracted absent value {:?}", value))
        })?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(value);
        }
        Ok(())
    }

    fn finish(&self) -> Option<T> {
        let entry = if self.max {
            self.counts.last_key_value()
        } else {
            self.counts.first_key_value()
        };
        entry.map(|(value, _)| value.clone())
    }
}

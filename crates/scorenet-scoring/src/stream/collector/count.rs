use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use scorenet_core::Result;

use super::{invariant, Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::value::Value;

/// Counts the tuples of a group.
pub fn count<L: 'static>() -> CountCollector<L> {
    CountCollector {
        _phantom: PhantomData,
    }
}

pub struct CountCollector<L> {
    _phantom: PhantomData<fn() -> L>,
}

impl<L: 'static> Collector<L> for CountCollector<L> {
    type Value = ();
    type Result = usize;
    type Accumulator = CountAccumulator;

    #[inline]
    fn extract(&self, _facts: &[Value]) {}

    fn create_accumulator(&self) -> CountAccumulator {
        CountAccumulator::default()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountAccumulator {
    count: usize,
}

impl Accumulator<(), usize> for CountAccumulator {
    fn accumulate(&mut self, _value: &()) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn retract(&mut self, _value: &()) -> Result<()> {
        self.count = self
            .count
            .checked_sub(1)
            .ok_or_else(|| invariant("count retracted below zero"))?;
        Ok(())
    }

    fn finish(&self) -> usize {
        self.count
    }
}

/// Counts the distinct values a mapper extracts from a group.
///
/// ```
/// use scorenet_scoring::stream::collector::{count_distinct, Accumulator, Collector};
///
/// let rooms = count_distinct(|room: &u32| *room);
/// let mut acc = Collector::<(u32,)>::create_accumulator(&rooms);
/// acc.accumulate(&1).unwrap();
/// acc.accumulate(&1).unwrap();
/// acc.accumulate(&2).unwrap();
/// assert_eq!(acc.finish(), 2);
/// ```
pub fn count_distinct<L, K, F>(mapper: F) -> CountDistinctCollector<L, K, F>
where
    L: 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
    F: TupleFn<L, K>,
{
    CountDistinctCollector {
        mapper,
        _phantom: PhantomData,
    }
}

pub struct CountDistinctCollector<L, K, F> {
    mapper: F,
    _phantom: PhantomData<fn(L) -> K>,
}

impl<L, K, F> Collector<L> for CountDistinctCollector<L, K, F>
where
    L: 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
    F: TupleFn<L, K>,
{
    type Value = K;
    type Result = usize;
    type Accumulator = CountDistinctAccumulator<K>;

    #[inline]
    fn extract(&self, facts: &[Value]) -> K {
        self.mapper.call(facts)
    }

    fn create_accumulator(&self) -> CountDistinctAccumulator<K> {
        CountDistinctAccumulator {
            counts: HashMap::new(),
        }
    }
}

/// Multiset of the extracted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountDistinctAccumulator<K: Eq + Hash> {
    counts: HashMap<K, usize>,
}

impl<K> Accumulator<K, usize> for CountDistinctAccumulator<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn accumulate(&mut self, value: &K) -> Result<()> {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
        Ok(())
    }

    fn retract(&mut self, value: &K) -> Result<()> {
        let count = self
            .counts
            .get_mut(value)
            .ok_or_else(|| invariant("count_distinct retracted an absent value"))?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(value);
        }
        Ok(())
    }

    fn finish(&self) -> usize {
        self.counts.len()
    }
}

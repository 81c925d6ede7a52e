use std::fmt::Debug;
use std::marker::PhantomData;

use scorenet_core::Result;

use super::{invariant, Accumulator, Collector};
use crate::stream::function::TupleFn;
use crate::value::Value;

/// Collects the values a mapper extracts from a group, in ascending order.
///
/// Keeping the list sorted makes the result independent of the order in
/// which tuples arrived.
pub fn to_list<L, T, F>(mapper: F) -> ToListCollector<L, T, F>
where
    L: 'static,
    T: Ord + Clone + Debug + Send + Sync + 'static,
    F: TupleFn<L, T>,
{
    ToListCollector {
        mapper,
        _phantom: PhantomData,
    }
}

pub struct ToListCollector<L, T, F> {
    mapper: F,
    _phantom: PhantomData<fn(L) -> T>,
}

impl<L, T, F> Collector<L> for ToListCollector<L, T, F>
where
    L: 'static,
    T: Ord + Clone + Debug + Send + Sync + 'static,
    F: TupleFn<L, T>,
{
    type Value = T;
    type Result = Vec<T>;
    type Accumulator = ToListAccumulator<T>;

    #[inline]
    fn extract(&self, facts: &[Value]) -> T {
        self.mapper.call(facts)
    }

    fn create_accumulator(&self) -> ToListAccumulator<T> {
        ToListAccumulator { items: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToListAccumulator<T> {
    items: Vec<T>,
}

impl<T> Accumulator<T, Vec<T>> for ToListAccumulator<T>
where
    T: Ord + Clone + Debug + Send + Sync + 'static,
{
    fn accumulate(&mut self, value: &T) -> Result<()> {
        let at = self.items.partition_point(|item| item <= value);
        self.items.insert(at, value.clone());
        Ok(())
    }

    fn retract(&mut self, value: &T) -> Result<()> {
        let at = self
            .items
            .binary_search(value)
            .map_err(|_| invariant(format!("to_list retracted absent value {:?}", value)))?;
        self.items.remove(at);
        Ok(())
    }

    fn finish(&self) -> Vec<T> {
        self.items.clone()
    }
}

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use smallvec::SmallVec;

use scorenet_core::{Result, ScoreNetError};

use super::{Comparison, IndexKey, IndexedSet};
use crate::tuple::TupleId;
use crate::value::Value;

/// Tuple index for one side of a join or existence check.
///
/// `comparisons[i]` relates the stored `compare[i]` to the queried one:
/// a stored tuple matches a query when `stored <comparison> query` holds
/// for every comparison part and the equality parts are equal.
#[derive(Debug)]
pub(crate) struct Indexer {
    comparisons: Arc<[Comparison]>,
    buckets: HashMap<SmallVec<[Value; 2]>, Level>,
    size: usize,
}

#[derive(Debug)]
enum Level {
    Leaf(IndexedSet),
    Range(BTreeMap<Value, Level>),
}

impl Level {
    fn new(depth: usize, comparisons: &[Comparison]) -> Self {
        if depth == comparisons.len() {
            Level::Leaf(IndexedSet::default())
        } else {
            Level::Range(BTreeMap::new())
        }
    }

    fn put(&mut self, compare: &[Value], depth: usize, comparisons: &[Comparison], id: TupleId) -> bool {
        match self {
            Level::Leaf(set) => set.insert(id),
            Level::Range(map) => map
                .entry(compare[depth].clone())
                .or_insert_with(|| Level::new(depth + 1, comparisons))
                .put(compare, depth + 1, comparisons, id),
        }
    }

    fn remove(&mut self, compare: &[Value], depth: usize, id: TupleId) -> bool {
        match self {
            Level::Leaf(set) => set.remove(id),
            Level::Range(map) => {
                let part = &compare[depth];
                let Some(child) = map.get_mut(part) else {
                    return false;
                };
                let removed = child.remove(compare, depth + 1, id);
                if removed && child.is_empty() {
                    map.remove(part);
                }
                removed
            }
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Level::Leaf(set) => set.is_empty(),
            Level::Range(map) => map.is_empty(),
        }
    }

    fn visit(
        &self,
        query: &[Value],
        depth: usize,
        comparisons: &[Comparison],
        visitor: &mut dyn FnMut(&IndexedSet),
    ) {
        match self {
            Level::Leaf(set) => visitor(set),
            Level::Range(map) => {
                let q = &query[depth];
                let bounds: (Bound<&Value>, Bound<&Value>) = match comparisons[depth] {
                    Comparison::Less => (Bound::Unbounded, Bound::Excluded(q)),
                    Comparison::LessOrEqual => (Bound::Unbounded, Bound::Included(q)),
                    Comparison::Greater => (Bound::Excluded(q), Bound::Unbounded),
                    Comparison::GreaterOrEqual => (Bound::Included(q), Bound::Unbounded),
                };
                for (_, child) in map.range::<Value, _>(bounds) {
                    child.visit(query, depth + 1, comparisons, visitor);
                }
            }
        }
    }
}

impl Indexer {
    pub(crate) fn new(comparisons: Arc<[Comparison]>) -> Self {
        Self {
            comparisons,
            buckets: HashMap::new(),
            size: 0,
        }
    }

    pub(crate) fn put(&mut self, key: &IndexKey, id: TupleId) -> Result<()> {
        let comparisons = &self.comparisons;
        let inserted = self
            .buckets
            .entry(key.equal.clone())
            .or_insert_with(|| Level::new(0, comparisons))
            .put(&key.compare, 0, comparisons, id);
        if !inserted {
            return Err(ScoreNetError::Internal(format!(
                "tuple {} indexed twice under {:?}",
                id, key
            )));
        }
        self.size += 1;
        Ok(())
    }

    pub(crate) fn remove(&mut self, key: &IndexKey, id: TupleId) -> Result<()> {
        let removed = match self.buckets.get_mut(&key.equal) {
            Some(level) => {
                let removed = level.remove(&key.compare, 0, id);
                if removed && level.is_empty() {
                    self.buckets.remove(&key.equal);
                }
                removed
            }
            None => false,
        };
        if !removed {
            return Err(ScoreNetError::Internal(format!(
                "tuple {} is not indexed under {:?}",
                id, key
            )));
        }
        self.size -= 1;
        Ok(())
    }

    /// Tuples matching a key extracted from the other side.
    pub(crate) fn matches(&self, query: &IndexKey) -> Vec<TupleId> {
        let mut out = Vec::new();
        self.visit(query, &mut |set| out.extend(set.iter()));
        out
    }

    /// Number of tuples matching a key extracted from the other side.
    pub(crate) fn count(&self, query: &IndexKey) -> usize {
        let mut count = 0;
        self.visit(query, &mut |set| count += set.len());
        count
    }

    /// Total number of indexed tuples.
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    fn visit(&self, query: &IndexKey, visitor: &mut dyn FnMut(&IndexedSet)) {
        if let Some(level) = self.buckets.get(&query.equal) {
            level.visit(&query.compare, 0, &self.comparisons, visitor);
        }
    }
}

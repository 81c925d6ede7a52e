//! Join indexing.
//!
//! An [`Indexer`] maps the key extracted from a tuple to the set of tuples
//! sharing it. Keys have an equality part, hashed as one composite value,
//! and zero or more comparison parts, each resolved through an ordered map.
//! A key without any part puts every tuple in one bucket.

mod indexed_set;
mod indexer;
mod key;


pub(crate) use indexed_set::IndexedSet;
pub(crate) use indexer::Indexer;
pub(crate) use key::IndexKey;
pub use key::Comparison;

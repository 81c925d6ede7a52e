//! Per-edge bookkeeping stored inside tuples.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::index::IndexKey;
use crate::value::{Facts, Value};

use super::TupleId;

/// The inverse of one collector contribution.
///
/// Holds the value that was accumulated so the same contribution can be
/// retracted later.
pub(crate) struct UndoToken(pub(crate) Box<dyn Any + Send + Sync>);

impl fmt::Debug for UndoToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UndoToken")
    }
}

/// What a consuming node remembers about one input tuple.
#[derive(Debug, Default)]
pub(crate) enum Slot {
    #[default]
    Vacant,
    Filter {
        out: Option<TupleId>,
    },
    /// One side of a join: the indexed key and the pairs built with it,
    /// keyed by the tuple on the other side.
    Join {
        key: IndexKey,
        outs: HashMap<TupleId, TupleId>,
    },
    ExistsLeft {
        key: IndexKey,
        count: usize,
        /// Matching right tuples, tracked only when a filtering joiner is present.
        matched: HashSet<TupleId>,
        out: Option<TupleId>,
    },
    ExistsRight {
        key: IndexKey,
        /// Left tuples counting this one, tracked only when filtering.
        lefts: HashSet<TupleId>,
    },
    Group {
        key: Value,
        token: Option<UndoToken>,
    },
    Map {
        out: TupleId,
    },
    /// A tuple passed through one side of a concatenation.
    Concat {
        out: TupleId,
    },
    Flatten {
        outs: Vec<(Value, TupleId)>,
    },
    Distinct {
        key: Facts,
    },
}

//! Erased stream definitions.
//!
//! Typed streams are thin wrappers over a [`StreamDef`]: an operator plus the
//! definitions it reads from. The network builder walks these DAGs bottom-up
//! and turns every definition into a node.

use std::any::{type_name, TypeId};
use std::sync::Arc;

use smallvec::{smallvec, SmallVec};

use scorenet_core::Fact;

use super::collector::ErasedCollector;
use super::function::ErasedFn;
use super::joiner::JoinerSet;
use crate::value::Value;

/// Largest tuple arity a stream can carry.
pub(crate) const MAX_ARITY: usize = 4;

/// Expands the last element of a tuple into zero or more elements.
pub(crate) type Expansion = Arc<dyn Fn(&Value) -> Vec<Value> + Send + Sync>;

/// Whether a semi-join keeps left tuples with or without a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ExistenceMode {
    Exists,
    NotExists,
}

#[derive(Clone)]
pub(crate) enum StreamOp {
    ForEach {
        type_id: TypeId,
        type_name: &'static str,
    },
    Filter(ErasedFn<bool>),
    Join(Arc<JoinerSet>),
    Exists {
        mode: ExistenceMode,
        joiners: Arc<JoinerSet>,
    },
    Group {
        key: Option<ErasedFn<Value>>,
        collector: Option<Arc<dyn ErasedCollector>>,
    },
    Map(ErasedFn<Value>),
    FlattenLast(Expansion),
    Distinct,
    /// Both inputs, same arity, passed through unchanged.
    Concat,
}

impl StreamOp {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            StreamOp::ForEach { .. } => "for_each",
            StreamOp::Filter(_) => "filter",
            StreamOp::Join(_) => "join",
            StreamOp::Exists {
                mode: ExistenceMode::Exists,
                ..
            } => "if_exists",
            StreamOp::Exists { .. } => "if_not_exists",
            StreamOp::Group { .. } => "group_by",
            StreamOp::Map(_) => "map",
            StreamOp::FlattenLast(_) => "flatten_last",
            StreamOp::Distinct => "distinct",
            StreamOp::Concat => "concat",
        }
    }

    /// Arity of the produced tuples, given the arities of the parents.
    ///
    /// Returns `None` if the parents cannot feed this operator.
    pub(crate) fn output_arity(&self, parents: &[usize]) -> Option<usize> {
        match (self, parents) {
            (StreamOp::ForEach { .. }, []) => Some(1),
            (StreamOp::Filter(_) | StreamOp::Distinct | StreamOp::FlattenLast(_), [n]) => Some(*n),
            (StreamOp::Join(_), [left, 1]) => Some(left + 1),
            (StreamOp::Exists { .. }, [left, 1]) => Some(*left),
            (StreamOp::Group { key, collector }, [_]) => {
                match (key.is_some(), collector.is_some()) {
                    (true, true) => Some(2),
                    (false, false) => None,
                    _ => Some(1),
                }
            }
            (StreamOp::Map(_), [_]) => Some(1),
            (StreamOp::Concat, [left, right]) if left == right => Some(*left),
            _ => None,
        }
    }
}

/// One node of a stream definition DAG.
pub(crate) struct StreamDef {
    pub(crate) op: StreamOp,
    pub(crate) parents: SmallVec<[Arc<StreamDef>; 2]>,
    pub(crate) arity: usize,
}

impl StreamDef {
    pub(crate) fn for_each<T: Fact>() -> Arc<Self> {
        Arc::new(StreamDef {
            op: StreamOp::ForEach {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
            },
            parents: SmallVec::new(),
            arity: 1,
        })
    }

    pub(crate) fn unary(parent: &Arc<StreamDef>, op: StreamOp, arity: usize) -> Arc<Self> {
        Arc::new(StreamDef {
            op,
            parents: smallvec![parent.clone()],
            arity,
        })
    }

    pub(crate) fn binary(
        left: &Arc<StreamDef>,
        right: &Arc<StreamDef>,
        op: StreamOp,
        arity: usize,
    ) -> Arc<Self> {
        Arc::new(StreamDef {
            op,
            parents: smallvec![left.clone(), right.clone()],
            arity,
        })
    }
}

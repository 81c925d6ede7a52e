//! The operator nodes of a constraint network.
//!
//! Nodes never call into other nodes. A node reacts to one input tuple by
//! changing its own state and by queueing changes of its output tuples
//! through a [`NodeContext`]; the scheduler later delivers those changes to
//! the consumers.

mod concat;
mod context;
mod distinct;
mod exists;
mod filter;
mod flatten;
mod group;
mod join;
mod map;
mod terminal;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use scorenet_core::{Result, Score, ScoreNetError};

pub(crate) use context::NodeContext;
pub(crate) use terminal::{TerminalNode, TerminalSpec};

use concat::ConcatNode;
use distinct::DistinctNode;
use exists::ExistsNode;
use filter::FilterNode;
use flatten::FlattenLastNode;
use group::GroupNode;
use join::JoinNode;
use map::MapNode;

use crate::stream::definition::StreamOp;
use crate::tuple::{Slot, TupleId};

/// Position of a node in the network arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Which input of a two-input node an edge feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Side {
    Left,
    Right,
}

/// One consumer of a node's output tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Downstream {
    pub(crate) node: NodeId,
    pub(crate) side: Side,
}

/// The compiled form of one node, shared by every session.
#[derive(Clone)]
pub(crate) enum NodeSpec<Sc: Score> {
    Stream(StreamOp),
    Terminal(Arc<TerminalSpec<Sc>>),
}

impl<Sc: Score> NodeSpec<Sc> {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            NodeSpec::Stream(op) => op.name(),
            NodeSpec::Terminal(_) => "terminal",
        }
    }
}

/// Runtime state of one node.
pub(crate) enum NodeKind<Sc: Score> {
    Source,
    Filter(FilterNode),
    Join(JoinNode),
    Exists(ExistsNode),
    Group(GroupNode),
    Map(MapNode),
    FlattenLast(FlattenLastNode),
    Distinct(DistinctNode),
    Concat(ConcatNode),
    Terminal(TerminalNode<Sc>),
}

impl<Sc: Score> NodeKind<Sc> {
    /// Creates empty node state. `slots` holds, per input side, the slot the
    /// node owns in its producer's tuples.
    pub(crate) fn instantiate(spec: &NodeSpec<Sc>, slots: &[usize]) -> Result<Self> {
        let slot = |side: usize| {
            slots.get(side).copied().ok_or_else(|| {
                ScoreNetError::Internal(format!("{} node is missing input {}", spec.name(), side))
            })
        };
        let kind = match spec {
            NodeSpec::Stream(StreamOp::ForEach { .. }) => NodeKind::Source,
            NodeSpec::Stream(StreamOp::Filter(predicate)) => {
                NodeKind::Filter(FilterNode::new(predicate.clone(), slot(0)?))
            }
            NodeSpec::Stream(StreamOp::Join(joiners)) => {
                NodeKind::Join(JoinNode::new(joiners.clone(), slot(0)?, slot(1)?))
            }
            NodeSpec::Stream(StreamOp::Exists { mode, joiners }) => {
                NodeKind::Exists(ExistsNode::new(*mode, joiners.clone(), slot(0)?, slot(1)?))
            }
            NodeSpec::Stream(StreamOp::Group { key, collector }) => {
                NodeKind::Group(GroupNode::new(key.clone(), collector.clone(), slot(0)?))
            }
            NodeSpec::Stream(StreamOp::Map(mapper)) => {
                NodeKind::Map(MapNode::new(mapper.clone(), slot(0)?))
            }
            NodeSpec::Stream(StreamOp::FlattenLast(expand)) => {
                NodeKind::FlattenLast(FlattenLastNode::new(expand.clone(), slot(0)?))
            }
            NodeSpec::Stream(StreamOp::Distinct) => NodeKind::Distinct(DistinctNode::new(slot(0)?)),
            NodeSpec::Stream(StreamOp::Concat) => NodeKind::Concat(ConcatNode::new(slot(0)?, slot(1)?)),
            NodeSpec::Terminal(spec) => NodeKind::Terminal(TerminalNode::new(spec.clone())),
        };
        Ok(kind)
    }

    pub(crate) fn insert(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match self {
            NodeKind::Source => Err(no_inputs()),
            NodeKind::Filter(node) => node.insert(tuple, ctx),
            NodeKind::Join(node) => node.insert(side, tuple, ctx),
            NodeKind::Exists(node) => node.insert(side, tuple, ctx),
            NodeKind::Group(node) => node.insert(tuple, ctx),
            NodeKind::Map(node) => node.insert(tuple, ctx),
            NodeKind::FlattenLast(node) => node.insert(tuple, ctx),
            NodeKind::Distinct(node) => node.insert(tuple, ctx),
            NodeKind::Concat(node) => node.insert(side, tuple, ctx),
            NodeKind::Terminal(node) => node.insert(tuple, ctx.tuples.facts(tuple)?),
        }
    }

    pub(crate) fn update(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match self {
            NodeKind::Source => Err(no_inputs()),
            NodeKind::Filter(node) => node.update(tuple, ctx),
            NodeKind::Join(node) => node.update(side, tuple, ctx),
            NodeKind::Exists(node) => node.update(side, tuple, ctx),
            NodeKind::Group(node) => node.update(tuple, ctx),
            NodeKind::Map(node) => node.update(tuple, ctx),
            NodeKind::FlattenLast(node) => node.update(tuple, ctx),
            NodeKind::Distinct(node) => node.update(tuple, ctx),
            NodeKind::Concat(node) => node.update(side, tuple, ctx),
            NodeKind::Terminal(node) => node.update(tuple, ctx.tuples.facts(tuple)?),
        }
    }

    pub(crate) fn retract(&mut self, side: Side, tuple: TupleId, ctx: &mut NodeContext<'_>) -> Result<()> {
        match self {
            NodeKind::Source => Err(no_inputs()),
            NodeKind::Filter(node) => node.retract(tuple, ctx),
            NodeKind::Join(node) => node.retract(side, tuple, ctx),
            NodeKind::Exists(node) => node.retract(side, tuple, ctx),
            NodeKind::Group(node) => node.retract(tuple, ctx),
            NodeKind::Map(node) => node.retract(tuple, ctx),
            NodeKind::FlattenLast(node) => node.retract(tuple, ctx),
            NodeKind::Distinct(node) => node.retract(tuple, ctx),
            NodeKind::Concat(node) => node.retract(side, tuple, ctx),
            NodeKind::Terminal(node) => node.retract(tuple),
        }
    }

    /// Emits work deferred until all inputs of the flush arrived.
    pub(crate) fn settle(&mut self, ctx: &mut NodeContext<'_>) -> Result<()> {
        match self {
            NodeKind::Group(node) => node.settle(ctx),
            _ => Ok(()),
        }
    }
}

/// A node in a session: its state, consumers and queue of dirty output
/// tuples.
pub(crate) struct Node<Sc: Score> {
    pub(crate) kind: NodeKind<Sc>,
    pub(crate) downstream: Vec<Downstream>,
    pub(crate) queue: Vec<TupleId>,
}

fn no_inputs() -> ScoreNetError {
    ScoreNetError::Internal("source nodes have no inputs".to_string())
}

pub(crate) fn unexpected_slot(node: &str, tuple: TupleId, slot: &Slot) -> ScoreNetError {
    ScoreNetError::Internal(format!(
        "{} found unexpected slot {:?} on tuple {}",
        node, slot, tuple
    ))
}

//! Draining of dirty queues.
//!
//! Layers are visited in order, so every input of a node has settled before
//! the node is visited. At each node the queued tuples are delivered in
//! three passes: retracts, then updates, then inserts.

use scorenet_core::{Result, Score, ScoreNetError};

use crate::node::{Node, NodeContext, NodeId};
use crate::tuple::{TupleArena, TupleId, TupleState};

/// Work done by one flush.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FlushStats {
    pub(crate) inserts: usize,
    pub(crate) updates: usize,
    pub(crate) retracts: usize,
    /// Nodes that had queued work or settled.
    pub(crate) visited: usize,
}

/// Propagates every queued change to the terminals.
///
/// On error the node states are left half-applied and must not be used
/// again.
pub(crate) fn flush<Sc: Score>(
    nodes: &mut [Node<Sc>],
    layers: &[Vec<NodeId>],
    tuples: &mut TupleArena,
) -> Result<FlushStats> {
    let mut stats = FlushStats::default();
    for layer in layers {
        for &id in layer {
            let node = &mut nodes[id.0];
            let width = node.downstream.len();
            node.kind
                .settle(&mut NodeContext::new(tuples, &mut node.queue, width))?;
            if node.queue.is_empty() {
                continue;
            }
            stats.visited += 1;
            drain(nodes, id, tuples, &mut stats)?;
        }
    }
    Ok(stats)
}

fn drain<Sc: Score>(
    nodes: &mut [Node<Sc>],
    id: NodeId,
    tuples: &mut TupleArena,
    stats: &mut FlushStats,
) -> Result<()> {
    let queue = std::mem::take(&mut nodes[id.0].queue);
    let mut updates = Vec::new();
    let mut inserts = Vec::new();

    for tuple in queue {
        match tuples.state(tuple)? {
            TupleState::Aborting => {
                tuples.release(tuple)?;
            }
            TupleState::Dying => {
                deliver(nodes, id, tuple, tuples, Delivery::Retract)?;
                tuples.release(tuple)?;
                stats.retracts += 1;
            }
            TupleState::Updating => updates.push(tuple),
            TupleState::Creating => inserts.push(tuple),
            state => {
                return Err(ScoreNetError::Internal(format!(
                    "tuple {} queued at {} in state {}",
                    tuple, id, state
                )))
            }
        }
    }
    for tuple in updates {
        deliver(nodes, id, tuple, tuples, Delivery::Update)?;
        tuples.set_state(tuple, TupleState::Ok)?;
        stats.updates += 1;
    }
    for tuple in inserts {
        deliver(nodes, id, tuple, tuples, Delivery::Insert)?;
        tuples.set_state(tuple, TupleState::Ok)?;
        stats.inserts += 1;
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Delivery {
    Insert,
    Update,
    Retract,
}

/// Hands one tuple to every consumer of the producing node.
fn deliver<Sc: Score>(
    nodes: &mut [Node<Sc>],
    producer: NodeId,
    tuple: TupleId,
    tuples: &mut TupleArena,
    delivery: Delivery,
) -> Result<()> {
    for i in 0..nodes[producer.0].downstream.len() {
        let edge = nodes[producer.0].downstream[i];
        let consumer = &mut nodes[edge.node.0];
        let width = consumer.downstream.len();
        let mut ctx = NodeContext::new(tuples, &mut consumer.queue, width);
        match delivery {
            Delivery::Insert => consumer.kind.insert(edge.side, tuple, &mut ctx)?,
            Delivery::Update => consumer.kind.update(edge.side, tuple, &mut ctx)?,
            Delivery::Retract => consumer.kind.retract(edge.side, tuple, &mut ctx)?,
        }
    }
    Ok(())
}

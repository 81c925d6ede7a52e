use scorenet_core::{Result, ScoreNetError};

use crate::tuple::{TupleArena, TupleId, TupleState};
use crate::value::Facts;

/// What a node may touch while handling one input tuple: the session's
/// tuples and its own queue of dirty output tuples.
pub(crate) struct NodeContext<'a> {
    pub(crate) tuples: &'a mut TupleArena,
    queue: &'a mut Vec<TupleId>,
    width: usize,
}

impl<'a> NodeContext<'a> {
    /// `width` is the number of downstream edges of the node, which is the
    /// number of slots its output tuples need.
    pub(crate) fn new(tuples: &'a mut TupleArena, queue: &'a mut Vec<TupleId>, width: usize) -> Self {
        Self {
            tuples,
            queue,
            width,
        }
    }

    /// Creates an output tuple and queues its insert.
    pub(crate) fn insert_out(&mut self, facts: Facts) -> TupleId {
        let id = self.tuples.alloc(facts, self.width);
        self.queue.push(id);
        id
    }

    /// Queues an update of an output tuple.
    ///
    /// A tuple that is still queued for insert or update needs nothing more:
    /// downstream nodes read its facts when the queue drains.
    pub(crate) fn update_out(&mut self, id: TupleId) -> Result<()> {
        match self.tuples.state(id)? {
            TupleState::Ok => {
                self.tuples.set_state(id, TupleState::Updating)?;
                self.queue.push(id);
                Ok(())
            }
            TupleState::Creating | TupleState::Updating => Ok(()),
            state => Err(illegal(id, state, "update")),
        }
    }

    /// Queues the retract of an output tuple.
    ///
    /// A tuple whose insert has not propagated yet is aborted and will never
    /// be seen downstream.
    pub(crate) fn retract_out(&mut self, id: TupleId) -> Result<()> {
        match self.tuples.state(id)? {
            TupleState::Ok => {
                self.tuples.set_state(id, TupleState::Dying)?;
                self.queue.push(id);
                Ok(())
            }
            TupleState::Creating => self.tuples.set_state(id, TupleState::Aborting),
            TupleState::Updating => self.tuples.set_state(id, TupleState::Dying),
            state => Err(illegal(id, state, "retract")),
        }
    }

    /// Replaces the facts of an output tuple, queueing an update only if
    /// something changed.
    pub(crate) fn refresh_out(&mut self, id: TupleId, facts: Facts) -> Result<()> {
        if self.tuples.refresh_facts(id, facts)? {
            self.update_out(id)?;
        }
        Ok(())
    }
}

fn illegal(id: TupleId, state: TupleState, operation: &str) -> ScoreNetError {
    ScoreNetError::Internal(format!("cannot {} tuple {} in state {}", operation, id, state))
}

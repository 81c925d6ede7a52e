//! Tuples: the records that flow through the network.
//!
//! A tuple is owned by the node that produced it and lives in the session's
//! [`TupleArena`]. Consumers keep their per-tuple bookkeeping in the
//! tuple's store, one [`Slot`] per downstream edge of the producer.

mod arena;
mod slot;
mod state;


pub(crate) use arena::TupleArena;
pub use arena::TupleId;
pub(crate) use slot::{Slot, UndoToken};
pub use state::TupleState;

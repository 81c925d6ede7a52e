//! Compiled constraint networks.
//!
//! A [`NetworkTemplate`] is the read-only topology built once from the
//! constraint definitions: one node per distinct stream operator, the edges
//! between them and the topological layers the scheduler walks. Every
//! [`ScoreSession`](crate::session::ScoreSession) instantiates its own node
//! state from a template.

mod builder;
mod scheduler;
mod template;


pub(crate) use scheduler::flush;
pub use template::NetworkTemplate;
pub(crate) use template::ConstraintEntry;

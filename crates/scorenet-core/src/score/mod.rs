//! Score types for representing solution quality
//!
//! Scores are summed per constraint by the terminal nodes of a network.
//! All score types are immutable `Copy` values; every arithmetic path used
//! by the engine goes through the checked operations of [`Score`].

#[macro_use]
mod macros;

mod bendable;
mod hard_medium_soft;
mod hard_soft;
mod level;
mod simple;
mod traits;


pub use bendable::BendableScore;
pub use hard_medium_soft::HardMediumSoftScore;
pub use hard_soft::HardSoftScore;
pub use level::ScoreLevel;
pub use simple::SimpleScore;
pub use traits::{ParseableScore, Score, ScoreParseError};

//! scorenet core - score types, fact identity and errors
//!
//! This crate provides the fundamental abstractions shared by the
//! scorenet crates:
//! - Score types for representing solution quality
//! - The [`Fact`] identity contract for values tracked by a session
//! - Constraint identification and impact types
//! - The engine-wide error type

pub mod constraint;
pub mod error;
pub mod fact;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType};
pub use error::{Result, ScoreNetError};
pub use fact::{Fact, PlanningId};
pub use score::{
    BendableScore, HardMediumSoftScore, HardSoftScore, ParseableScore, Score, ScoreLevel,
    ScoreParseError, SimpleScore,
};

//! Incremental constraint evaluation for scorenet.
//!
//! This crate compiles declarative constraint streams into a propagation
//! network and keeps a weighted score current while facts change:
//! - Constraint streams (`ConstraintFactory`, `UniConstraintStream`, ...)
//!   with joiners and collectors
//! - Network templates, compiled once with node sharing
//! - Score sessions with `insert` / `update` / `retract` / `calculate_score`
//!
//! # Architecture
//!
//! Streams are type-safe on the surface and erased underneath: tuples carry
//! [`Value`]s and closures are stored as `Arc<dyn Fn>`, so nodes of
//! different constraints can be shared and one template serves any number
//! of sessions.

#![allow(clippy::type_complexity)]

pub mod api;
mod index;
pub mod network;
mod node;
pub mod session;
pub mod stream;
mod tuple;
pub mod value;

// ============================================================================
// Networks and Sessions
// ============================================================================

pub use network::NetworkTemplate;
pub use session::{ScoreSession, SessionState};
pub use value::Value;

// ============================================================================
// Fluent Constraint Stream API
// ============================================================================

pub use stream::{
    BiConstraintStream, Constraint, ConstraintBuilder, ConstraintFactory, ConstraintProvider,
    QuadConstraintStream, TriConstraintStream, UniConstraintStream,
};

// ============================================================================
// Analysis and Weights
// ============================================================================

pub use api::analysis::{
    ConstraintAnalysis, ConstraintJustification, DetailedConstraintMatch, EntityRef, Indictment,
    IndictmentMap, ScoreExplanation,
};
pub use api::weight_overrides::{ConstraintWeightOverrides, WeightProvider};

//! Score analysis and constraint weight configuration.
//!
//! - Analysis types returned by
//!   [`ScoreSession::explain`](crate::session::ScoreSession::explain) and
//!   [`ScoreSession::indictments`](crate::session::ScoreSession::indictments)
//! - Weight overrides applied when a network is built

pub mod analysis;
pub mod weight_overrides;


pub use analysis::{
    ConstraintAnalysis, ConstraintJustification, DetailedConstraintMatch, EntityRef, Indictment,
    IndictmentMap, ScoreExplanation,
};
pub use weight_overrides::{ConstraintWeightOverrides, WeightProvider};

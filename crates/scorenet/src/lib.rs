//! scorenet - Incremental Constraint Scoring in Rust
//!
//! Declare constraints as streams over your facts, build a network once and
//! keep a score up to date while facts are inserted, updated and retracted.
//!
//! # Example
//!
//! ```rust
//! use scorenet::prelude::*;
//!
//! #[derive(Debug)]
//! struct Shift { id: u32, employee: Option<u32> }
//!
//! impl PlanningId for Shift {
//!     type Id = u32;
//!     fn planning_id(&self) -> u32 { self.id }
//! }
//!
//! let factory = ConstraintFactory::<HardSoftScore>::new();
//! let unassigned = factory
//!     .for_each::<Shift>()
//!     .filter(|s: &Shift| s.employee.is_none())
//!     .penalize(HardSoftScore::of_soft(1))
//!     .as_constraint("Unassigned shift");
//!
//! let template = NetworkTemplate::build(vec![unassigned], &NetworkConfig::default()).unwrap();
//! let mut session = template.new_session().unwrap();
//! session.insert(Shift { id: 1, employee: None }).unwrap();
//! assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_soft(-1));
//! ```

// Score types
pub use scorenet_core::score::{
    BendableScore, HardMediumSoftScore, HardSoftScore, ParseableScore, Score, SimpleScore,
};

// Facts and errors
pub use scorenet_core::{ConstraintRef, Fact, ImpactType, PlanningId, Result, ScoreNetError};

// Configuration
pub use scorenet_config::{ConfigError, EnvironmentMode, NetworkConfig};

// Constraint stream API
pub use scorenet_scoring::stream;

// Networks and sessions
pub use scorenet_scoring::{NetworkTemplate, ScoreSession, SessionState};

// Score analysis
pub use scorenet_scoring::{
    ConstraintAnalysis, ConstraintJustification, ConstraintWeightOverrides, DetailedConstraintMatch,
    EntityRef, Indictment, IndictmentMap, ScoreExplanation, WeightProvider,
};

#[cfg(feature = "console")]
pub mod console;

pub mod prelude {
    pub use super::{
        BendableScore, HardMediumSoftScore, HardSoftScore, Score, SimpleScore,
    };
    pub use super::stream::{collector, joiner, Constraint, ConstraintFactory, ConstraintProvider};
    pub use super::{EnvironmentMode, NetworkConfig, NetworkTemplate, ScoreSession};
    pub use super::{Fact, PlanningId};
}

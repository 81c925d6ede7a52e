//! Error types for scorenet

use thiserror::Error;

/// Main error type for network building and score sessions.
#[derive(Debug, Error)]
pub enum ScoreNetError {
    /// A fact with the same identity is already tracked by the session.
    #[error("Fact already tracked: {type_name} with id {id}")]
    FactAlreadyTracked { type_name: &'static str, id: String },

    /// The fact is not tracked by the session.
    #[error("Fact not tracked: {type_name} with id {id}")]
    FactNotTracked { type_name: &'static str, id: String },

    /// A collector was asked to undo a contribution it never accumulated.
    #[error("Collector invariant violated: {0}")]
    CollectorInvariant(String),

    /// Constraint authoring error, detected while building the network.
    #[error("Constraint '{constraint}' is invalid: {message}")]
    ConstraintDefinition { constraint: String, message: String },

    /// Score arithmetic overflowed while accumulating a constraint.
    #[error("Score overflow in constraint '{constraint}'")]
    ScoreOverflow { constraint: String },

    /// A previous flush failed and the session must be discarded.
    #[error("Session is corrupted by an earlier failure and must be discarded")]
    SessionCorrupted,

    /// Error in network configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScoreNetError {
    /// Shorthand for [`ScoreNetError::ConstraintDefinition`].
    pub fn definition(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        ScoreNetError::ConstraintDefinition {
            constraint: constraint.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for scorenet operations
pub type Result<T> = std::result::Result<T, ScoreNetError>;

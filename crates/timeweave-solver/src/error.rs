//! Error types for solving and solve sessions.

use thiserror::Error;

use timeweave_core::{HardMediumSoftScore, ScheduleError};

use crate::config::ConfigError;

/// Main error type for the solver and the session manager.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Configuration could not be loaded or is not usable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The fact set was rejected before a session was recorded.
    #[error(transparent)]
    InvalidFacts(#[from] ScheduleError),

    /// The end-of-solve re-evaluation disagreed with the tracked best
    /// score. The solve result cannot be trusted.
    #[error("score corruption: tracked best {tracked} but re-evaluation produced {actual}")]
    ScoreCorruption {
        tracked: HardMediumSoftScore,
        actual: HardMediumSoftScore,
    },

    /// A session with this id is still running.
    #[error("session '{session_id}' is already running")]
    SessionActive { session_id: String },

    /// An internal fault, e.g. an index inconsistency while applying a
    /// move the solver itself generated.
    #[error("internal solver fault: {0}")]
    Internal(String),
}

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, SolverError>;

//! Solver configuration loaded from TOML.
//!
//! Controls termination, move foraging and the acceptance policy without
//! code changes.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use timeweave_solver::config::SolverConfig;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     random_seed = 42
//!
//!     [termination]
//!     seconds_spent_limit = 10
//!     unimproved_step_count_limit = 2000
//!
//!     [acceptor]
//!     type = "late_acceptance"
//!     late_acceptance_size = 400
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Duration::from_secs(10));
//! assert_eq!(config.random_seed, Some(42));
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use timeweave_core::HardMediumSoftScore;

/// Default wall-clock limit in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 30;
/// Default candidate moves foraged per local search step.
pub const DEFAULT_MOVES_PER_STEP: usize = 16;
/// Default late acceptance history size.
pub const DEFAULT_LATE_ACCEPTANCE_SIZE: usize = 400;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main solver configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Random seed for reproducible runs; omitted means OS entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Candidate moves foraged per local search step.
    #[serde(default)]
    pub moves_per_step: Option<usize>,

    /// Termination configuration.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Acceptance policy for the local search phase.
    #[serde(default)]
    pub acceptor: Option<AcceptorConfig>,
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the number of candidate moves per step.
    pub fn with_moves_per_step(mut self, moves: usize) -> Self {
        self.moves_per_step = Some(moves);
        self
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the step count limit.
    pub fn with_step_count_limit(mut self, steps: u64) -> Self {
        self.termination = Some(TerminationConfig {
            step_count_limit: Some(steps),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the unimproved step count limit.
    pub fn with_unimproved_step_count_limit(mut self, steps: u64) -> Self {
        self.termination = Some(TerminationConfig {
            unimproved_step_count_limit: Some(steps),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the best score target, rendered in score notation.
    pub fn with_best_score_limit(mut self, target: HardMediumSoftScore) -> Self {
        self.termination = Some(TerminationConfig {
            best_score_limit: Some(target.to_string()),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the acceptance policy.
    pub fn with_acceptor(mut self, acceptor: AcceptorConfig) -> Self {
        self.acceptor = Some(acceptor);
        self
    }

    /// The wall-clock limit, defaulted when not configured.
    pub fn time_limit(&self) -> Duration {
        self.termination
            .as_ref()
            .and_then(|t| t.seconds_spent_limit)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIME_LIMIT_SECS))
    }

    /// Candidate moves per step, defaulted when not configured.
    pub fn moves_per_step(&self) -> usize {
        self.moves_per_step.unwrap_or(DEFAULT_MOVES_PER_STEP).max(1)
    }

    /// The parsed best score target, if one is configured.
    ///
    /// # Errors
    ///
    /// A target string that is not valid score notation is a
    /// configuration error.
    pub fn best_score_target(&self) -> Result<Option<HardMediumSoftScore>, ConfigError> {
        let Some(raw) = self
            .termination
            .as_ref()
            .and_then(|t| t.best_score_limit.as_deref())
        else {
            return Ok(None);
        };
        raw.parse::<HardMediumSoftScore>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid(format!("best_score_limit: {e}")))
    }
}

/// Termination configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum seconds to spend solving.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum number of steps.
    pub step_count_limit: Option<u64>,

    /// Maximum steps without improvement before terminating.
    pub unimproved_step_count_limit: Option<u64>,

    /// Target best score in score notation, e.g. `"0hard/0medium/0soft"`.
    pub best_score_limit: Option<String>,
}

/// Acceptance policy configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AcceptorConfig {
    /// Accept only moves at least as good as the last step.
    HillClimbing,

    /// Compare against the score from N steps ago.
    LateAcceptance {
        late_acceptance_size: Option<usize>,
    },

    /// Accept worse moves with temperature-scaled probability.
    SimulatedAnnealing {
        starting_temperature: Option<f64>,
        decay: Option<f64>,
    },
}

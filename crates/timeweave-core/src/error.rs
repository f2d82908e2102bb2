//! Error types for the timeweave core model

use std::fmt;

use thiserror::Error;

/// A single structural defect found while validating a fact set.
///
/// Validation never stops at the first defect; callers receive every
/// issue so a rejected fact set can be repaired in one round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactIssue {
    /// Entity kind, e.g. `"timeslot"` or `"event_part"`.
    pub entity: &'static str,
    /// Id of the offending record.
    pub id: u64,
    /// Field (or field pair) the issue is about.
    pub field: &'static str,
    /// Human-readable description of the defect.
    pub message: String,
}

impl fmt::Display for FactIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} field '{}': {}",
            self.entity, self.id, self.field, self.message
        )
    }
}

/// Main error type for schedule construction and evaluation.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The fact set failed structural validation; carries every issue found.
    #[error("invalid facts: {} issue(s): {}", .0.len(), format_issues(.0))]
    InvalidFacts(Vec<FactIssue>),

    /// An id referenced a record that is not part of the fact set.
    #[error("unknown {entity} reference {id}")]
    UnknownReference { entity: &'static str, id: u64 },

    /// An arena index was out of bounds for the schedule it was used with.
    #[error("index {index} out of bounds for {what} (len {len})")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

fn format_issues(issues: &[FactIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, ScheduleError>;

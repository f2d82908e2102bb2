//! TimeWeave Core - domain model and constraint catalog for calendar solving
//!
//! This crate provides the fact model and scoring layer of TimeWeave:
//! - Timeslots, users, events and event parts for one host's window
//! - Fact intake validation and the indexed `Schedule` solution
//! - The three-tier score type and the standard constraint catalog

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;

pub use constraint::{ConstraintDef, ConstraintMatchTotal, ConstraintSet, ScoreTier};
pub use domain::{
    Deadline, Event, EventPart, Group, ImpactSlot, PreferredTimeRange, Schedule, ScheduleFacts,
    Timeslot, User, WorkTime,
};
pub use error::{FactIssue, Result, ScheduleError};
pub use score::{HardMediumSoftScore, ScoreParseError};

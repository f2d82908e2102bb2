//! Score types for schedule evaluation.

mod hard_medium_soft;

pub use hard_medium_soft::{HardMediumSoftScore, ScoreParseError};

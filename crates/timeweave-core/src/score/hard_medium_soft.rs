//! HardMediumSoftScore - Three-level score with hard, medium, and soft constraints

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A score with hard, medium, and soft constraint levels.
///
/// Hard constraints must be satisfied for feasibility.
/// Medium constraints have higher priority than soft constraints.
/// Soft constraints are the lowest priority optimization objectives.
///
/// Comparison order: hard > medium > soft
///
/// # Examples
///
/// ```
/// use timeweave_core::score::HardMediumSoftScore;
///
/// let score1 = HardMediumSoftScore::of(0, -10, -100);
/// let score2 = HardMediumSoftScore::of(0, -5, -200);
///
/// // Better medium score wins even with worse soft score
/// assert!(score2 > score1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HardMediumSoftScore {
    hard: i64,
    medium: i64,
    soft: i64,
}

impl HardMediumSoftScore {
    /// The zero score.
    pub const ZERO: HardMediumSoftScore = HardMediumSoftScore {
        hard: 0,
        medium: 0,
        soft: 0,
    };

    /// One hard constraint penalty.
    pub const ONE_HARD: HardMediumSoftScore = HardMediumSoftScore {
        hard: 1,
        medium: 0,
        soft: 0,
    };

    /// One medium constraint penalty.
    pub const ONE_MEDIUM: HardMediumSoftScore = HardMediumSoftScore {
        hard: 0,
        medium: 1,
        soft: 0,
    };

    /// One soft constraint penalty.
    pub const ONE_SOFT: HardMediumSoftScore = HardMediumSoftScore {
        hard: 0,
        medium: 0,
        soft: 1,
    };

    /// Creates a new HardMediumSoftScore.
    #[inline]
    pub const fn of(hard: i64, medium: i64, soft: i64) -> Self {
        HardMediumSoftScore { hard, medium, soft }
    }

    /// Creates a score with only a hard component.
    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardMediumSoftScore {
            hard,
            medium: 0,
            soft: 0,
        }
    }

    /// Creates a score with only a medium component.
    #[inline]
    pub const fn of_medium(medium: i64) -> Self {
        HardMediumSoftScore {
            hard: 0,
            medium,
            soft: 0,
        }
    }

    /// Creates a score with only a soft component.
    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardMediumSoftScore {
            hard: 0,
            medium: 0,
            soft,
        }
    }

    /// Returns the hard score component.
    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    /// Returns the medium score component.
    #[inline]
    pub const fn medium(&self) -> i64 {
        self.medium
    }

    /// Returns the soft score component.
    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }

    /// A solution is feasible when no hard constraint is violated.
    #[inline]
    pub const fn is_feasible(&self) -> bool {
        self.hard >= 0
    }
}

impl Ord for HardMediumSoftScore {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.hard.cmp(&other.hard) {
            Ordering::Equal => match self.medium.cmp(&other.medium) {
                Ordering::Equal => self.soft.cmp(&other.soft),
                other => other,
            },
            other => other,
        }
    }
}

impl PartialOrd for HardMediumSoftScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::ops::Add for HardMediumSoftScore {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        HardMediumSoftScore::of(
            self.hard + other.hard,
            self.medium + other.medium,
            self.soft + other.soft,
        )
    }
}

impl std::ops::AddAssign for HardMediumSoftScore {
    fn add_assign(&mut self, other: Self) {
        self.hard += other.hard;
        self.medium += other.medium;
        self.soft += other.soft;
    }
}

impl std::ops::Sub for HardMediumSoftScore {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        HardMediumSoftScore::of(
            self.hard - other.hard,
            self.medium - other.medium,
            self.soft - other.soft,
        )
    }
}

impl std::ops::Neg for HardMediumSoftScore {
    type Output = Self;

    fn neg(self) -> Self {
        HardMediumSoftScore::of(-self.hard, -self.medium, -self.soft)
    }
}

impl std::iter::Sum for HardMediumSoftScore {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(HardMediumSoftScore::ZERO, |acc, s| acc + s)
    }
}

impl fmt::Debug for HardMediumSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HardMediumSoftScore({}, {}, {})",
            self.hard, self.medium, self.soft
        )
    }
}

impl fmt::Display for HardMediumSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}hard/{}medium/{}soft",
            self.hard, self.medium, self.soft
        )
    }
}

/// Error returned when a score string cannot be parsed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ScoreParseError {
    pub message: String,
}

impl FromStr for HardMediumSoftScore {
    type Err = ScoreParseError;

    /// Parses the `Display` format, e.g. `"0hard/-3medium/-12soft"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 3 {
            return Err(ScoreParseError {
                message: format!(
                    "Invalid HardMediumSoftScore format '{}': expected 3 parts separated by '/'",
                    s
                ),
            });
        }

        let level = |part: &str, suffix: &str| -> Result<i64, ScoreParseError> {
            let part = part.trim();
            let num_str = part.strip_suffix(suffix).ok_or_else(|| ScoreParseError {
                message: format!("score part '{}' must end with '{}'", part, suffix),
            })?;
            num_str.parse::<i64>().map_err(|e| ScoreParseError {
                message: format!("Invalid {} score '{}': {}", suffix, num_str, e),
            })
        };

        Ok(HardMediumSoftScore::of(
            level(parts[0], "hard")?,
            level(parts[1], "medium")?,
            level(parts[2], "soft")?,
        ))
    }
}

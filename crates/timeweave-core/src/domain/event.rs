//! Events and their preferred-time facts.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A time-of-day window an event would like to start and end within.
///
/// A range without a day-of-week applies on every day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredTimeRange {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub day_of_week: Option<Weekday>,
}

impl PreferredTimeRange {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime, day_of_week: Option<Weekday>) -> Self {
        Self {
            start_time,
            end_time,
            day_of_week,
        }
    }

    /// Whether this range constrains placements on `day`.
    #[inline]
    pub fn applies_on(&self, day: Weekday) -> bool {
        self.day_of_week.is_none() || self.day_of_week == Some(day)
    }
}

/// A calendar item owned by one user, split into parts for placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub user_id: u64,
    /// Preferred start/end windows; empty means unconstrained.
    pub preferred_ranges: Vec<PreferredTimeRange>,
}

impl Event {
    pub fn new(id: u64, user_id: u64) -> Self {
        Self {
            id,
            user_id,
            preferred_ranges: Vec::new(),
        }
    }

    pub fn with_preferred_range(
        mut self,
        start_time: NaiveTime,
        end_time: NaiveTime,
        day_of_week: Option<Weekday>,
    ) -> Self {
        self.preferred_ranges
            .push(PreferredTimeRange::new(start_time, end_time, day_of_week));
        self
    }
}

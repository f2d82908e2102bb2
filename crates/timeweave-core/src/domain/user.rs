//! Users and their per-weekday working intervals.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A user's permitted working interval for one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTime {
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl WorkTime {
    pub fn new(day_of_week: Weekday, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            day_of_week,
            start_time,
            end_time,
        }
    }

    /// Length of the working interval in whole minutes.
    #[inline]
    pub fn span_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// A person whose events are being placed.
///
/// Scheduling preferences that scoring reads per user live here; anything
/// event-specific lives on the event or its parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    /// One interval per working weekday; days without an interval are
    /// non-working days.
    pub work_times: Vec<WorkTime>,
    /// Cap on scheduled load per day, as a percentage of the day's
    /// working interval.
    pub max_workload_percent: u8,
    /// Whether this user likes meetings packed directly after one another.
    pub back_to_back_preferred: bool,
    /// Lower bound of the wanted breaks per working day.
    pub min_breaks_per_day: u32,
    /// Cap on distinct meetings per day; `None` means uncapped.
    pub max_meetings_per_day: Option<u32>,
}

impl User {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            work_times: Vec::new(),
            max_workload_percent: 100,
            back_to_back_preferred: false,
            min_breaks_per_day: 0,
            max_meetings_per_day: None,
        }
    }

    pub fn with_work_time(
        mut self,
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        self.work_times
            .push(WorkTime::new(day_of_week, start_time, end_time));
        self
    }

    pub fn with_max_workload_percent(mut self, percent: u8) -> Self {
        self.max_workload_percent = percent;
        self
    }

    pub fn with_back_to_back_preferred(mut self, preferred: bool) -> Self {
        self.back_to_back_preferred = preferred;
        self
    }

    pub fn with_min_breaks_per_day(mut self, min: u32) -> Self {
        self.min_breaks_per_day = min;
        self
    }

    pub fn with_max_meetings_per_day(mut self, max: u32) -> Self {
        self.max_meetings_per_day = Some(max);
        self
    }

    /// The working interval for `day`, if the user works that day.
    pub fn work_time_for(&self, day: Weekday) -> Option<&WorkTime> {
        self.work_times.iter().find(|wt| wt.day_of_week == day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn work_time_lookup_by_weekday() {
        let user = User::new(1)
            .with_work_time(Weekday::Mon, time(9, 0), time(17, 0))
            .with_work_time(Weekday::Tue, time(10, 0), time(16, 0));

        let mon = user.work_time_for(Weekday::Mon).unwrap();
        assert_eq!(mon.span_minutes(), 480);
        assert!(user.work_time_for(Weekday::Sun).is_none());
    }
}

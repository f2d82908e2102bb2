//! Timeslot - a discrete bookable calendar interval.

use std::hash::{Hash, Hasher};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A discrete bookable interval in a host's calendar.
///
/// Two records describing the same interval are interchangeable: equality
/// and hashing read the (date, day-of-week, start, end) value tuple and
/// never the record id. Scoring compares assignments by this value
/// identity, so a schedule holding duplicate records for one interval
/// still detects collisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeslot {
    pub id: u64,
    pub host_id: u64,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub date: NaiveDate,
}

impl Timeslot {
    /// Creates a timeslot; the day-of-week is derived from `date`.
    pub fn new(
        id: u64,
        host_id: u64,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id,
            host_id,
            day_of_week: date.weekday(),
            start_time,
            end_time,
            date,
        }
    }

    /// The value tuple that defines this slot's identity.
    #[inline]
    pub fn value_key(&self) -> (NaiveDate, Weekday, NaiveTime, NaiveTime) {
        (self.date, self.day_of_week, self.start_time, self.end_time)
    }

    #[inline]
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    #[inline]
    pub fn end_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    /// Slot width in whole minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

impl PartialEq for Timeslot {
    fn eq(&self, other: &Self) -> bool {
        self.value_key() == other.value_key()
    }
}

impl Eq for Timeslot {}

impl Hash for Timeslot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn equality_ignores_record_id() {
        let a = Timeslot::new(1, 7, date(2025, 3, 10), time(9, 0), time(9, 30));
        let b = Timeslot::new(999, 7, date(2025, 3, 10), time(9, 0), time(9, 30));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn different_intervals_are_distinct() {
        let a = Timeslot::new(1, 7, date(2025, 3, 10), time(9, 0), time(9, 30));
        let b = Timeslot::new(1, 7, date(2025, 3, 10), time(9, 30), time(10, 0));
        let c = Timeslot::new(1, 7, date(2025, 3, 17), time(9, 0), time(9, 30));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn day_of_week_follows_date() {
        let slot = Timeslot::new(1, 7, date(2025, 3, 10), time(9, 0), time(10, 0));
        assert_eq!(slot.day_of_week, Weekday::Mon);
        assert_eq!(slot.duration_minutes(), 60);
    }
}

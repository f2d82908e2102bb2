//! EventPart - the planning entity placed into timeslots.

use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A deadline as delivered by a fact feed.
///
/// Feeds carry deadlines as free text; a present but unparseable value is
/// kept as `Invalid` and scores as missed instead of failing intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Deadline {
    #[default]
    None,
    At(NaiveDateTime),
    Invalid,
}

impl Deadline {
    const FORMATS: [&'static str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

    /// Parses an optional raw deadline string.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Deadline::None;
        };
        let raw = raw.trim();
        for format in Self::FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Deadline::At(dt);
            }
        }
        warn!(event = "invalid_deadline", raw, "deadline string not parseable, will score as missed");
        Deadline::Invalid
    }

    /// Whether an assignment ending at `end` misses this deadline.
    /// `Invalid` always counts as missed.
    #[inline]
    pub fn missed_by(&self, end: NaiveDateTime) -> bool {
        match self {
            Deadline::None => false,
            Deadline::At(dt) => end > *dt,
            Deadline::Invalid => true,
        }
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        !matches!(self, Deadline::None)
    }
}

/// A weekday/time marker that rewards or penalizes landing a part on it.
///
/// Set fields must all match the assigned slot; a marker with neither
/// field set never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactSlot {
    pub day_of_week: Option<Weekday>,
    pub time: Option<NaiveTime>,
    /// Weight contributed per hit, always positive; the sign comes from
    /// whether the marker is a positive or a negative impact.
    pub score: i64,
}

impl ImpactSlot {
    pub fn new(day_of_week: Option<Weekday>, time: Option<NaiveTime>, score: i64) -> Self {
        Self {
            day_of_week,
            time,
            score,
        }
    }

    /// Whether a slot on `day` starting at `start` hits this marker.
    pub fn matches(&self, day: Weekday, start: NaiveTime) -> bool {
        if self.day_of_week.is_none() && self.time.is_none() {
            return false;
        }
        self.day_of_week.map_or(true, |d| d == day) && self.time.map_or(true, |t| t == start)
    }
}

/// One fixed-width part of a split event; the planning entity.
///
/// An event requested for n slots becomes parts `1..=n` sharing a
/// `group_id`. Facts besides `timeslot` are immutable during solving;
/// `timeslot` is the planning variable, an index into the schedule's
/// timeslot arena, `None` until assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPart {
    pub id: u64,
    pub group_id: u64,
    /// 1-based position within the group.
    pub part: u32,
    pub last_part: u32,
    pub event_id: u64,
    pub user_id: u64,
    /// Originally requested interval of this part.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub hard_deadline: Deadline,
    pub soft_deadline: Deadline,
    /// Larger is more urgent.
    pub priority: u8,
    pub modifiable: bool,
    pub is_meeting: bool,
    /// Links the synchronized copies of one meeting across its
    /// participants' calendars.
    pub meeting_id: Option<u64>,
    pub meeting_part: Option<u32>,
    pub is_external_meeting: bool,
    pub is_meeting_modifiable: bool,
    pub is_external_meeting_modifiable: bool,
    pub positive_impact: Option<ImpactSlot>,
    pub negative_impact: Option<ImpactSlot>,
    /// Deliberate break.
    pub gap: bool,
    pub daily_task_list: bool,
    pub weekly_task_list: bool,
    pub preferred_day_of_week: Option<Weekday>,
    pub preferred_start_time: Option<NaiveTime>,
    pub preferred_start_time_range: Option<NaiveTime>,
    pub preferred_end_time_range: Option<NaiveTime>,
    pub total_working_hours: u32,
    /// Planning variable: index into the schedule's timeslot arena.
    pub timeslot: Option<usize>,
}

impl EventPart {
    /// Default priority for parts whose feed does not set one.
    pub const DEFAULT_PRIORITY: u8 = 50;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        group_id: u64,
        part: u32,
        last_part: u32,
        event_id: u64,
        user_id: u64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            group_id,
            part,
            last_part,
            event_id,
            user_id,
            start,
            end,
            hard_deadline: Deadline::None,
            soft_deadline: Deadline::None,
            priority: Self::DEFAULT_PRIORITY,
            modifiable: true,
            is_meeting: false,
            meeting_id: None,
            meeting_part: None,
            is_external_meeting: false,
            is_meeting_modifiable: true,
            is_external_meeting_modifiable: true,
            positive_impact: None,
            negative_impact: None,
            gap: false,
            daily_task_list: false,
            weekly_task_list: false,
            preferred_day_of_week: None,
            preferred_start_time: None,
            preferred_start_time_range: None,
            preferred_end_time_range: None,
            total_working_hours: 0,
            timeslot: None,
        }
    }

    pub fn with_hard_deadline(mut self, deadline: Deadline) -> Self {
        self.hard_deadline = deadline;
        self
    }

    pub fn with_soft_deadline(mut self, deadline: Deadline) -> Self {
        self.soft_deadline = deadline;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_modifiable(mut self, modifiable: bool) -> Self {
        self.modifiable = modifiable;
        self
    }

    pub fn as_meeting(mut self, meeting_id: u64, meeting_part: u32) -> Self {
        self.is_meeting = true;
        self.meeting_id = Some(meeting_id);
        self.meeting_part = Some(meeting_part);
        self
    }

    pub fn with_meeting_modifiable(mut self, modifiable: bool) -> Self {
        self.is_meeting_modifiable = modifiable;
        self
    }

    pub fn as_external_meeting(mut self, modifiable: bool) -> Self {
        self.is_external_meeting = true;
        self.is_external_meeting_modifiable = modifiable;
        self
    }

    pub fn with_positive_impact(mut self, impact: ImpactSlot) -> Self {
        self.positive_impact = Some(impact);
        self
    }

    pub fn with_negative_impact(mut self, impact: ImpactSlot) -> Self {
        self.negative_impact = Some(impact);
        self
    }

    pub fn as_gap(mut self) -> Self {
        self.gap = true;
        self
    }

    pub fn with_daily_task_list(mut self, flag: bool) -> Self {
        self.daily_task_list = flag;
        self
    }

    pub fn with_weekly_task_list(mut self, flag: bool) -> Self {
        self.weekly_task_list = flag;
        self
    }

    pub fn with_preferred_day_of_week(mut self, day: Weekday) -> Self {
        self.preferred_day_of_week = Some(day);
        self
    }

    pub fn with_preferred_start_time(mut self, time: NaiveTime) -> Self {
        self.preferred_start_time = Some(time);
        self
    }

    pub fn with_preferred_start_time_range(mut self, earliest: NaiveTime) -> Self {
        self.preferred_start_time_range = Some(earliest);
        self
    }

    pub fn with_preferred_end_time_range(mut self, latest: NaiveTime) -> Self {
        self.preferred_end_time_range = Some(latest);
        self
    }

    /// Requested single-part width in whole minutes.
    #[inline]
    pub fn requested_duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether this part came from a daily or weekly task list.
    #[inline]
    pub fn is_task_list(&self) -> bool {
        self.daily_task_list || self.weekly_task_list
    }

    #[inline]
    pub fn is_first(&self) -> bool {
        self.part == 1
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.part == self.last_part
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn deadline_parse_handles_good_bad_and_missing() {
        assert_eq!(Deadline::parse(None), Deadline::None);
        assert_eq!(
            Deadline::parse(Some("2025-03-10T17:00:00")),
            Deadline::At(datetime(2025, 3, 10, 17, 0))
        );
        assert_eq!(
            Deadline::parse(Some("2025-03-10 17:00")),
            Deadline::At(datetime(2025, 3, 10, 17, 0))
        );
        assert_eq!(Deadline::parse(Some("next tuesday-ish")), Deadline::Invalid);
    }

    #[test]
    fn invalid_deadline_always_counts_as_missed() {
        let end = datetime(2025, 3, 10, 10, 0);
        assert!(!Deadline::None.missed_by(end));
        assert!(!Deadline::At(datetime(2025, 3, 10, 10, 0)).missed_by(end));
        assert!(Deadline::At(datetime(2025, 3, 10, 9, 59)).missed_by(end));
        assert!(Deadline::Invalid.missed_by(end));
    }

    #[test]
    fn impact_marker_needs_at_least_one_field() {
        let empty = ImpactSlot::new(None, None, 5);
        assert!(!empty.matches(Weekday::Mon, NaiveTime::from_hms_opt(9, 0, 0).unwrap()));

        let day_only = ImpactSlot::new(Some(Weekday::Mon), None, 5);
        assert!(day_only.matches(Weekday::Mon, NaiveTime::from_hms_opt(14, 0, 0).unwrap()));
        assert!(!day_only.matches(Weekday::Tue, NaiveTime::from_hms_opt(14, 0, 0).unwrap()));

        let both = ImpactSlot::new(
            Some(Weekday::Mon),
            NaiveTime::from_hms_opt(9, 0, 0),
            5,
        );
        assert!(both.matches(Weekday::Mon, NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(!both.matches(Weekday::Mon, NaiveTime::from_hms_opt(9, 30, 0).unwrap()));
    }

    #[test]
    fn part_position_helpers() {
        let part = EventPart::new(
            1,
            10,
            2,
            3,
            100,
            1,
            datetime(2025, 3, 10, 9, 30),
            datetime(2025, 3, 10, 10, 0),
        );
        assert!(!part.is_first());
        assert!(!part.is_last());
        assert_eq!(part.requested_duration_minutes(), 30);
        assert_eq!(part.priority, EventPart::DEFAULT_PRIORITY);
    }
}

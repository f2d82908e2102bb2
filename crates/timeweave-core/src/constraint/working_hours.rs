//! Working-hours rules: parts must sit inside the owner's working
//! interval and groups must fit the day they start on.

use crate::constraint::minutes_from_midnight;
use crate::domain::Schedule;

/// A part whose slot starts before or ends after the user's working
/// interval for that day. An unassigned part or a day without a working
/// interval counts as violating; this is the rule that drives every part
/// toward a real, workable slot.
pub fn outside_working_hours(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for idx in 0..schedule.part_count() {
        let Some(slot) = schedule.slot_of(idx) else {
            matches -= 1;
            continue;
        };
        match schedule.user_of(idx).work_time_for(slot.day_of_week) {
            Some(wt) if slot.start_time >= wt.start_time && slot.end_time <= wt.end_time => {}
            _ => matches -= 1,
        }
    }
    matches
}

/// A group whose total requested width does not fit between its first
/// part's slot start and the end of the user's working interval.
pub fn group_exceeds_workday(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for group in schedule.groups() {
        let first = group.parts[0];
        let Some(slot) = schedule.slot_of(first) else {
            matches -= 1;
            continue;
        };
        let Some(wt) = schedule.user_of(first).work_time_for(slot.day_of_week) else {
            matches -= 1;
            continue;
        };
        let finish = minutes_from_midnight(slot.start_time)
            + schedule.group_total_duration_minutes(group);
        if finish > minutes_from_midnight(wt.end_time) {
            matches -= 1;
        }
    }
    matches
}

/// A part other than the first of its group sitting exactly at the start
/// of the user's working day. Day starts are reserved for group openers.
pub fn nonfirst_part_at_day_start(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if part.is_first() {
            continue;
        }
        let Some(slot) = schedule.slot_of(idx) else {
            continue;
        };
        if let Some(wt) = schedule.user_of(idx).work_time_for(slot.day_of_week) {
            if slot.start_time == wt.start_time {
                matches -= 1;
            }
        }
    }
    matches
}

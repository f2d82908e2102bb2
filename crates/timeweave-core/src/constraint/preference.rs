//! Preference rules: event-level preferred windows, part-level preferred
//! placements and impact markers.

use crate::constraint::{minutes_from_midnight, slot_within_work_time};
use crate::domain::Schedule;

/// Outcome of checking one part against its event's preferred windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeCheck {
    /// The event has no preferred windows; the rule does not apply.
    Inactive,
    /// The rule applies but the part has no slot yet.
    Unassigned,
    Violated,
    Satisfied,
}

/// The start rule: the opening part's slot must start at or after the
/// start of at least one window matching the slot's weekday.
fn check_start_range(schedule: &Schedule, idx: usize) -> RangeCheck {
    let ranges = &schedule.event_of(idx).preferred_ranges;
    if ranges.is_empty() {
        return RangeCheck::Inactive;
    }
    let Some(slot) = schedule.slot_of(idx) else {
        return RangeCheck::Unassigned;
    };
    let ok = ranges
        .iter()
        .any(|r| r.applies_on(slot.day_of_week) && slot.start_time >= r.start_time);
    if ok {
        RangeCheck::Satisfied
    } else {
        RangeCheck::Violated
    }
}

/// The end rule: the closing part's slot must end at or before the end
/// of at least one window matching the slot's weekday.
fn check_end_range(schedule: &Schedule, idx: usize) -> RangeCheck {
    let ranges = &schedule.event_of(idx).preferred_ranges;
    if ranges.is_empty() {
        return RangeCheck::Inactive;
    }
    let Some(slot) = schedule.slot_of(idx) else {
        return RangeCheck::Unassigned;
    };
    let ok = ranges
        .iter()
        .any(|r| r.applies_on(slot.day_of_week) && slot.end_time <= r.end_time);
    if ok {
        RangeCheck::Satisfied
    } else {
        RangeCheck::Violated
    }
}

pub fn preferred_range_start_hard(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() {
            continue;
        }
        match check_start_range(schedule, idx) {
            RangeCheck::Violated | RangeCheck::Unassigned => matches -= 1,
            _ => {}
        }
    }
    matches
}

pub fn preferred_range_end_hard(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_last() {
            continue;
        }
        match check_end_range(schedule, idx) {
            RangeCheck::Violated | RangeCheck::Unassigned => matches -= 1,
            _ => {}
        }
    }
    matches
}

pub fn preferred_range_start_soft(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if part.is_first() && check_start_range(schedule, idx) == RangeCheck::Violated {
            matches -= 1;
        }
    }
    matches
}

pub fn preferred_range_end_soft(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if part.is_last() && check_end_range(schedule, idx) == RangeCheck::Violated {
            matches -= 1;
        }
    }
    matches
}

/// An opening part with an explicit preferred weekday or start time that
/// landed somewhere else. Each part counts once however many of its set
/// fields mismatch.
pub fn preferred_day_time_miss(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() {
            continue;
        }
        if part.preferred_day_of_week.is_none() && part.preferred_start_time.is_none() {
            continue;
        }
        let Some(slot) = schedule.slot_of(idx) else {
            continue;
        };
        let day_ok = part
            .preferred_day_of_week
            .map_or(true, |d| d == slot.day_of_week);
        let time_ok = part
            .preferred_start_time
            .map_or(true, |t| t == slot.start_time);
        if !(day_ok && time_ok) {
            matches -= 1;
        }
    }
    matches
}

/// Earliest-start / latest-finish bounds on the whole group. The finish
/// bound reads the group's total requested width from the opening slot
/// and also respects the working-day end. One count per unmet bound.
pub fn preferred_schedule_range_miss(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() {
            continue;
        }
        if part.preferred_start_time_range.is_none() && part.preferred_end_time_range.is_none() {
            continue;
        }
        let Some(slot) = schedule.slot_of(idx) else {
            continue;
        };
        if let Some(earliest) = part.preferred_start_time_range {
            if slot.start_time < earliest {
                matches -= 1;
            }
        }
        if let Some(latest) = part.preferred_end_time_range {
            let group = schedule.group_of(idx);
            let finish = minutes_from_midnight(slot.start_time)
                + schedule.group_total_duration_minutes(group);
            let mut bound = minutes_from_midnight(latest);
            if let Some(wt) = schedule.work_time_of(idx) {
                bound = bound.min(minutes_from_midnight(wt.end_time));
            }
            if finish > bound {
                matches -= 1;
            }
        }
    }
    matches
}

/// Landing an opening part on its positive marker rewards the marker's
/// weight, provided the slot fits the working day.
pub fn positive_impact_hit(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() {
            continue;
        }
        let Some(impact) = part.positive_impact else {
            continue;
        };
        let Some(slot) = schedule.slot_of(idx) else {
            continue;
        };
        if impact.matches(slot.day_of_week, slot.start_time) && slot_within_work_time(schedule, idx)
        {
            matches += impact.score;
        }
    }
    matches
}

/// Landing an opening part on its negative marker costs the marker's
/// weight.
pub fn negative_impact_hit(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() {
            continue;
        }
        let Some(impact) = part.negative_impact else {
            continue;
        };
        let Some(slot) = schedule.slot_of(idx) else {
            continue;
        };
        if impact.matches(slot.day_of_week, slot.start_time) && slot_within_work_time(schedule, idx)
        {
            matches -= impact.score;
        }
    }
    matches
}

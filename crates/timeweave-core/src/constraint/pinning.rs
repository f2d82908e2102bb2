//! Drift rules: parts that were pinned, synchronized externally or
//! simply requested for a concrete moment should stay where they were
//! asked for.

use crate::domain::Schedule;

/// Whether the opening part's slot differs from its requested date or
/// start time. `None` when the part is unassigned.
fn drifted(schedule: &Schedule, idx: usize) -> Option<bool> {
    let part = &schedule.parts[idx];
    let slot = schedule.slot_of(idx)?;
    Some(slot.date != part.start.date() || slot.start_time != part.start.time())
}

/// A non-modifiable event whose opening part moved away from the
/// requested moment. Unassigned counts: a pinned event that is not
/// placed is as wrong as one placed elsewhere.
pub fn immutable_drift(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() || part.modifiable {
            continue;
        }
        match drifted(schedule, idx) {
            Some(false) => {}
            _ => matches -= 1,
        }
    }
    matches
}

/// Drift of a meeting synchronized with an external calendar that is not
/// marked movable there.
pub fn external_meeting_drift(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() || !part.is_external_meeting || part.is_external_meeting_modifiable {
            continue;
        }
        if drifted(schedule, idx) == Some(true) {
            matches -= 1;
        }
    }
    matches
}

/// Drift of a meeting whose organizer did not allow rescheduling.
pub fn meeting_drift(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() || !part.is_meeting || part.is_meeting_modifiable {
            continue;
        }
        if drifted(schedule, idx) == Some(true) {
            matches -= 1;
        }
    }
    matches
}

/// A one-off part (not recurrence-derived) with no placement preferences
/// at all that still ended up on another date than requested.
pub fn requested_date_drift(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() || part.is_task_list() {
            continue;
        }
        let has_preferences = part.preferred_day_of_week.is_some()
            || part.preferred_start_time.is_some()
            || part.preferred_start_time_range.is_some()
            || part.preferred_end_time_range.is_some()
            || !schedule.event_of(idx).preferred_ranges.is_empty();
        if has_preferences {
            continue;
        }
        if let Some(date) = schedule.assigned_date(idx) {
            if date != part.start.date() {
                matches -= 1;
            }
        }
    }
    matches
}

/// A non-task, non-break part starting at another time of day than
/// requested.
pub fn requested_start_drift(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_first() || part.is_task_list() || part.gap {
            continue;
        }
        if let Some(slot) = schedule.slot_of(idx) {
            if slot.start_time != part.start.time() {
                matches -= 1;
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::fixtures::*;

    #[test]
    fn pinned_event_must_sit_at_requested_moment() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts
            .parts
            .push(part(10, 500, 1, 1, 100, 1, monday, 10, 0).with_modifiable(false));
        let mut sched = schedule(facts);

        // Unassigned pinned part counts.
        assert_eq!(immutable_drift(&sched), -1);

        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        assert_eq!(immutable_drift(&sched), 0);

        sched.set_timeslot(0, Some(grid_slot(10, 30))).unwrap();
        assert_eq!(immutable_drift(&sched), -1);
    }

    #[test]
    fn modifiable_event_may_drift_freely() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts.parts.push(part(10, 500, 1, 1, 100, 1, monday, 10, 0));
        let mut sched = schedule(facts);
        sched.set_timeslot(0, Some(grid_slot(15, 0))).unwrap();
        assert_eq!(immutable_drift(&sched), 0);
    }

    #[test]
    fn locked_meeting_drift_is_medium_scoped() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        let p = part(10, 500, 1, 1, 100, 1, monday, 10, 0)
            .as_meeting(900, 1)
            .with_meeting_modifiable(false);
        facts.parts.push(p);
        let mut sched = schedule(facts);

        // Unassigned is the hard tier's business, not this rule's.
        assert_eq!(meeting_drift(&sched), 0);

        sched.set_timeslot(0, Some(grid_slot(11, 0))).unwrap();
        assert_eq!(meeting_drift(&sched), -1);

        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        assert_eq!(meeting_drift(&sched), 0);
    }

    #[test]
    fn external_meeting_drift_needs_the_external_flag() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        let locked_external = part(10, 500, 1, 1, 100, 1, monday, 10, 0)
            .as_meeting(900, 1)
            .as_external_meeting(false);
        let movable_external = part(11, 501, 1, 1, 100, 1, monday, 11, 0)
            .as_meeting(901, 1)
            .as_external_meeting(true);
        facts.parts.push(locked_external);
        facts.parts.push(movable_external);
        let mut sched = schedule(facts);

        sched.set_timeslot(0, Some(grid_slot(14, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(14, 30))).unwrap();
        assert_eq!(external_meeting_drift(&sched), -1);
    }

    #[test]
    fn date_drift_only_without_preferences() {
        let monday = date(2025, 3, 10);
        let tuesday = date(2025, 3, 11);
        let mut facts = single_user_day();
        facts.timeslots.extend(slot_grid(100, tuesday, 9, 17));
        // Requested for Tuesday, no preferences set.
        facts.parts.push(part(10, 500, 1, 1, 100, 1, tuesday, 10, 0));
        let mut sched = schedule(facts);

        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        assert_eq!(requested_date_drift(&sched), -1);
    }

    #[test]
    fn preference_fields_disable_date_drift() {
        let tuesday = date(2025, 3, 11);
        let mut facts = single_user_day();
        facts.parts.push(
            part(10, 500, 1, 1, 100, 1, tuesday, 10, 0).with_preferred_start_time(time(10, 0)),
        );
        let mut sched = schedule(facts);

        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        assert_eq!(requested_date_drift(&sched), 0);
    }

    #[test]
    fn start_drift_skips_tasks_and_breaks() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts.parts.push(part(10, 500, 1, 1, 100, 1, monday, 10, 0));
        facts
            .parts
            .push(part(11, 501, 1, 1, 100, 1, monday, 10, 0).as_gap());
        facts
            .parts
            .push(part(12, 502, 1, 1, 100, 1, monday, 10, 0).with_daily_task_list(true));
        let mut sched = schedule(facts);

        sched.set_timeslot(0, Some(grid_slot(12, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(12, 30))).unwrap();
        sched.set_timeslot(2, Some(grid_slot(13, 0))).unwrap();

        // Only the plain part counts its moved start.
        assert_eq!(requested_start_drift(&sched), -1);
    }
}

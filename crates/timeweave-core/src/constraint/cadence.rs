//! Cadence rules: ordering by urgency, meeting spacing, break placement
//! and per-day load caps.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::constraint::minutes_between;
use crate::domain::Schedule;

/// Gap under which back-to-back lovers consider two meetings packed.
const BACK_TO_BACK_WINDOW_MINUTES: i64 = 15;
/// Gap under which everyone else considers two meetings crowded.
const MEETING_SPACING_MINUTES: i64 = 30;
/// Clearance a break wants from the nearest other booking's start.
const BREAK_CLEARANCE_MINUTES: i64 = 30;
/// Breaks above the wanted minimum that are still acceptable.
const BREAK_QUOTA_SLACK: u32 = 2;

/// A strictly more urgent part of the same user starting later than a
/// less urgent one. One count per inverted pair.
pub fn priority_order_inversion(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for user in 0..schedule.users.len() {
        let parts = schedule.parts_of_user(user);
        for (i, &a) in parts.iter().enumerate() {
            for &b in parts.iter().skip(i + 1) {
                let pa = schedule.parts[a].priority;
                let pb = schedule.parts[b].priority;
                if pa == pb {
                    continue;
                }
                let (Some(start_a), Some(start_b)) =
                    (schedule.assigned_start(a), schedule.assigned_start(b))
                else {
                    continue;
                };
                let inverted = if pa > pb {
                    start_a > start_b
                } else {
                    start_b > start_a
                };
                if inverted {
                    matches -= 1;
                }
            }
        }
    }
    matches
}

/// Spacing between a user's meetings on one date, judged by the user's
/// taste: packed pairs reward back-to-back lovers, crowded pairs cost
/// everyone else.
pub fn back_to_back_meetings(schedule: &Schedule) -> i64 {
    // Fully anchored meeting groups as (user, first start, last end).
    let mut spans: Vec<(usize, NaiveDateTime, NaiveDateTime)> = Vec::new();
    for group in schedule.groups() {
        if !group.is_meeting {
            continue;
        }
        let Some(&first) = group.parts.first() else {
            continue;
        };
        let Some(&last) = group.parts.last() else {
            continue;
        };
        let (Some(start), Some(end)) =
            (schedule.assigned_start(first), schedule.assigned_end(last))
        else {
            continue;
        };
        spans.push((group.user, start, end));
    }

    let mut matches = 0;
    for i in 0..spans.len() {
        for j in (i + 1)..spans.len() {
            let (user, start_a, end_a) = spans[i];
            let (user_b, start_b, end_b) = spans[j];
            if user != user_b || start_a.date() != start_b.date() {
                continue;
            }
            let gap = if end_a <= start_b {
                minutes_between(end_a, start_b)
            } else if end_b <= start_a {
                minutes_between(end_b, start_a)
            } else {
                // Overlap is the conflict rules' match, not a spacing one.
                continue;
            };
            if schedule.users[user].back_to_back_preferred {
                if gap < BACK_TO_BACK_WINDOW_MINUTES {
                    matches += 1;
                }
            } else if gap < MEETING_SPACING_MINUTES {
                matches -= 1;
            }
        }
    }
    matches
}

/// A break part ending within half an hour (either side) of another
/// group's opening slot start, same user and date.
pub fn break_adjacency(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.gap {
            continue;
        }
        let Some(break_end) = schedule.assigned_end(idx) else {
            continue;
        };
        let user = schedule.user_index_of(idx);
        let break_group = schedule.group_of(idx).group_id;
        for group in schedule.groups() {
            if group.group_id == break_group || group.user != user {
                continue;
            }
            let Some(&first) = group.parts.first() else {
                continue;
            };
            let Some(start) = schedule.assigned_start(first) else {
                continue;
            };
            if start.date() != break_end.date() {
                continue;
            }
            if minutes_between(break_end, start).abs() < BREAK_CLEARANCE_MINUTES {
                matches -= 1;
            }
        }
    }
    matches
}

/// More distinct meetings on one (user, date) than the user's cap allows.
pub fn meetings_per_day_exceeded(schedule: &Schedule) -> i64 {
    let mut buckets: HashMap<(usize, NaiveDate), HashSet<u64>> = HashMap::new();
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.is_meeting {
            continue;
        }
        let Some(date) = schedule.assigned_date(idx) else {
            continue;
        };
        buckets
            .entry((schedule.user_index_of(idx), date))
            .or_default()
            .insert(part.group_id);
    }

    let mut matches = 0;
    for ((user, _), meetings) in &buckets {
        if let Some(max) = schedule.users[*user].max_meetings_per_day {
            if meetings.len() as u32 > max {
                matches -= 1;
            }
        }
    }
    matches
}

/// Requested minutes booked on one (user, date) past the user's share of
/// that day's working interval. A day with bookings but no interval
/// always counts.
pub fn workload_exceeded(schedule: &Schedule) -> i64 {
    let mut booked: HashMap<(usize, NaiveDate), i64> = HashMap::new();
    for (idx, part) in schedule.parts.iter().enumerate() {
        let Some(date) = schedule.assigned_date(idx) else {
            continue;
        };
        *booked
            .entry((schedule.user_index_of(idx), date))
            .or_insert(0) += part.requested_duration_minutes();
    }

    let mut matches = 0;
    for ((user_idx, date), minutes) in &booked {
        let user = &schedule.users[*user_idx];
        match user.work_time_for(date.weekday()) {
            Some(wt) => {
                let budget = wt.span_minutes() * i64::from(user.max_workload_percent) / 100;
                if *minutes > budget {
                    matches -= 1;
                }
            }
            None => matches -= 1,
        }
    }
    matches
}

/// Distinct break groups on an active (user, date) outside the band the
/// user wants: fewer than the minimum, or more than minimum plus slack.
pub fn break_quota_out_of_range(schedule: &Schedule) -> i64 {
    let mut buckets: HashMap<(usize, NaiveDate), HashSet<u64>> = HashMap::new();
    for (idx, part) in schedule.parts.iter().enumerate() {
        let Some(date) = schedule.assigned_date(idx) else {
            continue;
        };
        let breaks = buckets
            .entry((schedule.user_index_of(idx), date))
            .or_default();
        if part.gap {
            breaks.insert(part.group_id);
        }
    }

    let mut matches = 0;
    for ((user_idx, _), breaks) in &buckets {
        let min = schedule.users[*user_idx].min_breaks_per_day;
        let count = breaks.len() as u32;
        if count < min || count > min + BREAK_QUOTA_SLACK {
            matches -= 1;
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::fixtures::*;
    use crate::domain::Timeslot;
    use chrono::Weekday;

    #[test]
    fn urgent_work_should_start_first() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts
            .parts
            .push(part(10, 500, 1, 1, 100, 1, monday, 9, 0).with_priority(80));
        facts.parts.push(part(11, 501, 1, 1, 100, 1, monday, 9, 30));
        let mut sched = schedule(facts);

        // The urgent part starts after the routine one.
        sched.set_timeslot(0, Some(grid_slot(14, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(9, 0))).unwrap();
        assert_eq!(priority_order_inversion(&sched), -1);

        sched.set_timeslot(0, Some(grid_slot(9, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(14, 0))).unwrap();
        assert_eq!(priority_order_inversion(&sched), 0);
    }

    #[test]
    fn equal_priority_pairs_never_invert() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts.parts.push(part(10, 500, 1, 1, 100, 1, monday, 9, 0));
        facts.parts.push(part(11, 501, 1, 1, 100, 1, monday, 9, 30));
        let mut sched = schedule(facts);
        sched.set_timeslot(0, Some(grid_slot(14, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(9, 0))).unwrap();
        assert_eq!(priority_order_inversion(&sched), 0);

        // An unassigned side never forms a pair either.
        sched.set_timeslot(1, None).unwrap();
        assert_eq!(priority_order_inversion(&sched), 0);
    }

    #[test]
    fn crowded_meetings_cost_spacing_lovers() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts
            .parts
            .push(part(10, 500, 1, 1, 100, 1, monday, 10, 0).as_meeting(900, 1));
        facts
            .parts
            .push(part(11, 501, 1, 1, 100, 1, monday, 11, 0).as_meeting(901, 1));
        let mut sched = schedule(facts);

        // Adjacent meetings: zero gap.
        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(10, 30))).unwrap();
        assert_eq!(back_to_back_meetings(&sched), -1);

        // A half hour between them satisfies the spacing wish exactly.
        sched.set_timeslot(1, Some(grid_slot(11, 30))).unwrap();
        assert_eq!(back_to_back_meetings(&sched), 0);
    }

    #[test]
    fn packed_meetings_reward_back_to_back_lovers() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts.users[0] = office_user(1, &[Weekday::Mon]).with_back_to_back_preferred(true);
        facts
            .parts
            .push(part(10, 500, 1, 1, 100, 1, monday, 10, 0).as_meeting(900, 1));
        facts
            .parts
            .push(part(11, 501, 1, 1, 100, 1, monday, 11, 0).as_meeting(901, 1));
        let mut sched = schedule(facts);

        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(10, 30))).unwrap();
        assert_eq!(back_to_back_meetings(&sched), 1);

        // A half-hour gap is no longer packed, but costs nothing either.
        sched.set_timeslot(1, Some(grid_slot(11, 30))).unwrap();
        assert_eq!(back_to_back_meetings(&sched), 0);
    }

    #[test]
    fn breaks_want_clearance_from_other_bookings() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts
            .timeslots
            .push(Timeslot::new(999, HOST, monday, time(12, 15), time(12, 45)));
        facts
            .parts
            .push(part(10, 500, 1, 1, 100, 1, monday, 12, 0).as_gap());
        facts.parts.push(part(11, 501, 1, 1, 100, 1, monday, 12, 30));
        let mut sched = schedule(facts);
        let off_grid = sched.timeslot_count() - 1;

        // Booking starts the moment the break ends.
        sched.set_timeslot(0, Some(grid_slot(12, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(12, 30))).unwrap();
        assert_eq!(break_adjacency(&sched), -1);

        // Booking starts shortly before the break ends; the absolute
        // distance still counts.
        sched.set_timeslot(1, Some(off_grid)).unwrap();
        assert_eq!(break_adjacency(&sched), -1);

        // A full half hour of clearance is enough.
        sched.set_timeslot(1, Some(grid_slot(13, 0))).unwrap();
        assert_eq!(break_adjacency(&sched), 0);
    }

    #[test]
    fn meeting_cap_counts_distinct_meetings() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts.users[0] = office_user(1, &[Weekday::Mon]).with_max_meetings_per_day(1);
        facts
            .parts
            .push(part(10, 500, 1, 1, 100, 1, monday, 10, 0).as_meeting(900, 1));
        facts
            .parts
            .push(part(11, 501, 1, 1, 100, 1, monday, 11, 0).as_meeting(901, 1));
        let mut sched = schedule(facts);

        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        assert_eq!(meetings_per_day_exceeded(&sched), 0);

        sched.set_timeslot(1, Some(grid_slot(11, 0))).unwrap();
        assert_eq!(meetings_per_day_exceeded(&sched), -1);
    }

    #[test]
    fn one_meeting_in_many_parts_counts_once() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts.users[0] = office_user(1, &[Weekday::Mon]).with_max_meetings_per_day(1);
        facts
            .parts
            .push(part(10, 500, 1, 2, 100, 1, monday, 10, 0).as_meeting(900, 1));
        facts
            .parts
            .push(part(11, 500, 2, 2, 100, 1, monday, 10, 30).as_meeting(900, 2));
        let mut sched = schedule(facts);
        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(10, 30))).unwrap();
        assert_eq!(meetings_per_day_exceeded(&sched), 0);
    }

    #[test]
    fn daily_workload_cap_uses_requested_minutes() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        // 25% of the 480-minute working day: 120 minutes allowed.
        facts.users[0] = office_user(1, &[Weekday::Mon]).with_max_workload_percent(25);
        for n in 1u32..=5 {
            let h = 9 + (n - 1) / 2;
            let min = ((n - 1) % 2) * 30;
            facts
                .parts
                .push(part(9 + u64::from(n), 500, n, 5, 100, 1, monday, h, min));
        }
        let mut sched = schedule(facts);
        for i in 0..5 {
            sched.set_timeslot(i, Some(i)).unwrap();
        }
        // Five half-hour parts book 150 minutes.
        assert_eq!(workload_exceeded(&sched), -1);

        // Dropping one lands exactly on the budget.
        sched.set_timeslot(4, None).unwrap();
        assert_eq!(workload_exceeded(&sched), 0);
    }

    #[test]
    fn bookings_on_a_nonworking_day_always_exceed() {
        let monday = date(2025, 3, 10);
        let tuesday = date(2025, 3, 11);
        let mut facts = single_user_day();
        facts
            .timeslots
            .push(Timeslot::new(999, HOST, tuesday, time(9, 0), time(9, 30)));
        facts.parts.push(part(10, 500, 1, 1, 100, 1, monday, 9, 0));
        let mut sched = schedule(facts);
        let tuesday_slot = sched.timeslot_count() - 1;
        sched.set_timeslot(0, Some(tuesday_slot)).unwrap();
        assert_eq!(workload_exceeded(&sched), -1);
    }

    #[test]
    fn break_quota_needs_the_minimum() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts.users[0] = office_user(1, &[Weekday::Mon]).with_min_breaks_per_day(1);
        facts.parts.push(part(10, 500, 1, 1, 100, 1, monday, 9, 0));
        facts
            .parts
            .push(part(11, 501, 1, 1, 100, 1, monday, 12, 0).as_gap());
        let mut sched = schedule(facts);

        // An active day with no placed break falls short of the minimum.
        sched.set_timeslot(0, Some(grid_slot(9, 0))).unwrap();
        assert_eq!(break_quota_out_of_range(&sched), -1);

        sched.set_timeslot(1, Some(grid_slot(12, 0))).unwrap();
        assert_eq!(break_quota_out_of_range(&sched), 0);
    }

    #[test]
    fn too_many_breaks_also_count() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        for n in 0u64..4 {
            facts.parts.push(
                part(
                    10 + n,
                    500 + n,
                    1,
                    1,
                    100,
                    1,
                    monday,
                    9 + n as u32,
                    0,
                )
                .as_gap(),
            );
        }
        let mut sched = schedule(facts);
        for i in 0..4 {
            sched
                .set_timeslot(i, Some(grid_slot(9 + i as u32, 0)))
                .unwrap();
        }
        // Four breaks against a wanted minimum of zero: over the band.
        assert_eq!(break_quota_out_of_range(&sched), -1);

        sched.set_timeslot(3, None).unwrap();
        assert_eq!(break_quota_out_of_range(&sched), -1);

        sched.set_timeslot(2, None).unwrap();
        assert_eq!(break_quota_out_of_range(&sched), 0);
    }

    #[test]
    fn idle_days_have_no_break_quota() {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        facts.users[0] = office_user(1, &[Weekday::Mon]).with_min_breaks_per_day(2);
        facts.parts.push(part(10, 500, 1, 1, 100, 1, monday, 9, 0));
        let sched = schedule(facts);
        // Nothing assigned anywhere: no active bucket to judge.
        assert_eq!(break_quota_out_of_range(&sched), 0);
    }
}

//! Group sequence rules: consecutive parts of a split event stay
//! contiguous, in order and on one date.

use crate::constraint::minutes_between;
use crate::domain::Schedule;

/// Consecutive parts that are not back-to-back on the same date. A pair
/// with an unassigned end counts; the group cannot be contiguous until
/// both sides are placed.
pub fn sequential_gap_or_overlap(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for group in schedule.groups() {
        for pair in group.parts.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match (schedule.assigned_end(a), schedule.assigned_start(b)) {
                (Some(end_a), Some(start_b)) => {
                    let same_date = schedule.assigned_date(a) == schedule.assigned_date(b);
                    if !same_date || start_b != end_a {
                        matches -= 1;
                    }
                }
                _ => matches -= 1,
            }
        }
    }
    matches
}

/// Consecutive parts whose start-to-start distance is not the part-index
/// difference times the single-part width. Pairs with an unassigned end
/// are left to [`sequential_gap_or_overlap`].
pub fn part_duration_drift(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for group in schedule.groups() {
        let width = schedule.single_part_duration_minutes(group);
        for pair in group.parts.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if let (Some(start_a), Some(start_b)) =
                (schedule.assigned_start(a), schedule.assigned_start(b))
            {
                let index_diff = (schedule.parts[b].part - schedule.parts[a].part) as i64;
                if minutes_between(start_a, start_b) != index_diff * width {
                    matches -= 1;
                }
            }
        }
    }
    matches
}

/// The elapsed span from the first part's slot start to the last part's
/// slot end must equal the group's total requested width, on one date.
/// Unassigned span ends count.
pub fn group_span_mismatch(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for group in schedule.groups() {
        let first = group.parts[0];
        let last = group.parts[group.parts.len() - 1];
        match (schedule.assigned_start(first), schedule.assigned_end(last)) {
            (Some(start), Some(end)) => {
                let span = minutes_between(start, end);
                if span != schedule.group_total_duration_minutes(group)
                    || schedule.assigned_date(first) != schedule.assigned_date(last)
                {
                    matches -= 1;
                }
            }
            _ => matches -= 1,
        }
    }
    matches
}

/// Any two parts of one group on different calendar dates, per pair.
pub fn cross_date_group(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for group in schedule.groups() {
        for (i, &a) in group.parts.iter().enumerate() {
            let Some(date_a) = schedule.assigned_date(a) else {
                continue;
            };
            for &b in &group.parts[i + 1..] {
                if let Some(date_b) = schedule.assigned_date(b) {
                    if date_a != date_b {
                        matches -= 1;
                    }
                }
            }
        }
    }
    matches
}

/// A consecutive pair placed in reverse: the earlier part's slot ends
/// after the later part's slot starts.
pub fn part_order_reversal(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for group in schedule.groups() {
        for pair in group.parts.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if let (Some(end_a), Some(start_b)) =
                (schedule.assigned_end(a), schedule.assigned_start(b))
            {
                if end_a > start_b {
                    matches -= 1;
                }
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::fixtures::*;
    use crate::domain::{ScheduleFacts, Timeslot};

    /// Three half-hour parts of one event on the Monday grid.
    fn three_part_facts() -> ScheduleFacts {
        let monday = date(2025, 3, 10);
        let mut facts = single_user_day();
        for n in 1u32..=3 {
            facts
                .parts
                .push(part(9 + n as u64, 500, n, 3, 100, 1, monday, 10, (n - 1) * 30));
        }
        facts
    }

    #[test]
    fn contiguous_group_is_clean() {
        let mut sched = schedule(three_part_facts());
        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(10, 30))).unwrap();
        sched.set_timeslot(2, Some(grid_slot(11, 0))).unwrap();

        assert_eq!(sequential_gap_or_overlap(&sched), 0);
        assert_eq!(part_duration_drift(&sched), 0);
        assert_eq!(group_span_mismatch(&sched), 0);
        assert_eq!(cross_date_group(&sched), 0);
        assert_eq!(part_order_reversal(&sched), 0);
    }

    #[test]
    fn gap_between_parts_breaks_contiguity_and_span() {
        let mut sched = schedule(three_part_facts());
        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        // 30-minute hole after part 1.
        sched.set_timeslot(1, Some(grid_slot(11, 0))).unwrap();
        sched.set_timeslot(2, Some(grid_slot(11, 30))).unwrap();

        assert_eq!(sequential_gap_or_overlap(&sched), -1);
        assert_eq!(part_duration_drift(&sched), -1);
        assert_eq!(group_span_mismatch(&sched), -1);
        assert_eq!(part_order_reversal(&sched), 0);
    }

    #[test]
    fn reversed_parts_match_order_and_gap_rules() {
        let mut sched = schedule(three_part_facts());
        // Part 2 before part 1.
        sched.set_timeslot(0, Some(grid_slot(10, 30))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(10, 0))).unwrap();
        sched.set_timeslot(2, Some(grid_slot(11, 0))).unwrap();

        assert_eq!(part_order_reversal(&sched), -1);
        // Pair (1,2) is not back-to-back and pair (2,3) has a hole.
        assert_eq!(sequential_gap_or_overlap(&sched), -2);
    }

    #[test]
    fn unassigned_middle_part_counts_both_pairs() {
        let mut sched = schedule(three_part_facts());
        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        sched.set_timeslot(2, Some(grid_slot(11, 0))).unwrap();

        assert_eq!(sequential_gap_or_overlap(&sched), -2);
        // Drift and order skip half-assigned pairs.
        assert_eq!(part_duration_drift(&sched), 0);
        assert_eq!(part_order_reversal(&sched), 0);
        // The endpoints alone span exactly 90 minutes, so the span rule
        // cannot see the missing middle.
        assert_eq!(group_span_mismatch(&sched), 0);
    }

    #[test]
    fn group_split_across_dates() {
        let tuesday = date(2025, 3, 11);
        let mut facts = three_part_facts();
        facts
            .timeslots
            .push(Timeslot::new(999, HOST, tuesday, time(10, 30), time(11, 0)));
        let mut sched = schedule(facts);
        let tuesday_slot = sched.timeslot_count() - 1;

        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        sched.set_timeslot(1, Some(tuesday_slot)).unwrap();
        sched.set_timeslot(2, Some(grid_slot(11, 0))).unwrap();

        // Pairs (1,2) and (2,3) each cross dates.
        assert_eq!(cross_date_group(&sched), -2);
        assert_eq!(sequential_gap_or_overlap(&sched), -2);
        // Both span endpoints are on Monday, 90 minutes apart.
        assert_eq!(group_span_mismatch(&sched), 0);
    }

    #[test]
    fn span_mismatch_measures_first_to_last() {
        let mut sched = schedule(three_part_facts());
        // Contiguous but squeezed: parts 1..3 at 10:00, 10:30 and a slot
        // overlapping part 2's half hour.
        sched.set_timeslot(0, Some(grid_slot(10, 0))).unwrap();
        sched.set_timeslot(1, Some(grid_slot(10, 30))).unwrap();
        sched.set_timeslot(2, Some(grid_slot(10, 30))).unwrap();

        // First start 10:00, last end 11:00: 60 minutes, expected 90.
        assert_eq!(group_span_mismatch(&sched), -1);
    }
}

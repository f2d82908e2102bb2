//! Moves over schedule assignments and their random selection.

use rand::rngs::StdRng;
use rand::Rng;

use timeweave_core::{Schedule, ScheduleError};

/// An atomic mutation of the working schedule's assignments.
///
/// The catalog is closed: every local search step is one of these two
/// kinds, and every inverse is again one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Point one part at a timeslot index. Candidate moves always carry
    /// `Some(slot)`; the `None` form arises as the inverse of a first
    /// assignment.
    Reassign { part: usize, slot: Option<usize> },
    /// Exchange the assignments of two parts; its own inverse.
    Swap { a: usize, b: usize },
}

impl Move {
    /// Whether applying this move would change the schedule.
    ///
    /// No-ops (reassigning to the current slot, swapping equal
    /// assignments) and out-of-range indexes are not doable.
    pub fn is_doable(&self, schedule: &Schedule) -> bool {
        match *self {
            Move::Reassign { part, slot } => {
                part < schedule.part_count()
                    && slot.map_or(true, |s| s < schedule.timeslot_count())
                    && schedule.parts[part].timeslot != slot
            }
            Move::Swap { a, b } => {
                a != b
                    && a < schedule.part_count()
                    && b < schedule.part_count()
                    && schedule.parts[a].timeslot != schedule.parts[b].timeslot
            }
        }
    }

    /// Applies the move and returns its exact inverse.
    ///
    /// Applying a move and then the returned inverse restores the
    /// assignments exactly.
    pub fn apply(&self, schedule: &mut Schedule) -> Result<Move, ScheduleError> {
        match *self {
            Move::Reassign { part, slot } => {
                let prev = schedule
                    .parts
                    .get(part)
                    .ok_or(ScheduleError::IndexOutOfBounds {
                        what: "part",
                        index: part,
                        len: schedule.part_count(),
                    })?
                    .timeslot;
                schedule.set_timeslot(part, slot)?;
                Ok(Move::Reassign { part, slot: prev })
            }
            Move::Swap { a, b } => {
                let slot_a = schedule
                    .parts
                    .get(a)
                    .ok_or(ScheduleError::IndexOutOfBounds {
                        what: "part",
                        index: a,
                        len: schedule.part_count(),
                    })?
                    .timeslot;
                let slot_b = schedule
                    .parts
                    .get(b)
                    .ok_or(ScheduleError::IndexOutOfBounds {
                        what: "part",
                        index: b,
                        len: schedule.part_count(),
                    })?
                    .timeslot;
                schedule.set_timeslot(a, slot_b)?;
                schedule.set_timeslot(b, slot_a)?;
                Ok(Move::Swap { a, b })
            }
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Move::Reassign { part, slot } => match slot {
                Some(slot) => write!(f, "reassign(part={part}, slot={slot})"),
                None => write!(f, "reassign(part={part}, slot=none)"),
            },
            Move::Swap { a, b } => write!(f, "swap({a}, {b})"),
        }
    }
}

/// Random move sampling for the local search phase.
///
/// Reassigns are drawn twice as often as swaps; swaps need at least two
/// parts to exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveSelector;

impl MoveSelector {
    pub fn new() -> Self {
        Self
    }

    /// Draws one candidate move, or `None` when the schedule offers no
    /// move at all.
    pub fn sample(&self, schedule: &Schedule, rng: &mut StdRng) -> Option<Move> {
        let parts = schedule.part_count();
        let slots = schedule.timeslot_count();
        if parts == 0 || slots == 0 {
            return None;
        }
        let pick_swap = parts >= 2 && rng.random_range(0..3) == 0;
        if pick_swap {
            let a = rng.random_range(0..parts);
            let mut b = rng.random_range(0..parts - 1);
            if b >= a {
                b += 1;
            }
            Some(Move::Swap { a, b })
        } else {
            let part = rng.random_range(0..parts);
            let slot = rng.random_range(0..slots);
            Some(Move::Reassign {
                part,
                slot: Some(slot),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Weekday};
    use rand::SeedableRng;
    use timeweave_core::{Event, EventPart, ScheduleFacts, Timeslot, User};

    fn time(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    fn small_schedule() -> Schedule {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let slots = (0..4u64)
            .map(|i| {
                let start = time(9 + i as u32, 0);
                let end = time(10 + i as u32, 0);
                Timeslot::new(i + 1, 7, monday, start, end)
            })
            .collect();
        let parts = (0..3u64)
            .map(|i| {
                EventPart::new(
                    10 + i,
                    500 + i,
                    1,
                    1,
                    100,
                    1,
                    monday.and_time(time(9, 0)),
                    monday.and_time(time(10, 0)),
                )
            })
            .collect();
        let facts = ScheduleFacts {
            host_id: 7,
            timeslots: slots,
            users: vec![User::new(1).with_work_time(Weekday::Mon, time(9, 0), time(17, 0))],
            events: vec![Event::new(100, 1)],
            parts,
        };
        Schedule::from_facts(facts).unwrap()
    }

    #[test]
    fn reassign_inverse_restores_assignments() {
        let mut schedule = small_schedule();
        schedule.set_timeslot(0, Some(1)).unwrap();
        let before = schedule.assignments();

        let mv = Move::Reassign {
            part: 0,
            slot: Some(3),
        };
        let inverse = mv.apply(&mut schedule).unwrap();
        assert_eq!(schedule.parts[0].timeslot, Some(3));
        assert_eq!(
            inverse,
            Move::Reassign {
                part: 0,
                slot: Some(1)
            }
        );

        inverse.apply(&mut schedule).unwrap();
        assert_eq!(schedule.assignments(), before);
    }

    #[test]
    fn first_assignment_inverse_points_back_at_none() {
        let mut schedule = small_schedule();
        let mv = Move::Reassign {
            part: 2,
            slot: Some(0),
        };
        let inverse = mv.apply(&mut schedule).unwrap();
        assert_eq!(inverse, Move::Reassign { part: 2, slot: None });

        inverse.apply(&mut schedule).unwrap();
        assert_eq!(schedule.parts[2].timeslot, None);
    }

    #[test]
    fn swap_is_its_own_inverse() {
        let mut schedule = small_schedule();
        schedule.set_timeslot(0, Some(0)).unwrap();
        schedule.set_timeslot(1, Some(2)).unwrap();
        let before = schedule.assignments();

        let mv = Move::Swap { a: 0, b: 1 };
        let inverse = mv.apply(&mut schedule).unwrap();
        assert_eq!(schedule.parts[0].timeslot, Some(2));
        assert_eq!(schedule.parts[1].timeslot, Some(0));
        assert_eq!(inverse, mv);

        inverse.apply(&mut schedule).unwrap();
        assert_eq!(schedule.assignments(), before);
    }

    #[test]
    fn swap_with_an_unassigned_side_moves_the_slot_over() {
        let mut schedule = small_schedule();
        schedule.set_timeslot(0, Some(1)).unwrap();

        let mv = Move::Swap { a: 0, b: 2 };
        assert!(mv.is_doable(&schedule));
        mv.apply(&mut schedule).unwrap();
        assert_eq!(schedule.parts[0].timeslot, None);
        assert_eq!(schedule.parts[2].timeslot, Some(1));
    }

    #[test]
    fn no_ops_are_not_doable() {
        let mut schedule = small_schedule();
        schedule.set_timeslot(0, Some(1)).unwrap();
        schedule.set_timeslot(1, Some(1)).unwrap();

        // Reassigning to the current slot changes nothing.
        assert!(!Move::Reassign {
            part: 0,
            slot: Some(1)
        }
        .is_doable(&schedule));
        // Both sides already hold the same assignment.
        assert!(!Move::Swap { a: 0, b: 1 }.is_doable(&schedule));
        // A part cannot swap with itself.
        assert!(!Move::Swap { a: 0, b: 0 }.is_doable(&schedule));
        // Out-of-range indexes are never doable.
        assert!(!Move::Reassign {
            part: 99,
            slot: Some(0)
        }
        .is_doable(&schedule));
    }

    #[test]
    fn sampled_moves_stay_in_range() {
        let schedule = small_schedule();
        let selector = MoveSelector::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            match selector.sample(&schedule, &mut rng).unwrap() {
                Move::Reassign { part, slot } => {
                    assert!(part < schedule.part_count());
                    assert!(slot.unwrap() < schedule.timeslot_count());
                }
                Move::Swap { a, b } => {
                    assert!(a < schedule.part_count());
                    assert!(b < schedule.part_count());
                    assert_ne!(a, b);
                }
            }
        }
    }
}

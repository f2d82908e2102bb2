//! Deadline rules over the part-level hard and soft deadlines.

use crate::domain::Schedule;

/// A part with a hard deadline whose slot ends past it. Unparseable
/// deadlines and unassigned parts count as missed.
pub fn hard_deadline_miss(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.hard_deadline.is_set() {
            continue;
        }
        match schedule.assigned_end(idx) {
            Some(end) if !part.hard_deadline.missed_by(end) => {}
            _ => matches -= 1,
        }
    }
    matches
}

/// Soft-tier mirror of [`hard_deadline_miss`]; only placed parts count.
pub fn soft_deadline_miss(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for (idx, part) in schedule.parts.iter().enumerate() {
        if !part.soft_deadline.is_set() {
            continue;
        }
        if let Some(end) = schedule.assigned_end(idx) {
            if part.soft_deadline.missed_by(end) {
                matches -= 1;
            }
        }
    }
    matches
}

//! Booking conflicts: double bookings, desynchronized meetings and
//! meeting/non-meeting collisions.

use std::collections::HashMap;

use crate::domain::Schedule;

/// Two distinct parts of the same user sitting in slots with equal
/// values. Counted per pair; slot records are compared by value, so
/// duplicate records for one interval still collide.
pub fn user_double_booking(schedule: &Schedule) -> i64 {
    let mut matches = 0;
    for user_idx in 0..schedule.users.len() {
        let parts = schedule.parts_of_user(user_idx);
        for (i, &a) in parts.iter().enumerate() {
            for &b in &parts[i + 1..] {
                if schedule.slots_equal(a, b) {
                    matches -= 1;
                }
            }
        }
    }
    matches
}

/// Copies of one meeting part across participants must sit in the same
/// slot. A pair whose assignments differ (including assigned vs. not
/// assigned) counts; two unassigned copies do not.
pub fn meeting_slot_desync(schedule: &Schedule) -> i64 {
    let mut copies: HashMap<(u64, u32), Vec<usize>> = HashMap::new();
    for (idx, part) in schedule.parts.iter().enumerate() {
        if let (Some(meeting_id), Some(meeting_part)) = (part.meeting_id, part.meeting_part) {
            copies.entry((meeting_id, meeting_part)).or_default().push(idx);
        }
    }

    let mut matches = 0;
    for parts in copies.values() {
        for (i, &a) in parts.iter().enumerate() {
            for &b in &parts[i + 1..] {
                // None == None is two unassigned copies: nothing to compare.
                if schedule.slot_key_of(a) != schedule.slot_key_of(b) {
                    matches -= 1;
                }
            }
        }
    }
    matches
}

/// A meeting part and a non-meeting part in slots with equal values.
/// Deliberately not scoped to one user: a slot hosting a meeting is not
/// also a working slot.
pub fn meeting_nonmeeting_collision(schedule: &Schedule) -> i64 {
    let mut per_slot: HashMap<u32, (i64, i64)> = HashMap::new();
    for (idx, part) in schedule.parts.iter().enumerate() {
        if let Some(key) = schedule.slot_key_of(idx) {
            let counts = per_slot.entry(key).or_insert((0, 0));
            if part.is_meeting {
                counts.0 += 1;
            } else {
                counts.1 += 1;
            }
        }
    }
    -per_slot
        .values()
        .map(|(meetings, others)| meetings * others)
        .sum::<i64>()
}

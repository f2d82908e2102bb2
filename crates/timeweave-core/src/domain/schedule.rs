//! Schedule - the planning solution aggregate.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::domain::validation;
use crate::domain::{Event, EventPart, Timeslot, User, WorkTime};
use crate::error::{Result, ScheduleError};
use crate::score::HardMediumSoftScore;

/// Raw fact intake for one host's scheduling window.
///
/// Everything a solve needs arrives here in one piece; intake validates
/// the whole set before any `Schedule` exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleFacts {
    pub host_id: u64,
    pub timeslots: Vec<Timeslot>,
    pub users: Vec<User>,
    pub events: Vec<Event>,
    pub parts: Vec<EventPart>,
}

/// One split event's parts in part order, with its resolved owners.
#[derive(Debug, Clone)]
pub struct Group {
    pub group_id: u64,
    /// User arena index.
    pub user: usize,
    /// Event arena index.
    pub event: usize,
    pub is_meeting: bool,
    pub gap: bool,
    /// Part arena indexes, ascending by part number.
    pub parts: SmallVec<[usize; 8]>,
}

/// The planning solution: immutable facts, precomputed join indexes and
/// the per-part slot assignments.
///
/// Scoring never chases ids; every cross-reference is resolved to an
/// arena index when the schedule is built. Only `set_timeslot` mutates
/// state during solving, so the indexes stay valid for the whole solve.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub host_id: u64,
    pub timeslots: Vec<Timeslot>,
    pub users: Vec<User>,
    pub events: Vec<Event>,
    pub parts: Vec<EventPart>,
    groups: Vec<Group>,
    group_of_part: Vec<usize>,
    user_of_part: Vec<usize>,
    event_of_part: Vec<usize>,
    by_user: Vec<SmallVec<[usize; 8]>>,
    /// Canonical key per timeslot index; equal keys mean equal slot values.
    slot_keys: Vec<u32>,
    pub score: Option<HardMediumSoftScore>,
}

impl Schedule {
    /// Validates a fact set and builds the indexed schedule.
    ///
    /// A structurally broken fact set is rejected with every issue found;
    /// no partial schedule is ever returned.
    pub fn from_facts(facts: ScheduleFacts) -> Result<Self> {
        let issues = validation::validate_facts(&facts);
        if !issues.is_empty() {
            return Err(ScheduleError::InvalidFacts(issues));
        }

        let ScheduleFacts {
            host_id,
            timeslots,
            users,
            events,
            parts,
        } = facts;

        let user_index: HashMap<u64, usize> =
            users.iter().enumerate().map(|(i, u)| (u.id, i)).collect();
        let event_index: HashMap<u64, usize> =
            events.iter().enumerate().map(|(i, e)| (e.id, i)).collect();

        let mut slot_keys = Vec::with_capacity(timeslots.len());
        let mut canonical = HashMap::new();
        for slot in &timeslots {
            let next = canonical.len() as u32;
            let key = *canonical.entry(slot.value_key()).or_insert(next);
            slot_keys.push(key);
        }

        let mut user_of_part = Vec::with_capacity(parts.len());
        let mut event_of_part = Vec::with_capacity(parts.len());
        for part in &parts {
            let user = *user_index
                .get(&part.user_id)
                .ok_or(ScheduleError::UnknownReference {
                    entity: "user",
                    id: part.user_id,
                })?;
            let event = *event_index
                .get(&part.event_id)
                .ok_or(ScheduleError::UnknownReference {
                    entity: "event",
                    id: part.event_id,
                })?;
            user_of_part.push(user);
            event_of_part.push(event);
        }

        let mut groups: Vec<Group> = Vec::new();
        let mut group_map: HashMap<u64, usize> = HashMap::new();
        for (idx, part) in parts.iter().enumerate() {
            let gidx = match group_map.get(&part.group_id) {
                Some(&g) => g,
                None => {
                    let g = groups.len();
                    groups.push(Group {
                        group_id: part.group_id,
                        user: user_of_part[idx],
                        event: event_of_part[idx],
                        is_meeting: part.is_meeting,
                        gap: part.gap,
                        parts: SmallVec::new(),
                    });
                    group_map.insert(part.group_id, g);
                    g
                }
            };
            groups[gidx].parts.push(idx);
        }
        for group in &mut groups {
            group.parts.sort_by_key(|&i| parts[i].part);
        }

        let mut group_of_part = vec![0usize; parts.len()];
        for (gidx, group) in groups.iter().enumerate() {
            for &p in &group.parts {
                group_of_part[p] = gidx;
            }
        }

        let mut by_user: Vec<SmallVec<[usize; 8]>> = vec![SmallVec::new(); users.len()];
        for idx in 0..parts.len() {
            by_user[user_of_part[idx]].push(idx);
        }

        Ok(Self {
            host_id,
            timeslots,
            users,
            events,
            parts,
            groups,
            group_of_part,
            user_of_part,
            event_of_part,
            by_user,
            slot_keys,
            score: None,
        })
    }

    #[inline]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn timeslot_count(&self) -> usize {
        self.timeslots.len()
    }

    #[inline]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[inline]
    pub fn group_of(&self, part: usize) -> &Group {
        &self.groups[self.group_of_part[part]]
    }

    #[inline]
    pub fn user_index_of(&self, part: usize) -> usize {
        self.user_of_part[part]
    }

    #[inline]
    pub fn user_of(&self, part: usize) -> &User {
        &self.users[self.user_of_part[part]]
    }

    #[inline]
    pub fn event_of(&self, part: usize) -> &Event {
        &self.events[self.event_of_part[part]]
    }

    /// Part indexes belonging to the user at `user_idx`.
    #[inline]
    pub fn parts_of_user(&self, user_idx: usize) -> &[usize] {
        &self.by_user[user_idx]
    }

    /// The assigned slot of a part, if any.
    #[inline]
    pub fn slot_of(&self, part: usize) -> Option<&Timeslot> {
        self.parts[part].timeslot.map(|i| &self.timeslots[i])
    }

    /// Canonical value key of the part's assigned slot.
    #[inline]
    pub fn slot_key_of(&self, part: usize) -> Option<u32> {
        self.parts[part].timeslot.map(|i| self.slot_keys[i])
    }

    /// Whether two parts sit in slots with equal values. Records with
    /// distinct ids but the same interval compare equal here.
    #[inline]
    pub fn slots_equal(&self, a: usize, b: usize) -> bool {
        match (self.slot_key_of(a), self.slot_key_of(b)) {
            (Some(ka), Some(kb)) => ka == kb,
            _ => false,
        }
    }

    #[inline]
    pub fn assigned_start(&self, part: usize) -> Option<NaiveDateTime> {
        self.slot_of(part).map(Timeslot::start_datetime)
    }

    #[inline]
    pub fn assigned_end(&self, part: usize) -> Option<NaiveDateTime> {
        self.slot_of(part).map(Timeslot::end_datetime)
    }

    #[inline]
    pub fn assigned_date(&self, part: usize) -> Option<NaiveDate> {
        self.slot_of(part).map(|s| s.date)
    }

    /// The user's working interval for the part's assigned day, if both
    /// the assignment and the interval exist.
    pub fn work_time_of(&self, part: usize) -> Option<&WorkTime> {
        let slot = self.slot_of(part)?;
        self.user_of(part).work_time_for(slot.day_of_week)
    }

    /// Requested width of one part of `group`, in minutes. Uniform across
    /// the group by intake validation.
    #[inline]
    pub fn single_part_duration_minutes(&self, group: &Group) -> i64 {
        self.parts[group.parts[0]].requested_duration_minutes()
    }

    /// Requested width of the whole group, in minutes.
    #[inline]
    pub fn group_total_duration_minutes(&self, group: &Group) -> i64 {
        self.single_part_duration_minutes(group) * group.parts.len() as i64
    }

    /// Assigns (or clears) the planning variable of one part.
    pub fn set_timeslot(&mut self, part: usize, slot: Option<usize>) -> Result<()> {
        if part >= self.parts.len() {
            return Err(ScheduleError::IndexOutOfBounds {
                what: "event part",
                index: part,
                len: self.parts.len(),
            });
        }
        if let Some(s) = slot {
            if s >= self.timeslots.len() {
                return Err(ScheduleError::IndexOutOfBounds {
                    what: "timeslot",
                    index: s,
                    len: self.timeslots.len(),
                });
            }
        }
        self.parts[part].timeslot = slot;
        Ok(())
    }

    /// Snapshot of all planning variables, in part arena order.
    pub fn assignments(&self) -> Vec<Option<usize>> {
        self.parts.iter().map(|p| p.timeslot).collect()
    }

    pub fn unassigned_count(&self) -> usize {
        self.parts.iter().filter(|p| p.timeslot.is_none()).count()
    }
}

//! Structural validation of fact sets before solving.
//!
//! Validation walks the whole fact set and reports every defect it finds;
//! a broken set is rejected in one round trip instead of failing
//! check-by-check. Data-quality problems that scoring can absorb (missing
//! work times, invalid deadline strings) are deliberately not validated
//! here; the constraint functions score them instead.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Datelike;

use crate::domain::{EventPart, ScheduleFacts};
use crate::error::FactIssue;

/// Checks the fact set and returns every structural issue found.
pub fn validate_facts(facts: &ScheduleFacts) -> Vec<FactIssue> {
    let mut issues = Vec::new();

    check_timeslots(facts, &mut issues);
    let user_ids = check_users(facts, &mut issues);
    let event_owners = check_events(facts, &user_ids, &mut issues);
    check_parts(facts, &user_ids, &event_owners, &mut issues);
    check_groups(facts, &mut issues);

    issues
}

fn issue(entity: &'static str, id: u64, field: &'static str, message: impl Into<String>) -> FactIssue {
    FactIssue {
        entity,
        id,
        field,
        message: message.into(),
    }
}

fn check_timeslots(facts: &ScheduleFacts, issues: &mut Vec<FactIssue>) {
    for slot in &facts.timeslots {
        if slot.end_time <= slot.start_time {
            issues.push(issue(
                "timeslot",
                slot.id,
                "end_time",
                format!("{} is not after start {}", slot.end_time, slot.start_time),
            ));
        }
        if slot.date.weekday() != slot.day_of_week {
            issues.push(issue(
                "timeslot",
                slot.id,
                "day_of_week",
                format!("{:?} does not match date {}", slot.day_of_week, slot.date),
            ));
        }
        if slot.host_id != facts.host_id {
            issues.push(issue(
                "timeslot",
                slot.id,
                "host_id",
                format!("belongs to host {}, fact set is for host {}", slot.host_id, facts.host_id),
            ));
        }
    }
}

fn check_users(facts: &ScheduleFacts, issues: &mut Vec<FactIssue>) -> HashSet<u64> {
    let mut ids = HashSet::new();
    for user in &facts.users {
        if !ids.insert(user.id) {
            issues.push(issue("user", user.id, "id", "duplicate user id"));
            continue;
        }
        if user.work_times.is_empty() {
            issues.push(issue("user", user.id, "work_times", "has no working intervals"));
        }
        let mut days = HashSet::new();
        for wt in &user.work_times {
            if !days.insert(wt.day_of_week) {
                issues.push(issue(
                    "user",
                    user.id,
                    "work_times",
                    format!("more than one interval for {:?}", wt.day_of_week),
                ));
            }
            if wt.end_time <= wt.start_time {
                issues.push(issue(
                    "user",
                    user.id,
                    "work_times",
                    format!("{:?} interval {} is not after {}", wt.day_of_week, wt.end_time, wt.start_time),
                ));
            }
        }
        if user.max_workload_percent > 100 {
            issues.push(issue(
                "user",
                user.id,
                "max_workload_percent",
                format!("{} exceeds 100", user.max_workload_percent),
            ));
        }
    }
    ids
}

fn check_events(
    facts: &ScheduleFacts,
    user_ids: &HashSet<u64>,
    issues: &mut Vec<FactIssue>,
) -> HashMap<u64, u64> {
    let mut owners = HashMap::new();
    for event in &facts.events {
        if owners.insert(event.id, event.user_id).is_some() {
            issues.push(issue("event", event.id, "id", "duplicate event id"));
        }
        if !user_ids.contains(&event.user_id) {
            issues.push(issue(
                "event",
                event.id,
                "user_id",
                format!("references unknown user {}", event.user_id),
            ));
        }
        for range in &event.preferred_ranges {
            if range.end_time <= range.start_time {
                issues.push(issue(
                    "event",
                    event.id,
                    "preferred_ranges",
                    format!("range end {} is not after start {}", range.end_time, range.start_time),
                ));
            }
        }
    }
    owners
}

fn check_parts(
    facts: &ScheduleFacts,
    user_ids: &HashSet<u64>,
    event_owners: &HashMap<u64, u64>,
    issues: &mut Vec<FactIssue>,
) {
    let mut part_ids = HashSet::new();
    for part in &facts.parts {
        if !part_ids.insert(part.id) {
            issues.push(issue("event_part", part.id, "id", "duplicate part id"));
        }
        if !user_ids.contains(&part.user_id) {
            issues.push(issue(
                "event_part",
                part.id,
                "user_id",
                format!("references unknown user {}", part.user_id),
            ));
        }
        match event_owners.get(&part.event_id) {
            None => issues.push(issue(
                "event_part",
                part.id,
                "event_id",
                format!("references unknown event {}", part.event_id),
            )),
            Some(&owner) if owner != part.user_id => issues.push(issue(
                "event_part",
                part.id,
                "user_id",
                format!("user {} does not own event {}", part.user_id, part.event_id),
            )),
            _ => {}
        }
        if part.last_part == 0 {
            issues.push(issue("event_part", part.id, "last_part", "must be at least 1"));
        }
        if part.part == 0 || part.part > part.last_part {
            issues.push(issue(
                "event_part",
                part.id,
                "part",
                format!("{} outside 1..={}", part.part, part.last_part),
            ));
        }
        if part.end <= part.start {
            issues.push(issue(
                "event_part",
                part.id,
                "end",
                format!("{} is not after start {}", part.end, part.start),
            ));
        }
        if part.meeting_id.is_some() != part.meeting_part.is_some() {
            issues.push(issue(
                "event_part",
                part.id,
                "meeting_part",
                "meeting_id and meeting_part must be set together",
            ));
        }
        if part.meeting_id.is_some() && !part.is_meeting {
            issues.push(issue(
                "event_part",
                part.id,
                "is_meeting",
                "has a meeting_id but is not flagged as a meeting",
            ));
        }
        if part.is_external_meeting && !part.is_meeting {
            issues.push(issue(
                "event_part",
                part.id,
                "is_external_meeting",
                "external meetings must also be meetings",
            ));
        }
    }
}

fn check_groups(facts: &ScheduleFacts, issues: &mut Vec<FactIssue>) {
    let mut by_group: BTreeMap<u64, Vec<&EventPart>> = BTreeMap::new();
    for part in &facts.parts {
        by_group.entry(part.group_id).or_default().push(part);
    }

    for (group_id, parts) in by_group {
        let first = parts[0];
        for part in &parts[1..] {
            if part.user_id != first.user_id
                || part.event_id != first.event_id
                || part.last_part != first.last_part
            {
                issues.push(issue(
                    "group",
                    group_id,
                    "parts",
                    "parts disagree on user, event or last_part",
                ));
                break;
            }
        }
        for part in &parts[1..] {
            if part.gap != first.gap
                || part.daily_task_list != first.daily_task_list
                || part.weekly_task_list != first.weekly_task_list
                || part.is_meeting != first.is_meeting
            {
                issues.push(issue(
                    "group",
                    group_id,
                    "parts",
                    "parts disagree on gap, task-list or meeting flags",
                ));
                break;
            }
        }
        if parts
            .iter()
            .any(|p| p.requested_duration_minutes() != first.requested_duration_minutes())
        {
            issues.push(issue(
                "group",
                group_id,
                "parts",
                "parts have differing requested durations",
            ));
        }

        let mut numbers: Vec<u32> = parts.iter().map(|p| p.part).collect();
        numbers.sort_unstable();
        let expected: Vec<u32> = (1..=first.last_part).collect();
        if numbers != expected {
            issues.push(issue(
                "group",
                group_id,
                "part",
                format!("part numbers {:?} are not exactly 1..={}", numbers, first.last_part),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Event, EventPart, ScheduleFacts, Timeslot, User};
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    fn base() -> ScheduleFacts {
        let monday = date(2025, 3, 10);
        ScheduleFacts {
            host_id: 7,
            timeslots: vec![Timeslot::new(1, 7, monday, time(9, 0), time(9, 30))],
            users: vec![User::new(1).with_work_time(Weekday::Mon, time(9, 0), time(17, 0))],
            events: vec![Event::new(100, 1)],
            parts: vec![EventPart::new(
                10,
                500,
                1,
                1,
                100,
                1,
                monday.and_time(time(9, 0)),
                monday.and_time(time(9, 30)),
            )],
        }
    }

    fn fields_of(issues: &[FactIssue]) -> Vec<(&'static str, &'static str)> {
        issues.iter().map(|i| (i.entity, i.field)).collect()
    }

    #[test]
    fn clean_facts_produce_no_issues() {
        assert!(validate_facts(&base()).is_empty());
    }

    #[test]
    fn inverted_timeslot_and_wrong_weekday() {
        let mut facts = base();
        facts.timeslots[0].start_time = time(10, 0);
        facts.timeslots[0].day_of_week = Weekday::Tue;
        let issues = validate_facts(&facts);
        let fields = fields_of(&issues);
        assert!(fields.contains(&("timeslot", "end_time")));
        assert!(fields.contains(&("timeslot", "day_of_week")));
    }

    #[test]
    fn foreign_host_timeslot() {
        let mut facts = base();
        facts.timeslots[0].host_id = 99;
        let issues = validate_facts(&facts);
        assert!(fields_of(&issues).contains(&("timeslot", "host_id")));
    }

    #[test]
    fn user_without_work_times() {
        let mut facts = base();
        facts.users[0].work_times.clear();
        let issues = validate_facts(&facts);
        assert!(fields_of(&issues).contains(&("user", "work_times")));
    }

    #[test]
    fn duplicate_weekday_interval_and_excess_workload() {
        let mut facts = base();
        facts.users[0] = facts.users[0]
            .clone()
            .with_work_time(Weekday::Mon, time(18, 0), time(19, 0))
            .with_max_workload_percent(120);
        let issues = validate_facts(&facts);
        let fields = fields_of(&issues);
        assert!(fields.contains(&("user", "work_times")));
        assert!(fields.contains(&("user", "max_workload_percent")));
    }

    #[test]
    fn part_with_unknown_references() {
        let mut facts = base();
        facts.parts[0].user_id = 42;
        facts.parts[0].event_id = 4242;
        let issues = validate_facts(&facts);
        let fields = fields_of(&issues);
        assert!(fields.contains(&("event_part", "user_id")));
        assert!(fields.contains(&("event_part", "event_id")));
    }

    #[test]
    fn part_not_owned_by_events_user() {
        let mut facts = base();
        facts.users.push(User::new(2).with_work_time(Weekday::Mon, time(9, 0), time(17, 0)));
        facts.parts[0].user_id = 2;
        let issues = validate_facts(&facts);
        assert!(fields_of(&issues).contains(&("event_part", "user_id")));
    }

    #[test]
    fn part_index_out_of_range() {
        let mut facts = base();
        facts.parts[0].part = 3;
        let issues = validate_facts(&facts);
        let fields = fields_of(&issues);
        assert!(fields.contains(&("event_part", "part")));
        // The group's 1..=last_part coverage breaks as well.
        assert!(fields.contains(&("group", "part")));
    }

    #[test]
    fn meeting_fields_must_come_together() {
        let mut facts = base();
        facts.parts[0].meeting_id = Some(900);
        let issues = validate_facts(&facts);
        let fields = fields_of(&issues);
        assert!(fields.contains(&("event_part", "meeting_part")));
        assert!(fields.contains(&("event_part", "is_meeting")));
    }

    #[test]
    fn group_with_hole_and_mixed_flags() {
        let mut facts = base();
        let monday = date(2025, 3, 10);
        let mut second = EventPart::new(
            11,
            500,
            3,
            3,
            100,
            1,
            monday.and_time(time(10, 0)),
            monday.and_time(time(10, 30)),
        );
        second.gap = true;
        facts.parts[0].last_part = 3;
        facts.parts.push(second);
        let issues = validate_facts(&facts);
        let fields = fields_of(&issues);
        assert!(fields.contains(&("group", "part")));
        assert!(fields.contains(&("group", "parts")));
    }

    #[test]
    fn all_issues_are_reported_at_once() {
        let mut facts = base();
        facts.timeslots[0].host_id = 99;
        facts.users[0].work_times.clear();
        facts.parts[0].event_id = 4242;
        let issues = validate_facts(&facts);
        assert!(issues.len() >= 3, "expected 3+ issues, got {:?}", issues);
    }
}

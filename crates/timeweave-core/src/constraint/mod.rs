//! Constraint catalog for schedule scoring.
//!
//! Scoring is an explicit registry of constraint functions: every rule is
//! a plain `Fn(&Schedule) -> i64` returning its signed match total
//! (penalties negative, rewards positive) for one score tier. Evaluation
//! is a fresh pass over the schedule with no retained state, so equal
//! schedules always score equal.
//!
//! Functions that need a part's assigned slot follow one convention:
//! hard rules treat a missing assignment or working interval as a
//! violation (the hard tier is what drives the search toward full,
//! workable assignment); medium and soft rules skip unassigned parts.

pub mod cadence;
pub mod conflicts;
pub mod deadline;
pub mod pinning;
pub mod preference;
pub mod sequence;
pub mod working_hours;

use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::domain::Schedule;
use crate::score::HardMediumSoftScore;

/// Score level a constraint contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreTier {
    Hard,
    Medium,
    Soft,
}

impl ScoreTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTier::Hard => "hard",
            ScoreTier::Medium => "medium",
            ScoreTier::Soft => "soft",
        }
    }
}

/// One registered constraint function.
pub struct ConstraintDef {
    pub name: &'static str,
    pub tier: ScoreTier,
    eval: Box<dyn Fn(&Schedule) -> i64 + Send + Sync>,
}

impl ConstraintDef {
    pub fn new(
        name: &'static str,
        tier: ScoreTier,
        eval: impl Fn(&Schedule) -> i64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            tier,
            eval: Box::new(eval),
        }
    }

    /// Signed match total of this constraint on `schedule`.
    pub fn matches(&self, schedule: &Schedule) -> i64 {
        (self.eval)(schedule)
    }

    /// Score contribution of this constraint on `schedule`.
    pub fn score(&self, schedule: &Schedule) -> HardMediumSoftScore {
        let matches = self.matches(schedule);
        match self.tier {
            ScoreTier::Hard => HardMediumSoftScore::of_hard(matches),
            ScoreTier::Medium => HardMediumSoftScore::of_medium(matches),
            ScoreTier::Soft => HardMediumSoftScore::of_soft(matches),
        }
    }
}

impl std::fmt::Debug for ConstraintDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintDef")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .finish()
    }
}

/// One row of a score explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintMatchTotal {
    pub name: &'static str,
    pub tier: ScoreTier,
    pub matches: i64,
    pub score: HardMediumSoftScore,
}

/// The constraint registry used to evaluate schedules.
pub struct ConstraintSet {
    defs: Vec<ConstraintDef>,
}

impl ConstraintSet {
    /// Builds a registry from explicit definitions. Mainly for tests;
    /// production scoring uses [`ConstraintSet::standard`].
    pub fn new(defs: Vec<ConstraintDef>) -> Self {
        Self { defs }
    }

    /// The full scheduling rule catalog.
    pub fn standard() -> Self {
        use ScoreTier::{Hard, Medium, Soft};

        let defs = vec![
            // Hard
            ConstraintDef::new("User double booking", Hard, conflicts::user_double_booking),
            ConstraintDef::new("Meeting slot desync", Hard, conflicts::meeting_slot_desync),
            ConstraintDef::new(
                "Meeting vs non-meeting collision",
                Hard,
                conflicts::meeting_nonmeeting_collision,
            ),
            ConstraintDef::new(
                "Outside working hours",
                Hard,
                working_hours::outside_working_hours,
            ),
            ConstraintDef::new(
                "Group exceeds workday",
                Hard,
                working_hours::group_exceeds_workday,
            ),
            ConstraintDef::new(
                "Non-first part at day start",
                Hard,
                working_hours::nonfirst_part_at_day_start,
            ),
            ConstraintDef::new(
                "Sequential gap or overlap",
                Hard,
                sequence::sequential_gap_or_overlap,
            ),
            ConstraintDef::new("Part duration drift", Hard, sequence::part_duration_drift),
            ConstraintDef::new("Group span mismatch", Hard, sequence::group_span_mismatch),
            ConstraintDef::new("Group crosses dates", Hard, sequence::cross_date_group),
            ConstraintDef::new("Part order reversal", Hard, sequence::part_order_reversal),
            ConstraintDef::new("Hard deadline missed", Hard, deadline::hard_deadline_miss),
            ConstraintDef::new("Immutable event drift", Hard, pinning::immutable_drift),
            ConstraintDef::new(
                "Outside preferred start range",
                Hard,
                preference::preferred_range_start_hard,
            ),
            ConstraintDef::new(
                "Outside preferred end range",
                Hard,
                preference::preferred_range_end_hard,
            ),
            // Medium
            ConstraintDef::new(
                "Priority order inversion",
                Medium,
                cadence::priority_order_inversion,
            ),
            ConstraintDef::new("Positive impact slot", Medium, preference::positive_impact_hit),
            ConstraintDef::new("Negative impact slot", Medium, preference::negative_impact_hit),
            ConstraintDef::new(
                "Preferred day or time missed",
                Medium,
                preference::preferred_day_time_miss,
            ),
            ConstraintDef::new(
                "Preferred schedule range missed",
                Medium,
                preference::preferred_schedule_range_miss,
            ),
            ConstraintDef::new(
                "External meeting drift",
                Medium,
                pinning::external_meeting_drift,
            ),
            ConstraintDef::new("Meeting drift", Medium, pinning::meeting_drift),
            ConstraintDef::new("Back-to-back meetings", Medium, cadence::back_to_back_meetings),
            ConstraintDef::new("Break adjacency", Medium, cadence::break_adjacency),
            ConstraintDef::new(
                "Meetings per day exceeded",
                Medium,
                cadence::meetings_per_day_exceeded,
            ),
            // Soft
            ConstraintDef::new("Requested date drift", Soft, pinning::requested_date_drift),
            ConstraintDef::new("Requested start drift", Soft, pinning::requested_start_drift),
            ConstraintDef::new("Soft deadline missed", Soft, deadline::soft_deadline_miss),
            ConstraintDef::new(
                "Outside preferred start range (soft)",
                Soft,
                preference::preferred_range_start_soft,
            ),
            ConstraintDef::new(
                "Outside preferred end range (soft)",
                Soft,
                preference::preferred_range_end_soft,
            ),
            ConstraintDef::new("Workload exceeded", Soft, cadence::workload_exceeded),
            ConstraintDef::new(
                "Break quota out of range",
                Soft,
                cadence::break_quota_out_of_range,
            ),
        ];
        Self { defs }
    }

    pub fn defs(&self) -> &[ConstraintDef] {
        &self.defs
    }

    /// Evaluates the schedule from scratch.
    pub fn evaluate(&self, schedule: &Schedule) -> HardMediumSoftScore {
        self.defs.iter().map(|def| def.score(schedule)).sum()
    }

    /// Per-constraint explanation rows; their scores sum to `evaluate`.
    pub fn breakdown(&self, schedule: &Schedule) -> Vec<ConstraintMatchTotal> {
        self.defs
            .iter()
            .map(|def| {
                let matches = def.matches(schedule);
                let score = match def.tier {
                    ScoreTier::Hard => HardMediumSoftScore::of_hard(matches),
                    ScoreTier::Medium => HardMediumSoftScore::of_medium(matches),
                    ScoreTier::Soft => HardMediumSoftScore::of_soft(matches),
                };
                ConstraintMatchTotal {
                    name: def.name,
                    tier: def.tier,
                    matches,
                    score,
                }
            })
            .collect()
    }
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Shared time helpers
// ============================================================================

/// Minutes since midnight of a time of day.
#[inline]
pub(crate) fn minutes_from_midnight(t: NaiveTime) -> i64 {
    t.num_seconds_from_midnight() as i64 / 60
}

/// Signed whole minutes from `a` to `b`.
#[inline]
pub(crate) fn minutes_between(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (b - a).num_minutes()
}

/// Whether the part's assigned slot lies inside the user's working
/// interval for that day. False when unassigned or no interval exists.
pub(crate) fn slot_within_work_time(schedule: &Schedule, part: usize) -> bool {
    let Some(slot) = schedule.slot_of(part) else {
        return false;
    };
    match schedule.user_of(part).work_time_for(slot.day_of_week) {
        Some(wt) => slot.start_time >= wt.start_time && slot.end_time <= wt.end_time,
        None => false,
    }
}

// ============================================================================
// Test fixtures shared by the family modules
// ============================================================================

//! Termination conditions checked at step boundaries.

use std::fmt::Debug;
use std::time::Duration;

use timeweave_core::HardMediumSoftScore;

use crate::config::{ConfigError, SolverConfig};
use crate::scope::SolverScope;

/// Decides when the search loop should stop.
///
/// Implementations may carry internal state, such as a staleness
/// counter, and are polled once per step boundary.
pub trait Termination: Send + Debug {
    fn should_stop(&mut self, scope: &SolverScope) -> bool;
}

// ============================================================================
// Wall-clock time
// ============================================================================

/// Stops once the solve has run for a wall-clock duration.
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

impl Termination for TimeTermination {
    fn should_stop(&mut self, scope: &SolverScope) -> bool {
        scope.elapsed().is_some_and(|spent| spent >= self.limit)
    }
}

// ============================================================================
// Step counting
// ============================================================================

/// Stops after a fixed number of completed steps.
#[derive(Debug, Clone)]
pub struct StepCountTermination {
    limit: u64,
}

impl StepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Termination for StepCountTermination {
    fn should_stop(&mut self, scope: &SolverScope) -> bool {
        scope.step_count() >= self.limit
    }
}

/// Stops when the best score has gone unimproved for N steps in a row.
#[derive(Debug, Clone)]
pub struct UnimprovedStepCountTermination {
    limit: u64,
    last_best: Option<HardMediumSoftScore>,
    stale_steps: u64,
    last_counted_step: Option<u64>,
}

impl UnimprovedStepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self {
            limit: limit.max(1),
            last_best: None,
            stale_steps: 0,
            last_counted_step: None,
        }
    }
}

impl Termination for UnimprovedStepCountTermination {
    fn should_stop(&mut self, scope: &SolverScope) -> bool {
        let step = scope.step_count();
        // Tick the staleness counter at most once per step, however
        // often the composite polls us.
        if self.last_counted_step != Some(step) {
            self.last_counted_step = Some(step);
            match (self.last_best, scope.best_score()) {
                (Some(prev), Some(best)) if best > prev => {
                    self.last_best = Some(best);
                    self.stale_steps = 0;
                }
                (None, Some(best)) => {
                    self.last_best = Some(best);
                    self.stale_steps = 0;
                }
                (Some(_), Some(_)) => self.stale_steps += 1,
                (_, None) => {}
            }
        }
        self.stale_steps >= self.limit
    }
}

// ============================================================================
// Score target
// ============================================================================

/// Stops once the best score reaches a target.
#[derive(Debug, Clone)]
pub struct BestScoreTermination {
    target: HardMediumSoftScore,
}

impl BestScoreTermination {
    pub fn new(target: HardMediumSoftScore) -> Self {
        Self { target }
    }
}

impl Termination for BestScoreTermination {
    fn should_stop(&mut self, scope: &SolverScope) -> bool {
        scope.best_score().is_some_and(|best| best >= self.target)
    }
}

// ============================================================================
// Composition
// ============================================================================

/// Fires when any inner condition fires. Empty means never.
#[derive(Debug, Default)]
pub struct OrTermination {
    inner: Vec<Box<dyn Termination>>,
}

impl OrTermination {
    pub fn new(inner: Vec<Box<dyn Termination>>) -> Self {
        Self { inner }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Termination for OrTermination {
    fn should_stop(&mut self, scope: &SolverScope) -> bool {
        self.inner.iter_mut().any(|t| t.should_stop(scope))
    }
}

/// Builds the step and score terminations a config asks for.
///
/// The wall-clock limit is not included here; the solver owns it
/// directly so a timeout can be reported as its own outcome.
pub fn terminations_from_config(config: &SolverConfig) -> Result<OrTermination, ConfigError> {
    let mut inner: Vec<Box<dyn Termination>> = Vec::new();
    if let Some(term) = &config.termination {
        if let Some(steps) = term.step_count_limit {
            inner.push(Box::new(StepCountTermination::new(steps)));
        }
        if let Some(steps) = term.unimproved_step_count_limit {
            inner.push(Box::new(UnimprovedStepCountTermination::new(steps)));
        }
    }
    if let Some(target) = config.best_score_target()? {
        inner.push(Box::new(BestScoreTermination::new(target)));
    }
    Ok(OrTermination::new(inner))
}

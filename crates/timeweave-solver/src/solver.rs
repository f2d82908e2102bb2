//! Single-run local search solver.
//!
//! A solve run is construction followed by steepest-candidate local
//! search: each step forages a bounded batch of random moves, scores
//! them by full evaluation, lets the acceptor filter them, and commits
//! the best accepted one. The run ends on a termination condition, on
//! convergence, or when the external stop flag is raised.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use timeweave_core::{ConstraintSet, HardMediumSoftScore, Schedule};

use crate::acceptor::{acceptor_from_config, Acceptor};
use crate::config::SolverConfig;
use crate::error::{Result, SolverError};
use crate::moves::{Move, MoveSelector};
use crate::scope::SolverScope;
use crate::termination::{terminations_from_config, OrTermination, Termination, TimeTermination};

/// Why a solve run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveEnd {
    /// A configured termination fired, or no candidate was accepted.
    Terminated,
    /// The wall-clock budget ran out.
    TimedOut,
    /// The external stop flag was raised.
    StoppedEarly,
}

/// A finished solve run.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// The best solution found, rescored from scratch.
    pub schedule: Schedule,
    pub score: HardMediumSoftScore,
    pub end: SolveEnd,
    pub steps: u64,
    pub moves_evaluated: u64,
    pub duration: Duration,
}

type ImprovementCallback = Box<dyn Fn(&Schedule, HardMediumSoftScore) + Send + Sync>;

/// One-shot solver; build it, then call [`Solver::solve`].
pub struct Solver {
    config: SolverConfig,
    constraints: ConstraintSet,
    stop: Arc<AtomicBool>,
    on_improvement: Option<ImprovementCallback>,
}

impl Solver {
    pub fn new(config: SolverConfig, constraints: ConstraintSet) -> Self {
        Self {
            config,
            constraints,
            stop: Arc::new(AtomicBool::new(false)),
            on_improvement: None,
        }
    }

    /// Shares an external stop flag. Raising it ends the run at the
    /// next step boundary with [`SolveEnd::StoppedEarly`].
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Registers a callback fired on every new best solution.
    pub fn with_improvement_callback(
        mut self,
        callback: impl Fn(&Schedule, HardMediumSoftScore) + Send + Sync + 'static,
    ) -> Self {
        self.on_improvement = Some(Box::new(callback));
        self
    }

    /// Handle to the stop flag this solver watches.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Runs construction and local search to completion.
    pub fn solve(self, schedule: Schedule) -> Result<SolveOutcome> {
        let mut scope = match self.config.random_seed {
            Some(seed) => SolverScope::with_seed(schedule, Arc::clone(&self.stop), seed),
            None => SolverScope::new(schedule, Arc::clone(&self.stop)),
        };
        let mut acceptor = acceptor_from_config(self.config.acceptor.as_ref());
        let mut terminations = terminations_from_config(&self.config)?;
        let mut time_limit = TimeTermination::new(self.config.time_limit());

        scope.start_solving();
        info!(
            event = "solve_start",
            parts = scope.working().part_count(),
            timeslots = scope.working().timeslot_count(),
            moves_per_step = self.config.moves_per_step(),
        );

        // Nothing to search over: score what we were given and return.
        if scope.working().part_count() == 0 || scope.working().timeslot_count() == 0 {
            let score = self.constraints.evaluate(scope.working());
            scope.update_best(score);
            return self.finish(scope, SolveEnd::Terminated);
        }

        self.construct(&mut scope, &mut time_limit)?;

        let initial = self.constraints.evaluate(scope.working());
        scope.working_mut().score = Some(initial);
        if scope.update_best(initial) {
            self.report_improvement(&scope, initial);
        }
        acceptor.phase_started(initial);
        debug!(
            event = "construction_done",
            score = %initial,
            unassigned = scope.working().unassigned_count(),
        );

        let end = self.local_search(
            &mut scope,
            acceptor.as_mut(),
            &mut terminations,
            &mut time_limit,
        )?;
        self.finish(scope, end)
    }

    /// Greedy best-fit construction: each unassigned part, in arena
    /// order, goes to the slot that scores best, ties to the first.
    fn construct(&self, scope: &mut SolverScope, time_limit: &mut TimeTermination) -> Result<()> {
        let part_count = scope.working().part_count();
        let slot_count = scope.working().timeslot_count();
        for part in 0..part_count {
            // An interrupted construction leaves the rest unassigned;
            // the search loop ends with the matching reason.
            if scope.stop_requested() || time_limit.should_stop(scope) {
                return Ok(());
            }
            if scope.working().parts[part].timeslot.is_some() {
                continue;
            }
            let mut best: Option<(usize, HardMediumSoftScore)> = None;
            for slot in 0..slot_count {
                set_slot(scope.working_mut(), part, Some(slot))?;
                let score = self.constraints.evaluate(scope.working());
                scope.record_move_evaluated();
                if best.map_or(true, |(_, b)| score > b) {
                    best = Some((slot, score));
                }
            }
            if let Some((slot, _)) = best {
                set_slot(scope.working_mut(), part, Some(slot))?;
            }
        }
        Ok(())
    }

    fn local_search(
        &self,
        scope: &mut SolverScope,
        acceptor: &mut dyn Acceptor,
        terminations: &mut OrTermination,
        time_limit: &mut TimeTermination,
    ) -> Result<SolveEnd> {
        let selector = MoveSelector::new();
        let forage = self.config.moves_per_step();
        let mut last_step_score = match scope.working().score {
            Some(score) => score,
            None => self.constraints.evaluate(scope.working()),
        };

        loop {
            if scope.stop_requested() {
                return Ok(SolveEnd::StoppedEarly);
            }
            if time_limit.should_stop(scope) {
                return Ok(SolveEnd::TimedOut);
            }
            if !terminations.is_empty() && terminations.should_stop(scope) {
                return Ok(SolveEnd::Terminated);
            }

            // Forage a batch of candidates; the best accepted one wins,
            // ties going to the earliest draw.
            let mut chosen: Option<(Move, HardMediumSoftScore)> = None;
            for _ in 0..forage {
                let (working, rng) = scope.working_and_rng();
                let Some(candidate) = selector.sample(working, rng) else {
                    break;
                };
                if !candidate.is_doable(scope.working()) {
                    continue;
                }
                let inverse = apply_move(scope.working_mut(), candidate)?;
                let score = self.constraints.evaluate(scope.working());
                scope.record_move_evaluated();
                let accepted = acceptor.is_accepted(last_step_score, score, scope.rng());
                if accepted && chosen.map_or(true, |(_, best)| score > best) {
                    chosen = Some((candidate, score));
                }
                apply_move(scope.working_mut(), inverse)?;
            }

            let Some((step_move, step_score)) = chosen else {
                debug!(event = "converged", step = scope.step_count());
                return Ok(SolveEnd::Terminated);
            };

            apply_move(scope.working_mut(), step_move)?;
            scope.working_mut().score = Some(step_score);
            let step = scope.increment_step();
            acceptor.step_ended(step_score);
            last_step_score = step_score;

            if scope.update_best(step_score) {
                debug!(event = "new_best", step, score = %step_score);
                self.report_improvement(scope, step_score);
            }
        }
    }

    fn report_improvement(&self, scope: &SolverScope, score: HardMediumSoftScore) {
        if let Some(callback) = &self.on_improvement {
            if let Some(best) = scope.best() {
                callback(best, score);
            }
        }
    }

    /// Rescores the returned schedule from scratch; the tracked best
    /// must reproduce exactly under a fresh evaluation.
    fn finish(&self, scope: SolverScope, end: SolveEnd) -> Result<SolveOutcome> {
        let steps = scope.step_count();
        let moves_evaluated = scope.moves_evaluated();
        let duration = scope.elapsed().unwrap_or_default();
        let tracked = scope.best_score();
        let mut schedule = scope.take_best_or_working();

        let actual = self.constraints.evaluate(&schedule);
        if let Some(tracked) = tracked {
            if tracked != actual {
                return Err(SolverError::ScoreCorruption { tracked, actual });
            }
        }
        schedule.score = Some(actual);

        info!(
            event = "solve_end",
            end = ?end,
            score = %actual,
            steps,
            moves_evaluated,
            duration_ms = duration.as_millis() as u64,
        );

        Ok(SolveOutcome {
            schedule,
            score: actual,
            end,
            steps,
            moves_evaluated,
            duration,
        })
    }
}

fn set_slot(schedule: &mut Schedule, part: usize, slot: Option<usize>) -> Result<()> {
    schedule
        .set_timeslot(part, slot)
        .map_err(|e| SolverError::Internal(e.to_string()))
}

fn apply_move(schedule: &mut Schedule, mv: Move) -> Result<Move> {
    mv.apply(schedule)
        .map_err(|e| SolverError::Internal(format!("{mv}: {e}")))
}

//! Solver-level scope: working schedule, best snapshot and counters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use timeweave_core::{HardMediumSoftScore, Schedule};

/// Top-level state for one solve run.
///
/// Owns the working schedule, the best snapshot with its score, the
/// random source and the counters the terminations read.
pub struct SolverScope {
    working: Schedule,
    best: Option<Schedule>,
    best_score: Option<HardMediumSoftScore>,
    rng: StdRng,
    start_time: Option<Instant>,
    step_count: u64,
    moves_evaluated: u64,
    stop: Arc<AtomicBool>,
}

impl SolverScope {
    /// Creates a scope seeded from OS entropy.
    pub fn new(working: Schedule, stop: Arc<AtomicBool>) -> Self {
        Self::build(working, stop, StdRng::from_os_rng())
    }

    /// Creates a scope with a fixed seed for reproducible runs.
    pub fn with_seed(working: Schedule, stop: Arc<AtomicBool>, seed: u64) -> Self {
        Self::build(working, stop, StdRng::seed_from_u64(seed))
    }

    fn build(working: Schedule, stop: Arc<AtomicBool>, rng: StdRng) -> Self {
        Self {
            working,
            best: None,
            best_score: None,
            rng,
            start_time: None,
            step_count: 0,
            moves_evaluated: 0,
            stop,
        }
    }

    pub fn start_solving(&mut self) {
        self.start_time = Some(Instant::now());
        self.step_count = 0;
        self.moves_evaluated = 0;
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|t| t.elapsed())
    }

    #[inline]
    pub fn working(&self) -> &Schedule {
        &self.working
    }

    #[inline]
    pub fn working_mut(&mut self) -> &mut Schedule {
        &mut self.working
    }

    /// Split borrow for move sampling: the schedule read-only, the
    /// random source mutably.
    #[inline]
    pub fn working_and_rng(&mut self) -> (&Schedule, &mut StdRng) {
        (&self.working, &mut self.rng)
    }

    #[inline]
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn best(&self) -> Option<&Schedule> {
        self.best.as_ref()
    }

    pub fn best_score(&self) -> Option<HardMediumSoftScore> {
        self.best_score
    }

    /// Snapshots the working schedule as the new best when `score` beats
    /// the best seen so far. Returns whether it did.
    pub fn update_best(&mut self, score: HardMediumSoftScore) -> bool {
        let improved = match self.best_score {
            None => true,
            Some(best) => score > best,
        };
        if improved {
            self.working.score = Some(score);
            self.best = Some(self.working.clone());
            self.best_score = Some(score);
        }
        improved
    }

    pub fn increment_step(&mut self) -> u64 {
        self.step_count += 1;
        self.step_count
    }

    #[inline]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn record_move_evaluated(&mut self) {
        self.moves_evaluated += 1;
    }

    #[inline]
    pub fn moves_evaluated(&self) -> u64 {
        self.moves_evaluated
    }

    /// Whether the cooperative stop flag has been raised.
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Consumes the scope, yielding the best snapshot or, before any
    /// snapshot exists, the working schedule.
    pub fn take_best_or_working(self) -> Schedule {
        self.best.unwrap_or(self.working)
    }
}

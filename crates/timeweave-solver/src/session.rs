//! Concurrent solve sessions over a shared service.
//!
//! A [`SolverService`] runs at most one live solve per session id, each
//! on its own worker thread. Progress flows out through a
//! [`SolveReporter`]; control flows in through [`SolverService::stop`],
//! which raises the session's stop flag and never blocks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::{info, warn};

use timeweave_core::{ConstraintSet, HardMediumSoftScore, Schedule, ScheduleFacts};

use crate::config::SolverConfig;
use crate::error::{Result, SolverError};
use crate::solver::{SolveEnd, SolveOutcome, Solver};

/// Lifecycle state of a session as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No session with this id was ever started.
    NotFound,
    Running,
    /// The solve finished on a termination condition or by converging.
    Terminated,
    TimedOut,
    StoppedEarly,
    /// The worker failed; the session produced no trustworthy result.
    Failed,
}

/// Terminal report for a session, delivered exactly once.
#[derive(Debug)]
pub enum SolveEnded {
    Finished(SolveOutcome),
    Failed(String),
}

/// Receives session progress from worker threads.
///
/// `solution_improved` may fire many times; `solve_ended` fires once
/// per started session, after which the session is quiet.
pub trait SolveReporter: Send + Sync {
    fn solution_improved(&self, session_id: &str, schedule: &Schedule, score: HardMediumSoftScore);

    fn solve_ended(&self, session_id: &str, ended: SolveEnded);
}

type ConstraintFactory = Box<dyn Fn() -> ConstraintSet + Send + Sync>;

struct SessionState {
    status: SessionStatus,
    best: Option<Schedule>,
    best_score: Option<HardMediumSoftScore>,
}

struct Session {
    stop: Arc<AtomicBool>,
    state: Arc<Mutex<SessionState>>,
    handle: Option<JoinHandle<()>>,
}

impl Session {
    fn is_active(&self) -> bool {
        self.state.lock().status == SessionStatus::Running
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

/// Manages named solve sessions, one worker thread per live session.
pub struct SolverService {
    constraint_factory: ConstraintFactory,
    config: SolverConfig,
    reporter: Arc<dyn SolveReporter>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SolverService {
    /// Service using the standard constraint registry.
    pub fn new(config: SolverConfig, reporter: Arc<dyn SolveReporter>) -> Self {
        Self::with_constraints(config, reporter, ConstraintSet::standard)
    }

    /// Service with a custom registry; each session gets a fresh set
    /// from the factory.
    pub fn with_constraints(
        config: SolverConfig,
        reporter: Arc<dyn SolveReporter>,
        factory: impl Fn() -> ConstraintSet + Send + Sync + 'static,
    ) -> Self {
        Self {
            constraint_factory: Box::new(factory),
            config,
            reporter,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Validates the facts and spawns a worker solving them.
    ///
    /// A rejected fact set leaves no session behind. Starting over a
    /// finished session replaces it; starting over a live one is
    /// refused with [`SolverError::SessionActive`].
    pub fn start(&self, session_id: &str, facts: ScheduleFacts) -> Result<()> {
        let schedule = Schedule::from_facts(facts)?;

        let mut sessions = self.sessions.lock();
        if let Some(existing) = sessions.get(session_id) {
            if existing.is_active() {
                return Err(SolverError::SessionActive {
                    session_id: session_id.to_string(),
                });
            }
        }

        let stop = Arc::new(AtomicBool::new(false));
        let state = Arc::new(Mutex::new(SessionState {
            status: SessionStatus::Running,
            best: None,
            best_score: None,
        }));

        let callback_state = Arc::clone(&state);
        let callback_reporter = Arc::clone(&self.reporter);
        let callback_id = session_id.to_string();
        let solver = Solver::new(self.config.clone(), (self.constraint_factory)())
            .with_stop_flag(Arc::clone(&stop))
            .with_improvement_callback(move |schedule, score| {
                {
                    let mut state = callback_state.lock();
                    state.best = Some(schedule.clone());
                    state.best_score = Some(score);
                }
                // State lock released; the reporter may block freely.
                callback_reporter.solution_improved(&callback_id, schedule, score);
            });

        let worker_id = session_id.to_string();
        let worker_state = Arc::clone(&state);
        let worker_reporter = Arc::clone(&self.reporter);
        let handle = std::thread::spawn(move || {
            run_session(worker_id, solver, schedule, worker_state, worker_reporter);
        });

        sessions.insert(
            session_id.to_string(),
            Session {
                stop,
                state,
                handle: Some(handle),
            },
        );
        info!(event = "session_started", session_id = %session_id);
        Ok(())
    }

    /// Raises the session's stop flag.
    ///
    /// Idempotent; unknown ids and already-ended sessions are no-ops.
    /// The worker winds down at its next step boundary.
    pub fn stop(&self, session_id: &str) {
        let sessions = self.sessions.lock();
        if let Some(session) = sessions.get(session_id) {
            session.stop.store(true, Ordering::SeqCst);
            info!(event = "session_stop_requested", session_id = %session_id);
        }
    }

    pub fn status(&self, session_id: &str) -> SessionStatus {
        let sessions = self.sessions.lock();
        match sessions.get(session_id) {
            None => SessionStatus::NotFound,
            Some(session) => {
                let mut state = session.state.lock();
                // A worker that died without reporting leaves Running
                // behind; a finished handle unmasks it.
                if state.status == SessionStatus::Running
                    && session.handle.as_ref().is_some_and(|h| h.is_finished())
                {
                    state.status = SessionStatus::Failed;
                }
                state.status
            }
        }
    }

    /// Latest best solution the session has produced, if any.
    pub fn best_schedule(&self, session_id: &str) -> Option<Schedule> {
        let sessions = self.sessions.lock();
        sessions
            .get(session_id)
            .and_then(|s| s.state.lock().best.clone())
    }

    pub fn best_score(&self, session_id: &str) -> Option<HardMediumSoftScore> {
        let sessions = self.sessions.lock();
        sessions
            .get(session_id)
            .and_then(|s| s.state.lock().best_score)
    }

    /// Blocks until the session's worker exits.
    ///
    /// Unknown or already-joined sessions return immediately.
    pub fn join(&self, session_id: &str) {
        let handle = {
            let mut sessions = self.sessions.lock();
            sessions
                .get_mut(session_id)
                .and_then(|s| s.handle.take())
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                if let Some(session) = self.sessions.lock().get(session_id) {
                    session.state.lock().status = SessionStatus::Failed;
                }
            }
        }
    }
}

fn run_session(
    session_id: String,
    solver: Solver,
    schedule: Schedule,
    state: Arc<Mutex<SessionState>>,
    reporter: Arc<dyn SolveReporter>,
) {
    match solver.solve(schedule) {
        Ok(outcome) => {
            let status = match outcome.end {
                SolveEnd::Terminated => SessionStatus::Terminated,
                SolveEnd::TimedOut => SessionStatus::TimedOut,
                SolveEnd::StoppedEarly => SessionStatus::StoppedEarly,
            };
            {
                let mut state = state.lock();
                state.status = status;
                state.best = Some(outcome.schedule.clone());
                state.best_score = Some(outcome.score);
            }
            info!(
                event = "session_ended",
                session_id = %session_id,
                status = ?status,
                score = %outcome.score,
            );
            reporter.solve_ended(&session_id, SolveEnded::Finished(outcome));
        }
        Err(e) => {
            state.lock().status = SessionStatus::Failed;
            warn!(event = "session_failed", session_id = %session_id, error = %e);
            reporter.solve_ended(&session_id, SolveEnded::Failed(e.to_string()));
        }
    }
}

//! TimeWeave Solver - local search and solve sessions for calendar solving
//!
//! This crate turns a validated `timeweave_core::Schedule` into a solved
//! one:
//! - TOML-backed solver configuration with builder overrides
//! - Greedy construction plus steepest-candidate local search over the
//!   reassign/swap move catalog
//! - Pluggable acceptance (hill climbing, late acceptance, simulated
//!   annealing) and termination conditions
//! - A session manager running named solves on worker threads with
//!   cooperative stop and exactly-once end reporting

pub mod acceptor;
pub mod config;
pub mod error;
pub mod moves;
pub mod scope;
pub mod session;
pub mod solver;
pub mod termination;

pub use acceptor::{
    acceptor_from_config, Acceptor, HillClimbingAcceptor, LateAcceptanceAcceptor,
    SimulatedAnnealingAcceptor,
};
pub use config::{AcceptorConfig, ConfigError, SolverConfig, TerminationConfig};
pub use error::{Result, SolverError};
pub use moves::{Move, MoveSelector};
pub use scope::SolverScope;
pub use session::{SessionStatus, SolveEnded, SolveReporter, SolverService};
pub use solver::{SolveEnd, SolveOutcome, Solver};
pub use termination::{
    terminations_from_config, BestScoreTermination, OrTermination, StepCountTermination,
    Termination, TimeTermination, UnimprovedStepCountTermination,
};

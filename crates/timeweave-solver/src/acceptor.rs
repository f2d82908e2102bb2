//! Acceptance policies for local search moves.
//!
//! An acceptor decides whether a candidate score may become the next
//! step, given the last step's score. Different policies trade greed
//! against the ability to escape local optima.

use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::Rng;

use timeweave_core::HardMediumSoftScore;

use crate::config::{AcceptorConfig, DEFAULT_LATE_ACCEPTANCE_SIZE};

/// Decides move acceptance during the local search phase.
pub trait Acceptor: Send + Debug {
    /// Called once before the first step with the starting score.
    fn phase_started(&mut self, _initial_score: HardMediumSoftScore) {}

    /// Whether a move resulting in `candidate` should be accepted, given
    /// the previous step's score.
    fn is_accepted(
        &mut self,
        last_step_score: HardMediumSoftScore,
        candidate: HardMediumSoftScore,
        rng: &mut StdRng,
    ) -> bool;

    /// Called when a step ends with an accepted move.
    fn step_ended(&mut self, _step_score: HardMediumSoftScore) {}
}

/// Builds the configured acceptor, defaulting to late acceptance.
pub fn acceptor_from_config(config: Option<&AcceptorConfig>) -> Box<dyn Acceptor> {
    match config {
        Some(AcceptorConfig::HillClimbing) => Box::new(HillClimbingAcceptor::new()),
        Some(AcceptorConfig::LateAcceptance {
            late_acceptance_size,
        }) => Box::new(LateAcceptanceAcceptor::new(
            late_acceptance_size.unwrap_or(DEFAULT_LATE_ACCEPTANCE_SIZE),
        )),
        Some(AcceptorConfig::SimulatedAnnealing {
            starting_temperature,
            decay,
        }) => {
            let defaults = SimulatedAnnealingAcceptor::default();
            Box::new(SimulatedAnnealingAcceptor::new(
                starting_temperature.unwrap_or(defaults.starting_temperature),
                decay.unwrap_or(defaults.decay),
            ))
        }
        None => Box::new(LateAcceptanceAcceptor::default()),
    }
}

/// Accepts only moves at least as good as the last step.
///
/// The simplest policy; it can get stuck in local optima.
#[derive(Debug, Clone, Default)]
pub struct HillClimbingAcceptor;

impl HillClimbingAcceptor {
    pub fn new() -> Self {
        Self
    }
}

impl Acceptor for HillClimbingAcceptor {
    fn is_accepted(
        &mut self,
        last_step_score: HardMediumSoftScore,
        candidate: HardMediumSoftScore,
        _rng: &mut StdRng,
    ) -> bool {
        candidate >= last_step_score
    }
}

/// Accepts moves that improve on the score from N steps ago.
///
/// Keeps a circular buffer of recent step scores; a candidate passes
/// when it beats either the buffer head or the last step.
#[derive(Debug, Clone)]
pub struct LateAcceptanceAcceptor {
    history: Vec<HardMediumSoftScore>,
    size: usize,
    index: usize,
}

impl LateAcceptanceAcceptor {
    pub fn new(size: usize) -> Self {
        Self {
            history: Vec::new(),
            size: size.max(1),
            index: 0,
        }
    }
}

impl Default for LateAcceptanceAcceptor {
    fn default() -> Self {
        Self::new(DEFAULT_LATE_ACCEPTANCE_SIZE)
    }
}

impl Acceptor for LateAcceptanceAcceptor {
    fn phase_started(&mut self, initial_score: HardMediumSoftScore) {
        self.history = vec![initial_score; self.size];
        self.index = 0;
    }

    fn is_accepted(
        &mut self,
        last_step_score: HardMediumSoftScore,
        candidate: HardMediumSoftScore,
        _rng: &mut StdRng,
    ) -> bool {
        if candidate >= last_step_score {
            return true;
        }
        match self.history.get(self.index) {
            Some(&late) => candidate >= late,
            // Phase not started: nothing historical to compare against.
            None => true,
        }
    }

    fn step_ended(&mut self, step_score: HardMediumSoftScore) {
        if self.history.is_empty() {
            return;
        }
        self.history[self.index] = step_score;
        self.index = (self.index + 1) % self.history.len();
    }
}

/// Accepts worse moves with a temperature-scaled probability.
///
/// The probability reads the delta of the worst tier that got worse, so
/// a hard regression is far less likely to pass than a soft one at the
/// same temperature. The temperature decays geometrically per step.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealingAcceptor {
    starting_temperature: f64,
    current_temperature: f64,
    decay: f64,
}

impl SimulatedAnnealingAcceptor {
    pub fn new(starting_temperature: f64, decay: f64) -> Self {
        Self {
            starting_temperature,
            current_temperature: starting_temperature,
            decay,
        }
    }

    #[cfg(test)]
    fn temperature(&self) -> f64 {
        self.current_temperature
    }
}

impl Default for SimulatedAnnealingAcceptor {
    fn default() -> Self {
        Self::new(2.0, 0.98)
    }
}

impl Acceptor for SimulatedAnnealingAcceptor {
    fn phase_started(&mut self, _initial_score: HardMediumSoftScore) {
        self.current_temperature = self.starting_temperature;
    }

    fn is_accepted(
        &mut self,
        last_step_score: HardMediumSoftScore,
        candidate: HardMediumSoftScore,
        rng: &mut StdRng,
    ) -> bool {
        if candidate >= last_step_score {
            return true;
        }
        if self.current_temperature <= f64::EPSILON {
            return false;
        }
        let delta = candidate - last_step_score;
        // For a worse candidate the first differing tier is negative;
        // earlier tiers are equal by lexicographic comparison.
        let magnitude = if delta.hard() < 0 {
            delta.hard()
        } else if delta.medium() < 0 {
            delta.medium()
        } else {
            delta.soft()
        };
        let probability = (magnitude as f64 / self.current_temperature).exp();
        rng.random::<f64>() < probability
    }

    fn step_ended(&mut self, _step_score: HardMediumSoftScore) {
        self.current_temperature *= self.decay;
    }
}

//! The probabilistic fault gates.
//!
//! Fault injection shares its code path with normal operation: every run
//! carries four gate probabilities (usually all zero) and draws them from an
//! injectable RNG so chaos tests and unit tests can script outcomes.

use data_types::{FaultProbability, RunRequest};
use rand::prelude::*;

/// The four gate probabilities of one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultConfig {
    /// Probability of skipping the fetch, simulating an upstream API failure.
    pub api_error: FaultProbability,
    /// Probability of skipping the blob write, simulating a store failure.
    pub gcs_error: FaultProbability,
    /// Probability of discarding each individual record.
    pub row_drop: FaultProbability,
    /// Probability of sleeping before the blob write.
    pub delay: FaultProbability,
}

impl From<&RunRequest> for FaultConfig {
    fn from(request: &RunRequest) -> Self {
        Self {
            api_error: request.api_error_prob,
            gcs_error: request.gcs_error_prob,
            row_drop: request.row_drop_prob,
            delay: request.delay_prob,
        }
    }
}

/// Draws the fault gates for one run.
///
/// Draw order within a chunk is fixed: fetch gate, then one draw per fetched
/// record, then store-write gate, then delay gate. A zero probability consumes
/// no draw. Scripted-RNG tests rely on both facts.
pub struct FaultGates {
    config: FaultConfig,
    rng: Box<dyn RngCore + Send>,
}

impl std::fmt::Debug for FaultGates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultGates")
            .field("config", &self.config)
            .finish()
    }
}

impl FaultGates {
    /// Gates drawing from the thread's entropy source.
    pub fn new(config: FaultConfig) -> Self {
        Self::with_rng(config, Box::new(StdRng::from_entropy()))
    }

    /// Gates drawing from the provided `rng`.
    pub fn with_rng(config: FaultConfig, rng: Box<dyn RngCore + Send>) -> Self {
        Self { config, rng }
    }

    fn fire(&mut self, probability: FaultProbability) -> bool {
        if probability.is_zero() {
            return false;
        }
        self.rng.gen::<f64>() < probability.get()
    }

    /// Should this chunk's fetch be skipped?
    pub fn skip_fetch(&mut self) -> bool {
        self.fire(self.config.api_error)
    }

    /// Should this record be discarded?
    pub fn drop_row(&mut self) -> bool {
        self.fire(self.config.row_drop)
    }

    /// Should this chunk's blob write be skipped?
    pub fn skip_store_write(&mut self) -> bool {
        self.fire(self.config.gcs_error)
    }

    /// Should the injected delay be applied to this chunk?
    pub fn inject_delay(&mut self) -> bool {
        self.fire(self.config.delay)
    }
}

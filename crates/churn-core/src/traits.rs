//! Trait interfaces for the Churn simulator.
//!
//! [`Mixer`] is the contract between the simulator and a mixing strategy:
//! the simulator feeds per-user input groups and consumes per-user output
//! groups without knowing how the outputs were chosen.

use crate::error::MixError;
use crate::fee::FeeParams;

/// A CoinJoin mixing strategy.
///
/// Implementations take `&mut self`: mixing a round may populate internal
/// caches and per-round state. One instance must only serve one round at a
/// time; independent rounds get independent instances.
pub trait Mixer {
    /// Fee parameters this mixer charges.
    fn fees(&self) -> FeeParams;

    /// Produce one participant's outputs.
    ///
    /// `others_inputs` is the concatenation of every other participant's
    /// inputs; strategies may use it for context or ignore it.
    fn mix(&mut self, my_inputs: &[u64], others_inputs: &[u64]) -> Result<Vec<u64>, MixError>;

    /// Mix a whole round: one output group per input group, same order.
    fn complete_mix(&mut self, inputs: &[Vec<u64>]) -> Result<Vec<Vec<u64>>, MixError>;
}

//! Fee model: flat fee rate over per-input and per-output weights.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FEE_RATE, DEFAULT_INPUT_SIZE, DEFAULT_OUTPUT_SIZE};

/// Fee parameters of one mixing round. Constant per engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParams {
    /// Fee rate in sats per weight unit.
    pub fee_rate: u32,
    /// Weight units consumed by one input.
    pub input_size: u32,
    /// Weight units consumed by one output.
    pub output_size: u32,
}

impl FeeParams {
    pub fn new(fee_rate: u32, input_size: u32, output_size: u32) -> Self {
        Self { fee_rate, input_size, output_size }
    }

    /// Fee charged for spending one input, in sats.
    pub fn input_fee(&self) -> u64 {
        self.input_size as u64 * self.fee_rate as u64
    }

    /// Fee charged for creating one output, in sats.
    pub fn output_fee(&self) -> u64 {
        self.output_size as u64 * self.fee_rate as u64
    }
}

impl Default for FeeParams {
    fn default() -> Self {
        Self::new(DEFAULT_FEE_RATE, DEFAULT_INPUT_SIZE, DEFAULT_OUTPUT_SIZE)
    }
}

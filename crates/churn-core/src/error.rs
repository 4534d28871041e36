//! Error types for the Churn simulator.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MixError {
    #[error("invalid decomposition: target {target}, sum {sum}, diff {diff}")] InvalidDecomposition { target: i64, sum: i64, diff: i64 },
    #[error("fees not paid: outputs {outputs} >= inputs {inputs}")] FeeInsolvency { inputs: u64, outputs: u64 },
    #[error("value overflow")] ArithmeticOverflow,
}

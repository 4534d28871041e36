//! # churn-mixer — denomination decomposition engine.
//!
//! All value arithmetic is integer-only for determinism.
//!
//! This crate implements the amount-decomposition search and selection
//! engine at the heart of the simulator:
//! - **Decomposition search**: depth-bounded enumeration of short
//!   denomination sequences summing close to a target, pruned with an
//!   ordered index search and memoized per target.
//! - **Bit-packed candidates**: up to 8 denomination-table indices packed
//!   one byte each into a `u64`, giving a compact hashable encoding.
//! - **Scoring and selection**: candidates are ranked against a round-wide
//!   denomination-popularity histogram, trading output count, popularity,
//!   and closeness to target.
//! - **Batch coordination**: a two-phase round (build histogram from every
//!   participant, then select per participant) with a fee-solvency
//!   post-condition.

pub mod decompose;
pub mod denomination;
pub mod mixer;

pub use decompose::{Candidate, Decomposer, search_combinations};
pub use denomination::{denoms_for, denoms_for_table};
pub use mixer::DecomposeMixer;

//! # churn-core
//! Foundation types and traits for the Churn CoinJoin simulator.

pub mod amount;
pub mod constants;
pub mod error;
pub mod fee;
pub mod traits;

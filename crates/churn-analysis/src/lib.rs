//! # churn-analysis
//!
//! Privacy metrics over mixed rounds. Every function consumes participant
//! groups as plain `&[Vec<u64>]`, so the engine and the simulator stay
//! decoupled from the metric definitions.
//!
//! The anonymity set of a coin is the number of coins in the round
//! (itself included) carrying its exact value. A round with perfect value
//! uniformity gives every coin an anonymity set equal to the coin count;
//! a round of all-distinct values gives every coin an anonymity set of 1.

use std::collections::HashMap;

/// Mean anonymity set across every coin in the round.
///
/// Returns 0.0 for an empty round.
pub fn average_anonymity_set(groups: &[Vec<u64>]) -> f64 {
    let mut counts: HashMap<u64, u64> = HashMap::new();
    let mut total = 0u64;
    for amount in groups.iter().flatten() {
        *counts.entry(*amount).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    // Each coin's anonymity set is its value's multiplicity, so the mean
    // is the sum of squared multiplicities over the coin count.
    let weighted: u64 = counts.values().map(|&c| c * c).sum();
    weighted as f64 / total as f64
}

/// How much anonymity the round bought: output-side average minus
/// input-side average.
pub fn anonymity_gain(inputs: &[Vec<u64>], outputs: &[Vec<u64>]) -> f64 {
    average_anonymity_set(outputs) - average_anonymity_set(inputs)
}

/// Anonymity gain per 1000 weight units of transaction size.
///
/// Returns 0.0 for a zero-size transaction.
pub fn blockspace_efficiency(inputs: &[Vec<u64>], outputs: &[Vec<u64>], tx_size: u64) -> f64 {
    if tx_size == 0 {
        return 0.0;
    }
    anonymity_gain(inputs, outputs) / (tx_size as f64 / 1_000.0)
}

/// Anonymity gain per 100_000 sats of fee paid.
///
/// Returns 0.0 for a free round rather than dividing by zero.
pub fn privacy_efficiency(inputs: &[Vec<u64>], outputs: &[Vec<u64>], fee: u64) -> f64 {
    if fee == 0 {
        return 0.0;
    }
    anonymity_gain(inputs, outputs) / (fee as f64 / 100_000.0)
}

/// Outputs whose value is not in the given denomination table.
///
/// The table holds raw face values; change and toleranced leftovers show
/// up here.
pub fn non_standard_outputs(groups: &[Vec<u64>], denoms: &[i64]) -> usize {
    groups
        .iter()
        .flatten()
        .filter(|&&amount| {
            i64::try_from(amount).map_or(true, |v| !denoms.contains(&v))
        })
        .count()
}

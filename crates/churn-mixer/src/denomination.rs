//! Fee-inclusive views of the standard denomination table.
//!
//! The search and the selector both work on fee-inclusive values: a
//! denomination costs its face value plus the per-output fee charged to
//! include it in the transaction. The view depends on the target, so it is
//! recomputed per participant.

use churn_core::constants::STD_DENOMS;

/// Denominations usable for `target`, fee-inclusive, descending.
///
/// Filters the standard table to entries whose fee-inclusive value fits
/// under `target`, then drops the largest fitting one, so the head of the
/// returned list always leaves headroom below the target. Empty when the
/// target is at or below the smallest usable value (including any
/// `target <= 0`).
pub fn denoms_for(target: i64, output_fee: i64) -> Vec<i64> {
    denoms_for_table(&STD_DENOMS, target, output_fee)
}

/// [`denoms_for`] over an arbitrary descending denomination table.
pub fn denoms_for_table(table: &[i64], target: i64, output_fee: i64) -> Vec<i64> {
    table
        .iter()
        .map(|&d| d + output_fee)
        .skip_while(|&v| v > target)
        .skip(1)
        .collect()
}

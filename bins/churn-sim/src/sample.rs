//! Seeded sampling of input amounts and participant groupings.

use rand::Rng;

/// Smallest sampled coin, in sats.
pub const MIN_AMOUNT: u64 = 5_000;
/// Largest sampled coin, in sats (10 BTC).
pub const MAX_AMOUNT: u64 = 1_000_000_000;

/// One log-uniform amount in `[MIN_AMOUNT, MAX_AMOUNT]`.
///
/// Log-uniform matches the heavy small-coin skew of real wallet balances
/// far better than a uniform draw would.
pub fn sample_amount<R: Rng>(rng: &mut R) -> u64 {
    let lo = (MIN_AMOUNT as f64).ln();
    let hi = (MAX_AMOUNT as f64).ln();
    let amount = rng.gen_range(lo..=hi).exp() as u64;
    amount.clamp(MIN_AMOUNT, MAX_AMOUNT)
}

pub fn sample_amounts<R: Rng>(rng: &mut R, count: usize) -> Vec<u64> {
    (0..count).map(|_| sample_amount(rng)).collect()
}

/// `count` elements of `pool`, drawn with replacement.
pub fn random_elements<R: Rng>(rng: &mut R, pool: &[u64], count: usize) -> Vec<u64> {
    if pool.is_empty() {
        return Vec::new();
    }
    (0..count).map(|_| pool[rng.gen_range(0..pool.len())]).collect()
}

/// Random partition of `amounts` into `groups` bins.
///
/// Every amount lands in exactly one bin; a bin may come out empty when
/// there are more groups than amounts.
pub fn random_groups<R: Rng>(rng: &mut R, amounts: &[u64], groups: usize) -> Vec<Vec<u64>> {
    if groups == 0 {
        return Vec::new();
    }
    let mut out = vec![Vec::new(); groups];
    for &amount in amounts {
        out[rng.gen_range(0..groups)].push(amount);
    }
    out
}

//! Decomposition search: express a target sum as a short sequence of
//! fee-inclusive denominations.
//!
//! The search is a depth-bounded recursion over the descending
//! denomination view. Two devices keep the exponential branching
//! tractable: the next index is found with a binary search restricted to
//! indices at or after the current one (indices are monotone
//! non-decreasing within one candidate, so permutations are never
//! enumerated twice), and a branch is cut as soon as even the maximum
//! remaining picks of the current denomination cannot reach the target
//! within tolerance.
//!
//! Results are memoized per target, for the lifetime of the owning
//! [`Decomposer`].

use std::collections::HashMap;

use churn_core::constants::{
    BASE_TOLERANCE, FIRST_PASS_CAP, MAX_DECOMPOSITION_LEN, RETRY_CAP, SEARCH_CAP, TOLERANCE_STEP,
};

use crate::denomination::denoms_for;

/// One candidate decomposition of a target sum.
///
/// `encoding` packs the chosen denomination-table indices one byte each:
/// the most recent pick sits in the least-significant byte, the first pick
/// in byte `count - 1`. Unused high bytes are zero, so the encoding doubles
/// as a compact hash/equality key for the ordered multiset of indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Total fee-inclusive value, in sats.
    pub sum: i64,
    /// Number of denominations used, 1..=8.
    pub count: u8,
    /// Packed denomination-table indices.
    pub encoding: u64,
}

impl Candidate {
    /// Packed table index at `byte` (byte 0 holds the last pick).
    pub fn index_at(&self, byte: usize) -> u8 {
        ((self.encoding >> (8 * byte)) & 0xff) as u8
    }

    /// Indices in pick order, first pick first.
    pub fn indices(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.count as usize).rev().map(|byte| self.index_at(byte))
    }
}

/// Memoizing decomposition search engine.
///
/// The cache is keyed by target only: the per-output fee is fixed for the
/// lifetime of an engine instance. The cache grows monotonically and is
/// never evicted; it is dropped with the engine. One instance must not be
/// shared across concurrently running rounds.
#[derive(Debug, Default)]
pub struct Decomposer {
    cache: HashMap<i64, Vec<Candidate>>,
}

impl Decomposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate decompositions for `target`, cached.
    ///
    /// Starts at [`BASE_TOLERANCE`] and relaxes the tolerance by
    /// [`TOLERANCE_STEP`] until the search yields at least one candidate.
    /// An empty result (target at or below the smallest usable
    /// denomination) is a valid outcome and is cached as such.
    ///
    /// The returned list deliberately repeats the inner search output,
    /// cycled across the table length and truncated to the pass cap:
    /// duplicate encodings reaching the scorer trigger its
    /// points-doubling rule.
    pub fn decompose(&mut self, target: i64, output_fee: i64) -> &[Candidate] {
        self.cache
            .entry(target)
            .or_insert_with(|| decompose_uncached(target, output_fee))
    }

    /// Number of distinct targets decomposed so far.
    pub fn cached_targets(&self) -> usize {
        self.cache.len()
    }
}

fn decompose_uncached(target: i64, output_fee: i64) -> Vec<Candidate> {
    let denoms = denoms_for(target, output_fee);
    if denoms.is_empty() {
        return Vec::new();
    }

    let mut tolerance = BASE_TOLERANCE;
    let mut cap = FIRST_PASS_CAP;
    let mut inner = search_combinations(&denoms, target, tolerance, MAX_DECOMPOSITION_LEN);
    while inner.is_empty() {
        // Guaranteed to terminate: tolerance eventually exceeds the gap
        // left after a single largest pick.
        tolerance += TOLERANCE_STEP;
        cap = RETRY_CAP;
        inner = search_combinations(&denoms, target, tolerance, MAX_DECOMPOSITION_LEN);
    }

    cycle_to_cap(&inner, denoms.len(), cap)
}

fn cycle_to_cap(inner: &[Candidate], table_len: usize, cap: usize) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(cap.min(inner.len().saturating_mul(table_len)));
    'outer: for _ in 0..table_len {
        for &c in inner {
            out.push(c);
            if out.len() == cap {
                break 'outer;
            }
        }
    }
    out
}

/// Enumerate combinations over a descending fee-inclusive denomination
/// view, capped at [`SEARCH_CAP`] candidates.
///
/// Every start index gets a turn. An exact-sum hit inside a subtree cuts
/// that subtree and every intermediate sibling scan below the start node,
/// but the start node's own child scan continues with its next index.
pub fn search_combinations(
    denoms: &[i64],
    target: i64,
    tolerance: i64,
    max_len: usize,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for start in 0..denoms.len() {
        if out.len() >= SEARCH_CAP {
            break;
        }
        let _ = combinations(
            denoms,
            target,
            tolerance,
            max_len,
            start,
            0,
            0,
            max_len - 1,
            true,
            &mut out,
        );
    }
    out
}

/// One node of the recursion: apply the pick at `idx`, then scan child
/// indices. Returns `true` when the subtree emitted an exact-sum
/// candidate. Nodes below the start level stop their sibling scan on that
/// signal; the start node (`start_level`) keeps scanning its remaining
/// children, so exact hits under one child never starve its siblings.
#[allow(clippy::too_many_arguments)]
fn combinations(
    denoms: &[i64],
    target: i64,
    tolerance: i64,
    max_len: usize,
    idx: usize,
    acc: u64,
    sum: i64,
    slots: usize,
    start_level: bool,
    out: &mut Vec<Candidate>,
) -> bool {
    let acc = (acc << 8) | idx as u64;
    // Bounded: at most 8 picks of at most ~2.5e12 sats each, far from
    // i64::MAX.
    let sum = sum + denoms[idx];
    let remaining = target - sum;

    if slots == 0 || remaining < tolerance {
        out.push(Candidate {
            sum,
            count: (max_len - slots) as u8,
            encoding: acc,
        });
        return sum == target;
    }

    let start = descending_search(denoms, remaining, idx);
    for next in start..denoms.len() {
        if out.len() >= SEARCH_CAP {
            return false;
        }
        // Reachability bound: even `slots` picks of this denomination
        // cannot close the gap, and later entries are only smaller.
        if (slots as i64) * denoms[next] < remaining - tolerance {
            break;
        }
        let exact = combinations(
            denoms, target, tolerance, max_len, next, acc, sum, slots - 1, false, out,
        );
        if exact && !start_level {
            return true;
        }
    }
    false
}

/// First index at or after `offset` whose value fits under `value` in the
/// descending table.
fn descending_search(denoms: &[i64], value: i64, offset: usize) -> usize {
    offset + denoms[offset..].partition_point(|&d| d > value)
}

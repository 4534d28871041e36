//! Decomposition scoring, selection, and batch coordination.
//!
//! A round runs in two phases. Phase 1 decomposes every participant's raw
//! input sum and tallies every candidate's denomination indices (winners
//! and losers alike) into a popularity histogram. Phase 2 re-scores each
//! participant's own candidates against that histogram and materializes
//! the winner into concrete output amounts. The histogram is read-only
//! during phase 2, so the two phases never race even if rounds are run in
//! parallel on independent engine instances.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, info};

use churn_core::amount::{checked_group_total, checked_total};
use churn_core::constants::{MAX_DECOMPOSITION_LEN, MAX_SELECTED_DIFF};
use churn_core::error::MixError;
use churn_core::fee::FeeParams;
use churn_core::traits::Mixer;

use crate::decompose::{Candidate, Decomposer};
use crate::denomination::denoms_for;

/// Ranking weights: favor fewer outputs heavily, popularity moderately,
/// closeness to target lightly.
const POPULARITY_WEIGHT: f64 = 0.10;
const COUNT_WEIGHT: f64 = 0.85;
const CLOSENESS_WEIGHT: f64 = 0.05;

/// The production mixing strategy.
///
/// Implements [`Mixer`] with the decomposition search, the popularity
/// histogram, and the weighted candidate ranking. Owns its decomposition
/// cache and histogram; both die with the instance, and one instance only
/// serves one round at a time.
#[derive(Debug, Default)]
pub struct DecomposeMixer {
    fees: FeeParams,
    decomposer: Decomposer,
    /// Denomination-table index -> occurrences across every candidate of
    /// the current round. Rebuilt at the start of each `complete_mix`.
    histogram: HashMap<u8, u32>,
}

/// A candidate annotated with its popularity points.
#[derive(Debug, Clone, Copy)]
struct Scored {
    sum: i64,
    count: u8,
    encoding: u64,
    points: u32,
}

impl DecomposeMixer {
    pub fn new(fees: FeeParams) -> Self {
        Self {
            fees,
            decomposer: Decomposer::new(),
            histogram: HashMap::new(),
        }
    }

    fn output_fee_signed(&self) -> Result<i64, MixError> {
        i64::try_from(self.fees.output_fee()).map_err(|_| MixError::ArithmeticOverflow)
    }

    /// Net target sum: raw input value minus the per-input fee, per input.
    fn target_sum(&self, inputs: &[u64]) -> Result<i64, MixError> {
        let input_fee =
            i64::try_from(self.fees.input_fee()).map_err(|_| MixError::ArithmeticOverflow)?;
        inputs
            .iter()
            .try_fold(0i64, |acc, &a| {
                let v = i64::try_from(a).ok()?;
                acc.checked_add(v.checked_sub(input_fee)?)
            })
            .ok_or(MixError::ArithmeticOverflow)
    }

    /// Phase 1: rebuild the popularity histogram from every candidate of
    /// every target.
    fn build_histogram(&mut self, targets: &[i64]) -> Result<(), MixError> {
        self.histogram.clear();
        let output_fee = self.output_fee_signed()?;
        let mut tallied = 0usize;
        for &target in targets {
            let candidates = self.decomposer.decompose(target, output_fee);
            for c in candidates {
                for byte in 0..c.count as usize {
                    *self.histogram.entry(c.index_at(byte)).or_insert(0) += 1;
                }
                tallied += 1;
            }
        }
        debug!(
            targets = targets.len(),
            candidates = tallied,
            distinct_denoms = self.histogram.len(),
            "denomination histogram built"
        );
        Ok(())
    }
}

/// Tally popularity points per candidate and deduplicate by encoding.
///
/// A duplicate insert of an already-seen encoding doubles its stored
/// points outright (a soft confidence boost; deliberately not cumulative
/// across further repeats). Returns the scored candidates in first-seen
/// order plus the maximum single-candidate points observed.
fn score_candidates(
    histogram: &HashMap<u8, u32>,
    candidates: &[Candidate],
) -> (Vec<Scored>, u32) {
    let mut by_encoding: HashMap<u64, usize> = HashMap::new();
    let mut scored: Vec<Scored> = Vec::new();
    let mut max_points = 0u32;

    for c in candidates {
        let points: u32 = (0..c.count as usize)
            .map(|byte| histogram.get(&c.index_at(byte)).copied().unwrap_or(0))
            .sum();
        match by_encoding.entry(c.encoding) {
            Entry::Vacant(slot) => {
                slot.insert(scored.len());
                scored.push(Scored {
                    sum: c.sum,
                    count: c.count,
                    encoding: c.encoding,
                    points,
                });
            }
            Entry::Occupied(slot) => {
                scored[*slot.get()].points = 2 * points;
            }
        }
        max_points = max_points.max(points);
    }

    (scored, max_points)
}

/// Rank candidates best-first by the weighted score, ties broken by
/// encoding for determinism.
fn rank(scored: &mut [Scored], target: i64, max_points: u32) {
    // max(1) keeps the popularity term at zero (instead of NaN) when no
    // candidate scored any points.
    let scale = max_points.max(1) as f64;
    let score = |s: &Scored| {
        POPULARITY_WEIGHT * (s.points as f64 / scale)
            - COUNT_WEIGHT * (s.count as f64 / MAX_DECOMPOSITION_LEN as f64)
            - CLOSENESS_WEIGHT * ((target - s.sum) as f64 / 100.0)
    };
    scored.sort_by(|a, b| {
        score(b)
            .total_cmp(&score(a))
            .then(a.encoding.cmp(&b.encoding))
    });
}

/// Turn the winner's packed indices into payable output amounts.
///
/// Bytes are walked from the first pick (byte `count - 1`) down to the
/// last, so outputs come out in pick order, descending in value. Each
/// index resolves through the same fee-inclusive view the search ran on;
/// subtracting the per-output fee yields the face value.
fn materialize(winner: &Scored, denoms: &[i64], output_fee: u64) -> Vec<u64> {
    let count = winner.count as usize;
    let mut outputs = vec![0u64; count];
    for byte in 0..count {
        let index = ((winner.encoding >> (8 * byte)) & 0xff) as usize;
        outputs[count - 1 - byte] = denoms[index] as u64 - output_fee;
    }
    outputs
}

/// Internal-consistency check on the selected decomposition.
///
/// Must never fail for a correct search and materialization; a failure is
/// a defect, not an input error.
fn validate_selection(
    target: i64,
    winner: &Scored,
    produced: i64,
    output_fee: i64,
) -> Result<(), MixError> {
    let diff = target - winner.sum;
    let expected = target - winner.count as i64 * output_fee;
    if diff > MAX_SELECTED_DIFF || expected - produced != diff {
        return Err(MixError::InvalidDecomposition {
            target,
            sum: winner.sum,
            diff,
        });
    }
    Ok(())
}

impl Mixer for DecomposeMixer {
    fn fees(&self) -> FeeParams {
        self.fees
    }

    fn mix(&mut self, my_inputs: &[u64], others_inputs: &[u64]) -> Result<Vec<u64>, MixError> {
        let my_target = self.target_sum(my_inputs)?;
        let output_fee = self.output_fee_signed()?;
        debug!(
            target = my_target,
            own_inputs = my_inputs.len(),
            context_inputs = others_inputs.len(),
            "selecting decomposition"
        );

        let candidates = self.decomposer.decompose(my_target, output_fee);
        let (mut scored, max_points) = score_candidates(&self.histogram, candidates);
        if scored.is_empty() {
            // Target at or below the smallest usable denomination: the
            // participant receives no decomposed outputs.
            return Ok(Vec::new());
        }

        rank(&mut scored, my_target, max_points);
        let winner = scored[0];

        let denoms = denoms_for(my_target, output_fee);
        let outputs = materialize(&winner, &denoms, self.fees.output_fee());
        let produced: i64 = outputs.iter().map(|&o| o as i64).sum();
        validate_selection(my_target, &winner, produced, output_fee)?;

        Ok(outputs)
    }

    fn complete_mix(&mut self, inputs: &[Vec<u64>]) -> Result<Vec<Vec<u64>>, MixError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        // Phase 1: histogram over every participant's raw input sum.
        // Input fees are subtracted per participant during selection,
        // not here.
        let mut targets = Vec::with_capacity(inputs.len());
        for group in inputs {
            let raw = checked_total(group)?;
            targets.push(i64::try_from(raw).map_err(|_| MixError::ArithmeticOverflow)?);
        }
        self.build_histogram(&targets)?;

        // Phase 2: select per participant, everyone else as context.
        let mut outputs = Vec::with_capacity(inputs.len());
        for (i, group) in inputs.iter().enumerate() {
            let others: Vec<u64> = inputs
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .flat_map(|(_, g)| g.iter().copied())
                .collect();
            outputs.push(self.mix(group, &others)?);
        }

        // Post-condition: the round pays its fees.
        let total_in = checked_group_total(inputs)?;
        let total_out = checked_group_total(&outputs)?;
        if total_out >= total_in {
            return Err(MixError::FeeInsolvency {
                inputs: total_in,
                outputs: total_out,
            });
        }
        info!(
            participants = inputs.len(),
            total_in,
            total_out,
            fee = total_in - total_out,
            "round mixed"
        );
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::search_combinations;
    use crate::denomination::denoms_for_table;
    use churn_core::constants::STD_DENOMS;
    use proptest::prelude::*;

    fn mixer() -> DecomposeMixer {
        DecomposeMixer::new(FeeParams::default())
    }

    fn candidate(sum: i64, indices: &[u8]) -> Candidate {
        let mut encoding = 0u64;
        for &i in indices {
            encoding = (encoding << 8) | i as u64;
        }
        Candidate { sum, count: indices.len() as u8, encoding }
    }

    // --- score_candidates ---

    #[test]
    fn points_sum_histogram_counts() {
        let histogram = HashMap::from([(0u8, 3u32), (1, 2)]);
        let c = candidate(100, &[0, 1]);
        let (scored, max_points) = score_candidates(&histogram, &[c]);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].points, 5);
        assert_eq!(max_points, 5);
    }

    #[test]
    fn duplicate_encoding_doubles_points_once() {
        let histogram = HashMap::from([(0u8, 3u32), (1, 2)]);
        let c = candidate(100, &[0, 1]);
        // Three occurrences: doubled, not quadrupled, on repeat inserts.
        let (scored, max_points) = score_candidates(&histogram, &[c, c, c]);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].points, 10);
        assert_eq!(max_points, 5, "max tracks single-candidate points");
    }

    #[test]
    fn unknown_indices_score_zero() {
        let histogram = HashMap::new();
        let c = candidate(100, &[7, 7]);
        let (scored, max_points) = score_candidates(&histogram, &[c]);
        assert_eq!(scored[0].points, 0);
        assert_eq!(max_points, 0);
    }

    // --- rank ---

    #[test]
    fn rank_prefers_fewer_outputs() {
        let mut scored = vec![
            Scored { sum: 8, count: 8, encoding: 1, points: 0 },
            Scored { sum: 10, count: 2, encoding: 2, points: 0 },
        ];
        rank(&mut scored, 10, 0);
        assert_eq!(scored[0].encoding, 2, "two outputs must beat eight");
    }

    #[test]
    fn rank_popularity_breaks_count_ties() {
        let mut scored = vec![
            Scored { sum: 10, count: 2, encoding: 1, points: 1 },
            Scored { sum: 10, count: 2, encoding: 2, points: 9 },
        ];
        rank(&mut scored, 10, 9);
        assert_eq!(scored[0].encoding, 2);
    }

    #[test]
    fn rank_closeness_breaks_remaining_ties() {
        let mut scored = vec![
            Scored { sum: 60, count: 2, encoding: 1, points: 0 },
            Scored { sum: 100, count: 2, encoding: 2, points: 0 },
        ];
        rank(&mut scored, 100, 0);
        assert_eq!(scored[0].encoding, 2, "closer sum must rank higher");
    }

    #[test]
    fn rank_is_deterministic_on_full_ties() {
        let mut a = vec![
            Scored { sum: 10, count: 2, encoding: 9, points: 0 },
            Scored { sum: 10, count: 2, encoding: 3, points: 0 },
        ];
        let mut b = a.clone();
        b.reverse();
        rank(&mut a, 10, 0);
        rank(&mut b, 10, 0);
        assert_eq!(a[0].encoding, 3);
        assert_eq!(b[0].encoding, 3);
    }

    #[test]
    fn toy_scenario_five_five_wins() {
        // Table {1,2,3,5,8}, fee 0, target 10: {5,5} must beat the
        // many-output alternatives once the count penalty is applied.
        let denoms = denoms_for_table(&[8, 5, 3, 2, 1], 10, 0);
        let candidates = search_combinations(&denoms, 10, 1, 8);
        let (mut scored, max_points) = score_candidates(&HashMap::new(), &candidates);
        rank(&mut scored, 10, max_points);
        let winner = scored[0];
        assert_eq!(winner.sum, 10);
        assert_eq!(winner.count, 2);
        let c = Candidate { sum: winner.sum, count: winner.count, encoding: winner.encoding };
        assert!(c.indices().all(|i| denoms[i as usize] == 5));
    }

    // --- materialize ---

    #[test]
    fn materialize_preserves_pick_order() {
        let denoms = [5_330, 4_330, 2_330];
        // Picks: index 0 then index 2.
        let winner = Scored { sum: 7_660, count: 2, encoding: 2, points: 0 };
        let outputs = materialize(&winner, &denoms, 330);
        assert_eq!(outputs, vec![5_000, 2_000]);
    }

    #[test]
    fn materialize_single_output() {
        let denoms = [1_330];
        let winner = Scored { sum: 1_330, count: 1, encoding: 0, points: 0 };
        assert_eq!(materialize(&winner, &denoms, 330), vec![1_000]);
    }

    // --- validate_selection ---

    #[test]
    fn validation_accepts_consistent_selection() {
        let winner = Scored { sum: 9_990, count: 3, encoding: 0, points: 0 };
        // produced = sum - count * fee
        let produced = 9_990 - 3 * 330;
        assert!(validate_selection(10_000, &winner, produced, 330).is_ok());
    }

    #[test]
    fn validation_rejects_excessive_diff() {
        let winner = Scored { sum: 9_000, count: 2, encoding: 0, points: 0 };
        let produced = 9_000 - 2 * 330;
        let err = validate_selection(10_000, &winner, produced, 330).unwrap_err();
        assert!(matches!(err, MixError::InvalidDecomposition { diff: 1_000, .. }));
    }

    #[test]
    fn validation_rejects_output_mismatch() {
        let winner = Scored { sum: 9_990, count: 3, encoding: 0, points: 0 };
        let produced = 9_990 - 3 * 330 - 1;
        assert!(validate_selection(10_000, &winner, produced, 330).is_err());
    }

    // --- mix ---

    #[test]
    fn mix_tiny_inputs_yield_no_outputs() {
        let mut m = mixer();
        // 500 sats doesn't even cover the 690 sat input fee.
        assert_eq!(m.mix(&[500], &[]).unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn mix_outputs_are_standard_denominations() {
        let mut m = mixer();
        let outputs = m.mix(&[5_000_000], &[]).unwrap();
        assert!(!outputs.is_empty());
        for o in &outputs {
            assert!(STD_DENOMS.contains(&(*o as i64)), "non-standard output {o}");
        }
    }

    #[test]
    fn mix_outputs_descend() {
        let mut m = mixer();
        let outputs = m.mix(&[123_456_789, 987_654], &[]).unwrap();
        for w in outputs.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn mix_pays_fees() {
        let mut m = mixer();
        let inputs = [10_000_000u64, 2_500_000];
        let outputs = m.mix(&inputs, &[]).unwrap();
        let in_total: u64 = inputs.iter().sum();
        let out_total: u64 = outputs.iter().sum();
        assert!(out_total < in_total);
    }

    #[test]
    fn mix_is_deterministic() {
        let inputs = [77_777_777u64, 123_456];
        let a = mixer().mix(&inputs, &[]).unwrap();
        let b = mixer().mix(&inputs, &[]).unwrap();
        assert_eq!(a, b);
    }

    // --- complete_mix ---

    #[test]
    fn complete_mix_empty_round() {
        let mut m = mixer();
        assert_eq!(m.complete_mix(&[]).unwrap(), Vec::<Vec<u64>>::new());
    }

    #[test]
    fn complete_mix_one_group_per_participant() {
        let mut m = mixer();
        let inputs = vec![vec![50_000_000u64], vec![10_000_000, 2_000_000], vec![750_000]];
        let outputs = m.complete_mix(&inputs).unwrap();
        assert_eq!(outputs.len(), inputs.len());
    }

    #[test]
    fn complete_mix_identical_targets_get_identical_outputs() {
        let mut m = mixer();
        let inputs = vec![vec![12_345_678u64], vec![12_345_678]];
        let outputs = m.complete_mix(&inputs).unwrap();
        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn complete_mix_pays_fees() {
        let mut m = mixer();
        let inputs = vec![
            vec![100_000_000u64, 5_000_000],
            vec![33_000_000],
            vec![1_234_567, 7_654_321],
        ];
        let outputs = m.complete_mix(&inputs).unwrap();
        let total_in: u64 = inputs.iter().flatten().sum();
        let total_out: u64 = outputs.iter().flatten().sum();
        assert!(total_out < total_in);
    }

    #[test]
    fn complete_mix_all_dust_is_insolvent() {
        // Nobody can afford an output, so nothing pays the input fees.
        let mut m = mixer();
        let inputs = vec![vec![0u64], vec![0]];
        let err = m.complete_mix(&inputs).unwrap_err();
        assert!(matches!(err, MixError::FeeInsolvency { .. }));
    }

    // --- proptest ---

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(96))]

        /// The internal-consistency check must be unreachable for valid
        /// inputs across the whole target range.
        #[test]
        fn consistency_check_never_fires(target in 10_000i64..10_000_000_000) {
            let mut m = mixer();
            let input = target as u64 + m.fees().input_fee();
            let result = m.complete_mix(&[vec![input]]);
            prop_assert!(result.is_ok(), "unexpected failure: {:?}", result);
        }

        #[test]
        fn mixed_outputs_are_standard(target in 100_000i64..1_000_000_000) {
            let mut m = mixer();
            let input = target as u64 + m.fees().input_fee();
            let outputs = m.complete_mix(&[vec![input]]).unwrap();
            for o in outputs.iter().flatten() {
                prop_assert!(STD_DENOMS.contains(&(*o as i64)));
            }
        }

        #[test]
        fn equal_targets_equal_outputs(target in 100_000i64..1_000_000_000) {
            let mut m = mixer();
            let input = target as u64 + m.fees().input_fee();
            let outputs = m.complete_mix(&[vec![input], vec![input]]).unwrap();
            prop_assert_eq!(&outputs[0], &outputs[1]);
        }
    }
}

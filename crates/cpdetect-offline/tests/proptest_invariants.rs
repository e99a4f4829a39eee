// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use cpdetect_core::{CpdError, DetectionResult, ReproMode, TrajectoryResult};
use cpdetect_dist::{Distribution, LogGammaTable, Normal};
use cpdetect_offline::{BayesFactorScorer, Detector, DetectorConfig, MIN_SEGMENT_LEN};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn run(
    observations: &[Vec<f64>],
    distribution: Distribution,
    threshold: f64,
    repro_mode: ReproMode,
) -> Result<DetectionResult, CpdError> {
    let config = DetectorConfig::new(distribution)
        .with_threshold(threshold)
        .with_repro_mode(repro_mode);
    Detector::new(observations, config)?.detect()
}

fn assert_trajectory_invariants(
    result: &TrajectoryResult,
    n: usize,
    threshold: f64,
) -> Result<(), TestCaseError> {
    prop_assert!(result.validate_coverage(n).is_ok());

    let ts = result.sorted_change_points();
    prop_assert!(ts.windows(2).all(|pair| pair[0] < pair[1]), "{ts:?}");
    prop_assert!(ts.iter().all(|&t| t > 0 && t < n), "{ts:?}");

    for cp in &result.change_points {
        prop_assert!(cp.log_odds >= threshold, "{cp:?}");
        let (start, end) = cp.start_end;
        prop_assert!(start + 3 <= cp.ts && cp.ts + 3 <= end, "{cp:?}");
    }

    let expected_len = if ts.is_empty() { n - 1 } else { n };
    prop_assert_eq!(result.step_function.len(), expected_len);
    prop_assert!(result.step_function.iter().all(|v| v.is_finite() && *v > 0.0));
    Ok(())
}

/// Piecewise-constant positive signal with small jitter, built from drawn levels.
fn blocks_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((5.0f64..50.0, 8usize..30), 1..4).prop_flat_map(|blocks| {
        let n: usize = blocks.iter().map(|&(_, len)| len).sum();
        prop::collection::vec(-0.5f64..0.5, n).prop_map(move |jitter| {
            let mut values = Vec::with_capacity(jitter.len());
            for &(level, len) in &blocks {
                values.extend(std::iter::repeat_n(level, len));
            }
            values.iter_mut().zip(jitter).for_each(|(v, j)| *v += j);
            values
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        max_shrink_iters: 1024,
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct("proptest-regressions/tests/proptest_invariants.txt"))),
        .. ProptestConfig::default()
    })]

    #[test]
    fn detection_respects_partition_and_threshold_invariants(
        values in blocks_strategy(),
        threshold in -5.0f64..20.0,
    ) {
        let n = values.len();
        let result = run(&[values], Distribution::Normal, threshold, ReproMode::Balanced)
            .expect("positive jittered blocks score finitely");
        let traj = result.get_by_key("traj_0").expect("traj_0");
        assert_trajectory_invariants(traj, n, threshold)?;
    }

    #[test]
    fn detection_is_idempotent(values in blocks_strategy()) {
        let detector = Detector::new(&[values], DetectorConfig::default()).expect("detector");
        let first = detector.detect().expect("first run");
        let second = detector.detect().expect("second run");
        prop_assert_eq!(first.get_by_key("traj_0"), second.get_by_key("traj_0"));
    }

    #[test]
    fn parallel_and_strict_runs_match(
        observations in prop::collection::vec(blocks_strategy(), 2..6),
    ) {
        let strict = run(&observations, Distribution::Normal, 0.0, ReproMode::Strict)
            .expect("strict run");
        let balanced = run(&observations, Distribution::Normal, 0.0, ReproMode::Balanced)
            .expect("balanced run");
        prop_assert_eq!(strict.len(), observations.len());
        for ((id, a), (_, b)) in strict.iter().zip(balanced.iter()) {
            prop_assert_eq!(a, b, "{} differs", id);
        }
    }

    #[test]
    fn log_normal_matches_normal_on_logged_samples(values in blocks_strategy()) {
        let logged: Vec<f64> = values.iter().map(|v| v.ln()).collect();
        let log_normal = run(&[values], Distribution::LogNormal, 0.0, ReproMode::Strict)
            .expect("log-normal run");
        let normal = run(&[logged], Distribution::Normal, 0.0, ReproMode::Strict)
            .expect("normal run");
        prop_assert_eq!(log_normal.get_by_key("traj_0"), normal.get_by_key("traj_0"));
    }

    #[test]
    fn short_segments_are_never_scored(
        values in prop::collection::vec(1.0f64..100.0, 0..MIN_SEGMENT_LEN),
    ) {
        let table = LogGammaTable::new(MIN_SEGMENT_LEN);
        let scorer = BayesFactorScorer::new(&Normal, &table, f64::MIN);
        prop_assert!(scorer.score(&values).expect("short segments cannot fail").is_none());
    }

    #[test]
    fn split_never_lands_on_excluded_positions(
        values in prop::collection::vec(1.0f64..100.0, MIN_SEGMENT_LEN..80),
    ) {
        let n = values.len();
        let table = LogGammaTable::new(n);
        let scorer = BayesFactorScorer::new(&Normal, &table, f64::MIN);
        let score = scorer
            .score(&values)
            .expect("spread samples score finitely")
            .expect("minimal threshold accepts every segment");
        prop_assert!((3..=n - 3).contains(&score.split), "split={} n={}", score.split, n);
    }
}

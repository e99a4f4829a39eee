// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use cpdetect_core::{ChangePointRecord, CpdError, StateEmissionRecord};
use cpdetect_dist::DistributionModel;
use std::ops::Range;
use tracing::info;

/// Initial fill of the step function before partitions are painted.
const STEP_FILL: f64 = 1.0;

/// Per-partition statistics and the staircase built from them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconstruction {
    pub state_emission: Vec<StateEmissionRecord>,
    pub step_function: Vec<f64>,
}

/// Rebuilds the piecewise-constant signal implied by `change_points`.
///
/// Partitions are the inclusive ranges `(0, ts0), (ts0+1, ts1), ...,
/// (ts_last+1, n-1)`. Partition statistics are taken over `[0, ts0)`,
/// `[ts_i+1, ts_{i+1})` and `[ts_last+1, n-1)`, so the last sample never
/// contributes to the final partition's mean. Every index of a partition is
/// set to `exp(sample_mu)`.
///
/// Without change points the step function is `exp(mean)` repeated `n - 1`
/// times and a single partition covers the trajectory.
pub fn reconstruct<D: DistributionModel>(
    model: &D,
    trajectory: &[f64],
    change_points: &[ChangePointRecord],
) -> Result<Reconstruction, CpdError> {
    let n = trajectory.len();
    if n == 0 {
        return Err(CpdError::invalid_input(
            "cannot reconstruct a step function for an empty trajectory",
        ));
    }

    if change_points.is_empty() {
        info!("no change point was found");
        let whole = model.mean_var(trajectory)?;
        return Ok(Reconstruction {
            state_emission: vec![StateEmissionRecord {
                partition: (0, n - 1),
                sample_mu: whole.mean,
                sample_sigma: whole.var,
            }],
            step_function: vec![whole.mean.exp(); n - 1],
        });
    }

    let mut ts: Vec<usize> = change_points.iter().map(|cp| cp.ts).collect();
    ts.sort_unstable();
    let windows = partition_windows(&ts, n)?;

    let mut state_emission = Vec::with_capacity(windows.len());
    for (partition, stats_range) in windows {
        let stats = model.mean_var(&trajectory[stats_range])?;
        state_emission.push(StateEmissionRecord {
            partition,
            sample_mu: stats.mean,
            sample_sigma: stats.var,
        });
    }

    let mut step_function = vec![STEP_FILL; n];
    for record in &state_emission {
        let (first, last) = record.partition;
        step_function[first..=last].fill(record.sample_mu.exp());
    }

    Ok(Reconstruction {
        state_emission,
        step_function,
    })
}

/// Inclusive partitions paired with the sample range their statistics use.
fn partition_windows(
    sorted_ts: &[usize],
    n: usize,
) -> Result<Vec<((usize, usize), Range<usize>)>, CpdError> {
    let (Some(&first), Some(&last)) = (sorted_ts.first(), sorted_ts.last()) else {
        return Ok(vec![]);
    };

    if first == 0 {
        return Err(CpdError::invalid_input(
            "change point at index 0 leaves the first partition without samples",
        ));
    }
    if last + 2 >= n {
        return Err(CpdError::invalid_input(format!(
            "change point at {last} leaves the final partition of a length-{n} trajectory without samples"
        )));
    }
    if let Some(pair) = sorted_ts.windows(2).find(|pair| pair[1] < pair[0] + 2) {
        return Err(CpdError::invalid_input(format!(
            "change points {} and {} are too close to form a partition",
            pair[0], pair[1]
        )));
    }

    let mut windows = Vec::with_capacity(sorted_ts.len() + 1);
    windows.push(((0, first), 0..first));
    for pair in sorted_ts.windows(2) {
        windows.push(((pair[0] + 1, pair[1]), pair[0] + 1..pair[1]));
    }
    windows.push(((last + 1, n - 1), last + 1..n - 1));
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::reconstruct;
    use cpdetect_core::{ChangePointRecord, CpdError, TrajectoryResult};
    use cpdetect_dist::{LogNormal, Normal};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "expected {expected}, got {actual}, |diff|={diff}, tol={tol}"
        );
    }

    fn cp(ts: usize) -> ChangePointRecord {
        ChangePointRecord {
            ts,
            log_odds: 1.0,
            start_end: (0, 0),
        }
    }

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn no_change_points_yields_short_constant_step() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let rec = reconstruct(&Normal, &values, &[]).expect("reconstruction");

        assert_eq!(rec.step_function.len(), values.len() - 1);
        for &v in &rec.step_function {
            assert_close(v, 3.0_f64.exp(), 1e-12);
        }
        assert_eq!(rec.state_emission.len(), 1);
        assert_eq!(rec.state_emission[0].partition, (0, 4));
        assert_close(rec.state_emission[0].sample_mu, 3.0, 1e-12);
        assert_close(rec.state_emission[0].sample_sigma, 2.0, 1e-12);
    }

    #[test]
    fn single_sample_trajectory_has_empty_step_function() {
        let rec = reconstruct(&Normal, &[2.0], &[]).expect("reconstruction");
        assert!(rec.step_function.is_empty());
        assert_eq!(rec.state_emission[0].partition, (0, 0));
    }

    #[test]
    fn partitions_follow_inclusive_fencepost_layout() {
        let values = ramp(20);
        // Discovery order is irrelevant; reconstruction sorts.
        let rec = reconstruct(&Normal, &values, &[cp(12), cp(5)]).expect("reconstruction");

        let partitions: Vec<(usize, usize)> =
            rec.state_emission.iter().map(|r| r.partition).collect();
        assert_eq!(partitions, vec![(0, 5), (6, 12), (13, 19)]);

        // Statistics exclude each partition's right edge: [0,5), [6,12), [13,19).
        assert_close(rec.state_emission[0].sample_mu, 2.0, 1e-12);
        assert_close(rec.state_emission[1].sample_mu, 8.5, 1e-12);
        assert_close(rec.state_emission[2].sample_mu, 15.5, 1e-12);
        assert_close(rec.state_emission[0].sample_sigma, 2.0, 1e-12);
    }

    #[test]
    fn step_function_paints_every_partition_index() {
        let values = ramp(20);
        let rec = reconstruct(&Normal, &values, &[cp(5), cp(12)]).expect("reconstruction");

        assert_eq!(rec.step_function.len(), values.len());
        for record in &rec.state_emission {
            let (first, last) = record.partition;
            for t in first..=last {
                assert_eq!(rec.step_function[t], record.sample_mu.exp(), "t={t}");
            }
        }
        assert_eq!(rec.step_function[19], 15.5_f64.exp());
    }

    #[test]
    fn partitions_cover_whole_trajectory() {
        let values = ramp(40);
        let rec = reconstruct(&Normal, &values, &[cp(20), cp(9), cp(31)]).expect("reconstruction");
        let result = TrajectoryResult {
            state_emission: rec.state_emission,
            ..TrajectoryResult::default()
        };
        result.validate_coverage(values.len()).expect("coverage");
    }

    #[test]
    fn log_normal_step_returns_to_sample_space() {
        let e = std::f64::consts::E;
        let values = [e, e, e, e, e, e, e * e * e, e * e * e, e * e * e, e * e * e];
        let rec = reconstruct(&LogNormal, &values, &[cp(5)]).expect("reconstruction");
        assert_close(rec.state_emission[0].sample_mu, 1.0, 1e-12);
        assert_close(rec.state_emission[1].sample_mu, 3.0, 1e-12);
        assert_close(rec.step_function[0], e, 1e-9);
        assert_close(rec.step_function[9], e * e * e, 1e-9);
    }

    #[test]
    fn log_normal_reconstruction_surfaces_domain_error() {
        let values = [1.0, 2.0, -3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let err = reconstruct(&LogNormal, &values, &[cp(4)]).expect_err("negative sample");
        assert!(err.is_numerical());
    }

    #[test]
    fn change_points_without_room_are_rejected() {
        let values = ramp(10);
        for bad in [vec![cp(0)], vec![cp(8)], vec![cp(9)], vec![cp(4), cp(5)]] {
            let err = reconstruct(&Normal, &values, &bad).expect_err("layout must fail");
            assert!(matches!(err, CpdError::InvalidInput(_)), "{bad:?}");
        }
    }

    #[test]
    fn empty_trajectory_is_rejected() {
        let err = reconstruct(&Normal, &[], &[]).expect_err("empty must fail");
        assert!(matches!(err, CpdError::InvalidInput(_)));
    }
}

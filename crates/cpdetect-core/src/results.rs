// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{CpdError, Diagnostics, TrajectoryId};

/// One accepted split of a trajectory segment.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ChangePointRecord {
    /// Absolute index of the first sample of the right-hand segment.
    pub ts: usize,
    pub log_odds: f64,
    /// Half-open `[start, end)` segment the split was drawn from.
    pub start_end: (usize, usize),
}

/// Sample statistics of one final segment.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct StateEmissionRecord {
    /// Inclusive `(first, last)` index range.
    pub partition: (usize, usize),
    pub sample_mu: f64,
    /// Scale reported by the distribution model (population variance).
    pub sample_sigma: f64,
}

/// Everything detection produced for a single trajectory.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrajectoryResult {
    /// Change points in discovery order.
    pub change_points: Vec<ChangePointRecord>,
    pub state_emission: Vec<StateEmissionRecord>,
    pub step_function: Vec<f64>,
}

impl TrajectoryResult {
    /// Change-point indices sorted ascending.
    pub fn sorted_change_points(&self) -> Vec<usize> {
        let mut ts: Vec<usize> = self.change_points.iter().map(|cp| cp.ts).collect();
        ts.sort_unstable();
        ts
    }

    /// Checks that the state-emission partitions tile `[0, n)` in order.
    pub fn validate_coverage(&self, n: usize) -> Result<(), CpdError> {
        let mut expected_start = 0usize;
        for record in &self.state_emission {
            let (first, last) = record.partition;
            if first != expected_start {
                return Err(CpdError::invalid_input(format!(
                    "partition ({first}, {last}) starts at {first}; expected {expected_start}"
                )));
            }
            if last < first {
                return Err(CpdError::invalid_input(format!(
                    "partition ({first}, {last}) is inverted"
                )));
            }
            expected_start = last + 1;
        }

        if expected_start != n {
            return Err(CpdError::invalid_input(format!(
                "partitions cover [0, {expected_start}); expected [0, {n})"
            )));
        }
        Ok(())
    }
}

/// Output of a detection run, indexed by trajectory.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    trajectories: Vec<TrajectoryResult>,
    pub diagnostics: Diagnostics,
}

impl DetectionResult {
    pub fn new(trajectories: Vec<TrajectoryResult>, diagnostics: Diagnostics) -> Self {
        Self {
            trajectories,
            diagnostics,
        }
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn get(&self, id: TrajectoryId) -> Option<&TrajectoryResult> {
        self.trajectories.get(id.index())
    }

    /// Looks a trajectory up by its `traj_<k>` key.
    pub fn get_by_key(&self, key: &str) -> Option<&TrajectoryResult> {
        let index = key.strip_prefix("traj_")?.parse::<usize>().ok()?;
        self.get(TrajectoryId(index))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (TrajectoryId, &TrajectoryResult)> + '_ {
        self.trajectories
            .iter()
            .enumerate()
            .map(|(k, result)| (TrajectoryId(k), result))
    }

    /// Total number of change points across all trajectories.
    pub fn total_change_points(&self) -> usize {
        self.trajectories
            .iter()
            .map(|result| result.change_points.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangePointRecord, DetectionResult, StateEmissionRecord, TrajectoryResult};
    use crate::{Diagnostics, TrajectoryId};

    fn record(ts: usize) -> ChangePointRecord {
        ChangePointRecord {
            ts,
            log_odds: 1.5,
            start_end: (0, 40),
        }
    }

    fn emission(first: usize, last: usize) -> StateEmissionRecord {
        StateEmissionRecord {
            partition: (first, last),
            sample_mu: 0.0,
            sample_sigma: 1.0,
        }
    }

    #[test]
    fn sorted_change_points_orders_discovery_sequence() {
        let result = TrajectoryResult {
            change_points: vec![record(30), record(10), record(20)],
            ..TrajectoryResult::default()
        };
        assert_eq!(result.sorted_change_points(), vec![10, 20, 30]);
    }

    #[test]
    fn validate_coverage_accepts_tiling_partitions() {
        let result = TrajectoryResult {
            state_emission: vec![emission(0, 9), emission(10, 19), emission(20, 39)],
            ..TrajectoryResult::default()
        };
        result.validate_coverage(40).expect("partitions tile [0, 40)");
    }

    #[test]
    fn validate_coverage_rejects_gap_and_short_cover() {
        let gap = TrajectoryResult {
            state_emission: vec![emission(0, 9), emission(11, 39)],
            ..TrajectoryResult::default()
        };
        let err = gap.validate_coverage(40).expect_err("gap must fail");
        assert!(err.to_string().contains("expected 10"));

        let short = TrajectoryResult {
            state_emission: vec![emission(0, 38)],
            ..TrajectoryResult::default()
        };
        let err = short.validate_coverage(40).expect_err("short cover must fail");
        assert!(err.to_string().contains("expected [0, 40)"));
    }

    #[test]
    fn detection_result_lookup_by_id_and_key() {
        let first = TrajectoryResult {
            change_points: vec![record(20)],
            ..TrajectoryResult::default()
        };
        let second = TrajectoryResult::default();
        let result = DetectionResult::new(vec![first.clone(), second], Diagnostics::default());

        assert_eq!(result.len(), 2);
        assert_eq!(result.get(TrajectoryId(0)), Some(&first));
        assert_eq!(result.get_by_key("traj_0"), Some(&first));
        assert!(result.get_by_key("traj_7").is_none());
        assert!(result.get_by_key("trajectory_0").is_none());
        assert_eq!(result.total_change_points(), 1);

        let keys: Vec<String> = result.iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(keys, vec!["traj_0", "traj_1"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn trajectory_result_serde_roundtrip() {
        let result = TrajectoryResult {
            change_points: vec![record(20)],
            state_emission: vec![emission(0, 20), emission(21, 39)],
            step_function: vec![2.0; 40],
        };
        let encoded = serde_json::to_string(&result).expect("result should serialize");
        let decoded: TrajectoryResult =
            serde_json::from_str(&encoded).expect("result should deserialize");
        assert_eq!(decoded, result);
    }
}

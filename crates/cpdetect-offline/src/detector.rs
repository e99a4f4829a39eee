// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::bayes_factor::BayesFactorScorer;
use crate::config::DetectorConfig;
use crate::segmenter::{SegmenterStats, segment_trajectory};
use crate::step_function::reconstruct;
use cpdetect_core::{
    CpdError, DetectionResult, Diagnostics, TrajectoryId, TrajectoryResult, TrajectorySet,
};
use cpdetect_dist::{Distribution, DistributionModel, LogGammaTable};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::borrow::Cow;
use std::time::Instant;
use tracing::{info, info_span};

const ALGORITHM: &str = "bayes_binseg";

/// Bayesian change-point detector over a fixed set of trajectories.
///
/// Owns a copy of its input and a log-gamma table sized to the longest
/// trajectory; [`Detector::detect`] borrows both immutably, so repeated calls
/// return identical records.
#[derive(Clone, Debug)]
pub struct Detector {
    trajectories: TrajectorySet,
    config: DetectorConfig,
    log_gamma: LogGammaTable,
}

impl Detector {
    /// Copies `observations` and prepares a detector for `config`.
    pub fn new<T: AsRef<[f64]>>(
        observations: &[T],
        config: DetectorConfig,
    ) -> Result<Self, CpdError> {
        Self::from_trajectory_set(TrajectorySet::new(observations)?, config)
    }

    /// Builds a detector from a distribution selector (`normal`, `gaussian`
    /// or `log_normal`) and an optional threshold (default `0.0`).
    pub fn with_distribution_name<T: AsRef<[f64]>>(
        observations: &[T],
        distribution: &str,
        log_odds_threshold: Option<f64>,
    ) -> Result<Self, CpdError> {
        let config = DetectorConfig::from_selector(distribution, log_odds_threshold)?;
        Self::new(observations, config)
    }

    pub fn from_trajectory_set(
        trajectories: TrajectorySet,
        config: DetectorConfig,
    ) -> Result<Self, CpdError> {
        config.validate()?;
        let log_gamma = LogGammaTable::new(trajectories.max_len());
        Ok(Self {
            trajectories,
            config,
            log_gamma,
        })
    }

    /// Number of observation trajectories.
    pub fn nobservations(&self) -> usize {
        self.trajectories.len()
    }

    pub fn observation_lengths(&self) -> Vec<usize> {
        self.trajectories.lengths()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn distribution(&self) -> Distribution {
        self.config.distribution
    }

    pub fn trajectories(&self) -> &TrajectorySet {
        &self.trajectories
    }

    pub fn log_gamma_table(&self) -> &LogGammaTable {
        &self.log_gamma
    }

    /// Segments every trajectory and reconstructs its step function.
    ///
    /// Any numerical issue aborts the whole run; the error reported is the
    /// one from the lowest-indexed failing trajectory.
    pub fn detect(&self) -> Result<DetectionResult, CpdError> {
        let started_at = Instant::now();
        info!(
            observations = self.nobservations(),
            lengths = ?self.observation_lengths(),
            distribution = self.config.distribution.name(),
            threshold = self.config.log_odds_threshold,
            "running change point detector"
        );

        let inputs: Vec<(TrajectoryId, &[f64])> = self.trajectories.iter().collect();
        let (outcomes, used_parallel) = self.run_all(&inputs);

        let mut trajectories = Vec::with_capacity(outcomes.len());
        let mut score_evals = 0usize;
        let mut max_depth = 0usize;
        let mut notes = vec![];
        for ((id, _), outcome) in inputs.iter().zip(outcomes) {
            let (result, stats) = outcome?;
            score_evals += stats.score_evals;
            max_depth = max_depth.max(stats.max_depth);
            if result.change_points.is_empty() {
                notes.push(format!("{id}: no change point was found"));
            }
            trajectories.push(result);
        }

        let total_change_points: usize = trajectories.iter().map(|r| r.change_points.len()).sum();
        notes.push(format!(
            "final_change_count={total_change_points}, score_evals={score_evals}, used_parallel={used_parallel}"
        ));

        let runtime_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(runtime_ms, total_change_points, "change point detection finished");

        #[cfg(feature = "rayon")]
        let thread_count = used_parallel.then(rayon::current_num_threads);
        #[cfg(not(feature = "rayon"))]
        let thread_count = None;

        let diagnostics = Diagnostics {
            n_trajectories: self.nobservations(),
            trajectory_lengths: self.observation_lengths(),
            runtime_ms: Some(runtime_ms),
            algorithm: Cow::Borrowed(ALGORITHM),
            distribution: Cow::Borrowed(self.config.distribution.name()),
            log_odds_threshold: self.config.log_odds_threshold,
            repro_mode: self.config.repro_mode,
            thread_count,
            score_evals,
            max_depth,
            notes,
            ..Diagnostics::default()
        };

        Ok(DetectionResult::new(trajectories, diagnostics))
    }

    #[cfg(feature = "rayon")]
    fn run_all(
        &self,
        inputs: &[(TrajectoryId, &[f64])],
    ) -> (Vec<Result<(TrajectoryResult, SegmenterStats), CpdError>>, bool) {
        if self.can_use_parallel() {
            let outcomes = inputs
                .par_iter()
                .map(|&(id, trajectory)| self.detect_one(id, trajectory))
                .collect();
            return (outcomes, true);
        }
        (self.run_sequential(inputs), false)
    }

    #[cfg(not(feature = "rayon"))]
    fn run_all(
        &self,
        inputs: &[(TrajectoryId, &[f64])],
    ) -> (Vec<Result<(TrajectoryResult, SegmenterStats), CpdError>>, bool) {
        (self.run_sequential(inputs), false)
    }

    fn run_sequential(
        &self,
        inputs: &[(TrajectoryId, &[f64])],
    ) -> Vec<Result<(TrajectoryResult, SegmenterStats), CpdError>> {
        let mut outcomes = Vec::with_capacity(inputs.len());
        for &(id, trajectory) in inputs {
            let outcome = self.detect_one(id, trajectory);
            let failed = outcome.is_err();
            outcomes.push(outcome);
            if failed {
                break;
            }
        }
        outcomes
    }

    #[cfg(feature = "rayon")]
    fn can_use_parallel(&self) -> bool {
        self.config.repro_mode.allows_parallel() && self.trajectories.len() > 1
    }

    fn detect_one(
        &self,
        id: TrajectoryId,
        trajectory: &[f64],
    ) -> Result<(TrajectoryResult, SegmenterStats), CpdError> {
        let _span = info_span!("trajectory", trajectory = %id).entered();
        info!(len = trajectory.len(), "running cp detector on trajectory");

        let scorer = BayesFactorScorer::new(
            &self.config.distribution,
            &self.log_gamma,
            self.config.log_odds_threshold,
        );
        let segmentation = segment_trajectory(&scorer, trajectory, id)?;

        info!("generating step function");
        let reconstruction = reconstruct(
            &self.config.distribution,
            trajectory,
            &segmentation.change_points,
        )?;

        Ok((
            TrajectoryResult {
                change_points: segmentation.change_points,
                state_emission: reconstruction.state_emission,
                step_function: reconstruction.step_function,
            },
            segmentation.stats,
        ))
    }
}

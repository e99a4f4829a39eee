// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::repro::ReproMode;
use std::borrow::Cow;

/// Diagnostics schema version for detection run metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Structured diagnostics captured from a detection run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub n_trajectories: usize,
    pub trajectory_lengths: Vec<usize>,
    pub runtime_ms: Option<u64>,
    pub algorithm: Cow<'static, str>,
    pub distribution: Cow<'static, str>,
    pub log_odds_threshold: f64,
    pub repro_mode: ReproMode,
    pub thread_count: Option<usize>,
    /// Bayes-factor evaluations summed over all trajectories.
    pub score_evals: usize,
    /// Deepest segmentation level reached by any trajectory.
    pub max_depth: usize,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            n_trajectories: 0,
            trajectory_lengths: vec![],
            runtime_ms: None,
            algorithm: Cow::Borrowed(""),
            distribution: Cow::Borrowed(""),
            log_odds_threshold: 0.0,
            repro_mode: ReproMode::Balanced,
            thread_count: None,
            score_evals: 0,
            max_depth: 0,
            notes: vec![],
            warnings: vec![],
        }
    }
}

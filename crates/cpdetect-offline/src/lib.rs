// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod bayes_factor;
pub mod config;
pub mod detector;
pub mod segmenter;
pub mod step_function;

pub use bayes_factor::{BayesFactorEvaluation, BayesFactorScorer, MIN_SEGMENT_LEN, SplitScore};
pub use config::DetectorConfig;
pub use detector::Detector;
pub use segmenter::{Segmentation, SegmenterStats, segment_range, segment_trajectory};
pub use step_function::{Reconstruction, reconstruct};

/// Offline Bayesian change-point detection namespace.
pub fn crate_name() -> &'static str {
    let _ = (cpdetect_core::crate_name(), cpdetect_dist::crate_name());
    "cpdetect-offline"
}

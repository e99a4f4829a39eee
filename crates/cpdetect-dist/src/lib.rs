// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod distribution;
pub mod log_gamma;

pub use distribution::{Distribution, DistributionModel, LogNormal, Normal, SegmentStats, moments};
pub use log_gamma::{LOG_GAMMA_SENTINEL, LogGammaTable, ln_gamma};

/// Segment distribution models namespace.
pub fn crate_name() -> &'static str {
    let _ = cpdetect_core::crate_name();
    "cpdetect-dist"
}

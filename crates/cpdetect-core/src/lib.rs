// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod error;
pub mod repro;
pub mod results;
pub mod trajectory;

pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, Diagnostics};
pub use error::CpdError;
pub use repro::ReproMode;
pub use results::{ChangePointRecord, DetectionResult, StateEmissionRecord, TrajectoryResult};
pub use trajectory::{TrajectoryId, TrajectorySet};

/// Core shared types for cpdetect.
pub fn crate_name() -> &'static str {
    "cpdetect-core"
}

// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use cpdetect_core::CpdError;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Location/scale summary of a segment in the model's sample space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentStats {
    pub mean: f64,
    /// Population variance (mean squared deviation, no Bessel correction).
    pub var: f64,
}

/// Two-pass mean and population variance of `values`.
///
/// `values` must be non-empty; an empty slice yields NaN statistics.
pub fn moments(values: &[f64]) -> SegmentStats {
    debug_assert!(!values.is_empty(), "moments requires a non-empty slice");
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values
        .iter()
        .map(|x| {
            let delta = x - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;
    SegmentStats { mean, var }
}

/// Segment model contract: maps samples into the space where they are
/// assumed Normal, then summarizes them.
pub trait DistributionModel {
    fn name(&self) -> &'static str;

    /// Maps raw samples into model space. Borrows when the mapping is the
    /// identity.
    fn transform<'a>(&self, segment: &'a [f64]) -> Result<Cow<'a, [f64]>, CpdError>;

    /// `(location, scale)` of `segment`; equal to `moments(transform(segment))`.
    fn mean_var(&self, segment: &[f64]) -> Result<SegmentStats, CpdError> {
        if segment.is_empty() {
            return Err(CpdError::invalid_input(format!(
                "{} mean_var requires a non-empty segment",
                self.name()
            )));
        }
        Ok(moments(&self.transform(segment)?))
    }
}

/// Samples are Normal as given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Normal;

impl DistributionModel for Normal {
    fn name(&self) -> &'static str {
        "normal"
    }

    fn transform<'a>(&self, segment: &'a [f64]) -> Result<Cow<'a, [f64]>, CpdError> {
        Ok(Cow::Borrowed(segment))
    }
}

/// Samples are Normal after a natural log; every sample must be > 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogNormal;

impl DistributionModel for LogNormal {
    fn name(&self) -> &'static str {
        "log_normal"
    }

    fn transform<'a>(&self, segment: &'a [f64]) -> Result<Cow<'a, [f64]>, CpdError> {
        let mut logged = Vec::with_capacity(segment.len());
        for (offset, &value) in segment.iter().enumerate() {
            if value <= 0.0 || value.is_nan() {
                return Err(CpdError::numerical_issue(format!(
                    "log_normal model requires strictly positive samples; got {value} at offset {offset} (are you using the correct distribution?)"
                )));
            }
            logged.push(value.ln());
        }
        Ok(Cow::Owned(logged))
    }
}

/// Closed set of supported segment distributions.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Distribution {
    #[default]
    Normal,
    LogNormal,
}

impl Distribution {
    /// Selector strings accepted by [`Distribution::from_str`].
    pub const SELECTORS: [&'static str; 3] = ["normal", "gaussian", "log_normal"];
}

impl DistributionModel for Distribution {
    fn name(&self) -> &'static str {
        match self {
            Self::Normal => Normal.name(),
            Self::LogNormal => LogNormal.name(),
        }
    }

    fn transform<'a>(&self, segment: &'a [f64]) -> Result<Cow<'a, [f64]>, CpdError> {
        match self {
            Self::Normal => Normal.transform(segment),
            Self::LogNormal => LogNormal.transform(segment),
        }
    }
}

impl FromStr for Distribution {
    type Err = CpdError;

    /// Exact, case-sensitive match on `normal`, `gaussian` or `log_normal`.
    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        match selector {
            "normal" | "gaussian" => Ok(Self::Normal),
            "log_normal" => Ok(Self::LogNormal),
            other => Err(CpdError::invalid_input(format!(
                "unknown distribution {other:?}; use one of {:?}",
                Self::SELECTORS
            ))),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

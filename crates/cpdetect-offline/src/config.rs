// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use cpdetect_core::{CpdError, ReproMode};
use cpdetect_dist::Distribution;

/// Configuration for [`crate::Detector`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorConfig {
    pub distribution: Distribution,
    /// A segment is split only when its log Bayes factor is at least this.
    pub log_odds_threshold: f64,
    pub repro_mode: ReproMode,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            distribution: Distribution::Normal,
            log_odds_threshold: 0.0,
            repro_mode: ReproMode::Balanced,
        }
    }
}

impl DetectorConfig {
    pub fn new(distribution: Distribution) -> Self {
        Self {
            distribution,
            ..Self::default()
        }
    }

    /// Builds a config from a distribution selector and optional threshold.
    pub fn from_selector(
        distribution: &str,
        log_odds_threshold: Option<f64>,
    ) -> Result<Self, CpdError> {
        let config = Self {
            distribution: distribution.parse()?,
            log_odds_threshold: log_odds_threshold.unwrap_or(0.0),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_threshold(mut self, log_odds_threshold: f64) -> Self {
        self.log_odds_threshold = log_odds_threshold;
        self
    }

    pub fn with_repro_mode(mut self, repro_mode: ReproMode) -> Self {
        self.repro_mode = repro_mode;
        self
    }

    pub fn validate(&self) -> Result<(), CpdError> {
        if !self.log_odds_threshold.is_finite() {
            return Err(CpdError::invalid_input(format!(
                "DetectorConfig.log_odds_threshold must be finite; got {}",
                self.log_odds_threshold
            )));
        }
        Ok(())
    }
}

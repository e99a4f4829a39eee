// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Bayes factor for "one segment" vs "two segments split at `i`" under a
//! Normal model with unknown mean and variance (Ensign & Pande, 2010).

use cpdetect_core::CpdError;
use cpdetect_dist::{DistributionModel, LogGammaTable, moments};
use std::f64::consts::{LN_2, PI};
use tracing::debug;

/// Shortest segment that can hold a candidate split.
pub const MIN_SEGMENT_LEN: usize = 6;

/// Leading positions that can never be a split.
const LEADING_EXCLUDED: usize = 3;
/// Trailing positions that can never be a split.
const TRAILING_EXCLUDED: usize = 2;

/// Accepted split of a segment, relative to the segment start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitScore {
    pub split: usize,
    pub log_odds: f64,
}

/// Unthresholded score of a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BayesFactorEvaluation {
    /// Segment-relative index of the maximum split weight.
    pub split: usize,
    pub log_odds: f64,
    pub numerator: f64,
    pub denominator: f64,
}

/// Scores segments against a fixed model, log-gamma table and threshold.
#[derive(Clone, Copy, Debug)]
pub struct BayesFactorScorer<'a, D: DistributionModel> {
    model: &'a D,
    log_gamma: &'a LogGammaTable,
    threshold: f64,
}

impl<'a, D: DistributionModel> BayesFactorScorer<'a, D> {
    pub fn new(model: &'a D, log_gamma: &'a LogGammaTable, threshold: f64) -> Self {
        Self {
            model,
            log_gamma,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn model(&self) -> &'a D {
        self.model
    }

    /// Computes the log odds and best split of `segment` without applying the
    /// threshold. Returns `None` for segments shorter than [`MIN_SEGMENT_LEN`].
    pub fn evaluate(&self, segment: &[f64]) -> Result<Option<BayesFactorEvaluation>, CpdError> {
        let n = segment.len();
        if n < MIN_SEGMENT_LEN {
            debug!(n, "segment is less than {MIN_SEGMENT_LEN} points");
            return Ok(None);
        }
        if n > self.log_gamma.max_len() {
            return Err(CpdError::invalid_input(format!(
                "segment length {n} exceeds log-gamma table coverage {}",
                self.log_gamma.max_len()
            )));
        }

        let x = self.model.transform(segment)?;
        let whole = moments(&x);
        let n_f = n as f64;

        let denominator =
            1.5 * PI.ln() + (-0.5 * n_f + 0.5) * (n_f * whole.var).ln() + self.log_gamma.get(n);

        // Excluded positions weigh zero in the average but can never win the argmax.
        let mut weight_sum = 0.0;
        let mut best_weight = f64::NEG_INFINITY;
        let mut best_split = LEADING_EXCLUDED;
        for split in LEADING_EXCLUDED..=n - 1 - TRAILING_EXCLUDED {
            let weight = split_weight(&x, split, self.log_gamma);
            weight_sum += weight;
            if weight > best_weight {
                best_weight = weight;
                best_split = split;
            }
        }

        let numerator = 2.5 * LN_2 + whole.mean.abs().ln() + weight_sum / n_f;
        let log_odds = numerator - denominator;
        debug!(numerator, denominator, log_odds, "scored segment");

        if !log_odds.is_finite() {
            return Err(CpdError::numerical_issue(format!(
                "non-finite log odds {log_odds} for {} segment of length {n} (numerator={numerator}, denominator={denominator}); are you using the correct distribution?",
                self.model.name()
            )));
        }

        Ok(Some(BayesFactorEvaluation {
            split: best_split,
            log_odds,
            numerator,
            denominator,
        }))
    }

    /// Best split of `segment` when its log odds reach the threshold.
    pub fn score(&self, segment: &[f64]) -> Result<Option<SplitScore>, CpdError> {
        let Some(evaluation) = self.evaluate(segment)? else {
            return Ok(None);
        };

        if evaluation.log_odds < self.threshold {
            debug!(
                log_odds = evaluation.log_odds,
                threshold = self.threshold,
                "log odds below threshold; no change point found"
            );
            return Ok(None);
        }

        Ok(Some(SplitScore {
            split: evaluation.split,
            log_odds: evaluation.log_odds,
        }))
    }
}

/// Log weight of the two-segment hypothesis with the change at `split`.
fn split_weight(x: &[f64], split: usize, log_gamma: &LogGammaTable) -> f64 {
    let (left, right) = x.split_at(split);
    let a = moments(left);
    let b = moments(right);
    let n_a = left.len() as f64;
    let n_b = right.len() as f64;

    let left_term = (-0.5 * n_a + 0.5) * n_a.ln()
        + (-0.5 * n_a + 1.0) * a.var.ln()
        + log_gamma.get(left.len());
    let right_term = (-0.5 * n_b + 0.5) * n_b.ln()
        + (-0.5 * n_b + 1.0) * b.var.ln()
        + log_gamma.get(right.len());
    let coupling = (a.var + b.var).ln() + (a.mean * a.mean * b.mean * b.mean).ln();

    left_term + right_term - coupling
}

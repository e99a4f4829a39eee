// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;

/// Error taxonomy shared by every cpdetect crate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CpdError {
    /// Bad configuration or malformed input, reported before any scoring.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A computation left the real domain (log of a non-positive sample,
    /// non-finite log odds). Invalidates the whole run.
    #[error("numerical issue: {0}")]
    NumericalIssue(String),
    /// Serialization or I/O failure while exporting results.
    #[error("export failed: {0}")]
    Export(String),
}

impl CpdError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// True for errors that signal a distribution/data mismatch.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::NumericalIssue(_))
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::CpdError;
use std::fmt;

/// Stable 0-based identifier of a trajectory within a detection run.
///
/// Displays as `traj_<k>`, the key used by exported tables.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrajectoryId(pub usize);

impl TrajectoryId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TrajectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "traj_{}", self.0)
    }
}

impl From<usize> for TrajectoryId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Owned, validated collection of observation trajectories.
///
/// Samples are copied on ingestion so later mutation of the caller's buffers
/// cannot alter detector state.
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectorySet {
    trajectories: Vec<Vec<f64>>,
}

impl TrajectorySet {
    /// Copies and validates `trajectories`.
    pub fn new<T: AsRef<[f64]>>(trajectories: &[T]) -> Result<Self, CpdError> {
        Self::from_owned(
            trajectories
                .iter()
                .map(|trajectory| trajectory.as_ref().to_vec())
                .collect(),
        )
    }

    /// Takes ownership of already-copied trajectories after validation.
    pub fn from_owned(trajectories: Vec<Vec<f64>>) -> Result<Self, CpdError> {
        if trajectories.is_empty() {
            return Err(CpdError::invalid_input(
                "at least one trajectory is required; got 0",
            ));
        }

        for (k, trajectory) in trajectories.iter().enumerate() {
            let id = TrajectoryId(k);
            if trajectory.is_empty() {
                return Err(CpdError::invalid_input(format!(
                    "{id} is empty; every trajectory needs at least one sample"
                )));
            }
            if let Some((t, value)) = trajectory
                .iter()
                .copied()
                .enumerate()
                .find(|(_, v)| !v.is_finite())
            {
                return Err(CpdError::invalid_input(format!(
                    "{id} has a non-finite sample at t={t}: {value}"
                )));
            }
        }

        Ok(Self { trajectories })
    }

    /// Number of trajectories.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn get(&self, id: TrajectoryId) -> Option<&[f64]> {
        self.trajectories.get(id.0).map(Vec::as_slice)
    }

    /// Per-trajectory sample counts, in trajectory order.
    pub fn lengths(&self) -> Vec<usize> {
        self.trajectories.iter().map(Vec::len).collect()
    }

    /// Length of the longest trajectory.
    pub fn max_len(&self) -> usize {
        self.trajectories.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (TrajectoryId, &[f64])> + '_ {
        self.trajectories
            .iter()
            .enumerate()
            .map(|(k, trajectory)| (TrajectoryId(k), trajectory.as_slice()))
    }
}

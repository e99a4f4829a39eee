// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::bayes_factor::{BayesFactorScorer, SplitScore};
use cpdetect_core::{ChangePointRecord, CpdError, TrajectoryId};
use cpdetect_dist::DistributionModel;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug)]
struct Segment {
    start: usize,
    end: usize,
    depth: usize,
}

/// Work counters for one segmentation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmenterStats {
    pub score_evals: usize,
    pub accepted_splits: usize,
    /// Depth of the deepest segment scored; the full range is depth 0.
    pub max_depth: usize,
}

/// Change points of one trajectory, in discovery order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segmentation {
    pub change_points: Vec<ChangePointRecord>,
    pub stats: SegmenterStats,
}

/// Recursively splits the whole of `trajectory`.
pub fn segment_trajectory<D: DistributionModel>(
    scorer: &BayesFactorScorer<'_, D>,
    trajectory: &[f64],
    id: TrajectoryId,
) -> Result<Segmentation, CpdError> {
    segment_range(scorer, trajectory, 0, trajectory.len(), id)
}

/// Recursively splits `trajectory[start..end]`.
///
/// Each accepted split records `{ts, log_odds, (start, end)}` and queues
/// `[start, ts)` and `[ts, end)`. The work stack pops left halves first, so
/// records come out in the same depth-first order as the recursive form.
pub fn segment_range<D: DistributionModel>(
    scorer: &BayesFactorScorer<'_, D>,
    trajectory: &[f64],
    start: usize,
    end: usize,
    id: TrajectoryId,
) -> Result<Segmentation, CpdError> {
    if start > end || end > trajectory.len() {
        return Err(CpdError::invalid_input(format!(
            "{id}: segment [{start}, {end}) is outside trajectory of length {}",
            trajectory.len()
        )));
    }

    let mut change_points = vec![];
    let mut stats = SegmenterStats::default();
    let mut stack = vec![Segment {
        start,
        end,
        depth: 0,
    }];

    while let Some(segment) = stack.pop() {
        stats.score_evals += 1;
        stats.max_depth = stats.max_depth.max(segment.depth);
        debug!(
            trajectory = %id,
            start = segment.start,
            end = segment.end,
            "trying to split segment"
        );

        let Some(SplitScore { split, log_odds }) =
            scorer.score(&trajectory[segment.start..segment.end])?
        else {
            debug!(
                trajectory = %id,
                start = segment.start,
                end = segment.end,
                "can't split segment"
            );
            continue;
        };

        let ts = segment.start + split;
        change_points.push(ChangePointRecord {
            ts,
            log_odds,
            start_end: (segment.start, segment.end),
        });
        stats.accepted_splits += 1;
        info!(trajectory = %id, ts, log_odds, "found a new change point");

        let depth = segment.depth + 1;
        stack.push(Segment {
            start: ts,
            end: segment.end,
            depth,
        });
        stack.push(Segment {
            start: segment.start,
            end: ts,
            depth,
        });
    }

    Ok(Segmentation {
        change_points,
        stats,
    })
}

use std::collections::BTreeSet;

use crate::{
    config::{TurnDirection, VfhConfig},
    histogram::Histogram,
};

/// Per-cycle summary of what the histogram says about obstacles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstacleState {
    pub blocked: bool,
    pub blocked_sectors: BTreeSet<usize>,
    /// Blocked sectors left of the center split.
    pub left_count: usize,
    /// Blocked sectors right of the center split.
    pub right_count: usize,
    /// Direction to turn away from the obstacle, `None` when nothing is blocked.
    pub suggested_turn: Option<TurnDirection>,
}

impl ObstacleState {
    pub fn clear() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct ObstacleClassifier {
    threshold_distance: f64,
    tie_break: TurnDirection,
}

impl ObstacleClassifier {
    pub fn new(config: &VfhConfig) -> Self {
        Self {
            threshold_distance: config.threshold_distance,
            tie_break: config.tie_break,
        }
    }

    pub fn classify(&self, histogram: &Histogram) -> ObstacleState {
        let blocked_sectors: BTreeSet<usize> = histogram
            .sectors()
            .iter()
            .enumerate()
            .filter(|(_, sector)| sector.min_distance < self.threshold_distance)
            .map(|(i, _)| i)
            .collect();
        if blocked_sectors.is_empty() {
            return ObstacleState::clear();
        }

        // With an odd count the middle sector belongs to neither side.
        let n = histogram.len();
        let left_count = blocked_sectors.iter().filter(|&&i| i < n / 2).count();
        let right_count = blocked_sectors
            .iter()
            .filter(|&&i| i >= n.div_ceil(2))
            .count();

        let suggested_turn = if right_count > left_count {
            TurnDirection::Left
        } else if left_count > right_count {
            TurnDirection::Right
        } else {
            self.tie_break
        };

        ObstacleState {
            blocked: true,
            blocked_sectors,
            left_count,
            right_count,
            suggested_turn: Some(suggested_turn),
        }
    }
}

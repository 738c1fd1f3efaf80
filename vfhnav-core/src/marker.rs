use std::fmt;

use naci::MarkerDetection;

use crate::{
    config::{CameraConfig, MarkerConfig},
    depth::DepthImage,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LateralZone {
    Left,
    Center,
    Right,
}

impl fmt::Display for LateralZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "LEFT",
            Self::Center => "CENTER",
            Self::Right => "RIGHT",
        })
    }
}

/// What the goal tracker saw this cycle.
///
/// There is no smoothing across cycles: one missed frame is `Lost` for that cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MarkerObservation {
    Lost,
    Visible {
        id: u32,
        zone: LateralZone,
        /// Meters; infinite when the detector could not measure it.
        distance: f64,
    },
}

impl MarkerObservation {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible { .. })
    }

    pub fn zone(&self) -> Option<LateralZone> {
        match self {
            Self::Visible { zone, .. } => Some(*zone),
            Self::Lost => None,
        }
    }

    pub fn distance(&self) -> Option<f64> {
        match self {
            Self::Visible { distance, .. } => Some(*distance),
            Self::Lost => None,
        }
    }
}

/// Maps raw marker detections into coarse zones.
#[derive(Debug, Clone)]
pub struct GoalTracker {
    left_boundary: f64,
    right_boundary: f64,
}

impl GoalTracker {
    pub fn new(config: &MarkerConfig) -> Self {
        Self {
            left_boundary: config.left_boundary,
            right_boundary: config.right_boundary,
        }
    }

    pub fn zone_of(&self, x_fraction: f64) -> LateralZone {
        if x_fraction < self.left_boundary {
            LateralZone::Left
        } else if x_fraction > self.right_boundary {
            LateralZone::Right
        } else {
            LateralZone::Center
        }
    }

    pub fn observe(&self, detection: Option<&MarkerDetection>) -> MarkerObservation {
        match detection {
            Some(detection) if detection.x_fraction.is_finite() => MarkerObservation::Visible {
                id: detection.id,
                zone: self.zone_of(detection.x_fraction),
                distance: detection
                    .distance
                    .filter(|d| !d.is_nan())
                    .unwrap_or(f64::INFINITY),
            },
            Some(detection) => {
                tracing::debug!(?detection, "ignoring marker with invalid position");
                MarkerObservation::Lost
            }
            None => MarkerObservation::Lost,
        }
    }
}

/// Builds a [`MarkerDetection`] from the pixel corners reported by a marker detector.
///
/// The center is the mean of the corners. When a depth image registered to the color
/// frame is given, the distance is the median depth around the center.
pub fn detection_from_corners(
    id: u32,
    corners: &[[f64; 2]; 4],
    camera: &CameraConfig,
    depth: Option<&DepthImage>,
) -> MarkerDetection {
    let center_x = corners.iter().map(|c| c[0]).sum::<f64>() / 4.0;
    let center_y = corners.iter().map(|c| c[1]).sum::<f64>() / 4.0;
    let distance = depth.and_then(|depth| {
        if center_x < 0.0 || center_y < 0.0 {
            return None;
        }
        depth.median_around(
            center_x as usize,
            center_y as usize,
            camera.depth_sample_radius,
        )
    });
    MarkerDetection::new(id, center_x / f64::from(camera.frame_width), distance)
}

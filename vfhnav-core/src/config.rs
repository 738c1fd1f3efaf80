use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{invalid, Error};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
}

/// Obstacle histogram and avoidance parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct VfhConfig {
    /// Sectors closer than this (meters) are blocked.
    pub threshold_distance: f64,
    pub num_sectors: usize,
    /// Seconds an avoidance or alignment turn is held.
    pub turn_duration: f64,
    /// Seconds a forward step is held.
    pub forward_duration: f64,
    /// Turn direction used when both sides are equally blocked.
    pub tie_break: TurnDirection,
    pub horizontal_fov_deg: f64,
    /// Height band above the sensor (meters) in which returns count as obstacles.
    pub min_height: f64,
    pub max_height: f64,
    /// Planar range band (meters) in which returns count as obstacles.
    pub min_range: f64,
    pub max_range: f64,
    /// Upper bound used when the histogram is reported for diagnostics.
    pub histogram_cap: f64,
}

impl Default for VfhConfig {
    fn default() -> Self {
        Self {
            threshold_distance: 1.0,
            num_sectors: 5,
            turn_duration: 0.2,
            forward_duration: 0.4,
            tie_break: TurnDirection::Left,
            horizontal_fov_deg: 57.0,
            min_height: -0.3,
            max_height: 1.0,
            min_range: 0.05,
            max_range: 8.0,
            histogram_cap: 2.0,
        }
    }
}

impl VfhConfig {
    pub fn turn_duration(&self) -> Duration {
        seconds(self.turn_duration)
    }

    pub fn forward_duration(&self) -> Duration {
        seconds(self.forward_duration)
    }

    pub fn horizontal_fov(&self) -> f64 {
        self.horizontal_fov_deg.to_radians()
    }

    fn validate(&self) -> Result<(), Error> {
        positive("vfh.threshold_distance", self.threshold_distance)?;
        if self.num_sectors == 0 {
            return Err(invalid("vfh.num_sectors", "must be at least 1"));
        }
        positive("vfh.turn_duration", self.turn_duration)?;
        positive("vfh.forward_duration", self.forward_duration)?;
        positive("vfh.horizontal_fov_deg", self.horizontal_fov_deg)?;
        if self.horizontal_fov_deg >= 180.0 {
            return Err(invalid(
                "vfh.horizontal_fov_deg",
                format!("{} is not below 180", self.horizontal_fov_deg),
            ));
        }
        ordered("vfh.min_height", self.min_height, self.max_height)?;
        if self.min_range.is_nan() || self.min_range < 0.0 {
            return Err(invalid(
                "vfh.min_range",
                format!("{} is negative", self.min_range),
            ));
        }
        ordered("vfh.min_range", self.min_range, self.max_range)?;
        positive("vfh.histogram_cap", self.histogram_cap)
    }
}

/// Pinhole intrinsics and mounting of the depth camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct CameraConfig {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    /// Yaw of the sensor relative to the robot heading, degrees.
    pub yaw_deg: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Half size (pixels) of the window used to sample marker depth.
    pub depth_sample_radius: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fx: 525.0,
            fy: 525.0,
            cx: 319.5,
            cy: 239.5,
            yaw_deg: 0.0,
            frame_width: 640,
            frame_height: 480,
            depth_sample_radius: 5,
        }
    }
}

impl CameraConfig {
    fn validate(&self) -> Result<(), Error> {
        positive("camera.fx", self.fx)?;
        positive("camera.fy", self.fy)?;
        if !self.yaw_deg.is_finite() {
            return Err(invalid("camera.yaw_deg", "must be finite"));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(invalid(
                "camera.frame_width",
                format!(
                    "frame size {}x{} is empty",
                    self.frame_width, self.frame_height
                ),
            ));
        }
        Ok(())
    }
}

/// Goal marker zoning and arrival parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct MarkerConfig {
    /// Fractions of the frame width separating LEFT | CENTER | RIGHT.
    pub left_boundary: f64,
    pub right_boundary: f64,
    /// The goal counts as reached closer than this (meters).
    pub approach_distance: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            left_boundary: 0.33,
            right_boundary: 0.67,
            approach_distance: 0.5,
        }
    }
}

impl MarkerConfig {
    fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.left_boundary) {
            return Err(invalid(
                "marker.left_boundary",
                format!("{} is outside [0, 1]", self.left_boundary),
            ));
        }
        if !(0.0..=1.0).contains(&self.right_boundary) {
            return Err(invalid(
                "marker.right_boundary",
                format!("{} is outside [0, 1]", self.right_boundary),
            ));
        }
        if self.left_boundary > self.right_boundary {
            return Err(invalid(
                "marker.left_boundary",
                format!(
                    "{} is greater than right_boundary {}",
                    self.left_boundary, self.right_boundary
                ),
            ));
        }
        positive("marker.approach_distance", self.approach_distance)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchBehavior {
    /// Stand still until the marker shows up.
    #[default]
    Stop,
    /// Rotate in place to sweep the camera.
    Rotate,
    /// Drive forward; obstacle avoidance still takes priority.
    Cruise,
}

/// What to do when neither an obstacle nor the marker needs attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct SearchConfig {
    pub behavior: SearchBehavior,
    /// Rotation direction for [`SearchBehavior::Rotate`].
    pub direction: TurnDirection,
    /// Seconds a search stop or rotation is held.
    pub duration: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            behavior: SearchBehavior::Stop,
            direction: TurnDirection::Left,
            duration: 0.2,
        }
    }
}

impl SearchConfig {
    pub fn duration(&self) -> Duration {
        seconds(self.duration)
    }

    fn validate(&self) -> Result<(), Error> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(invalid(
                "search.duration",
                format!("{} is not a non-negative number", self.duration),
            ));
        }
        if self.behavior == SearchBehavior::Rotate && self.duration == 0.0 {
            return Err(invalid(
                "search.duration",
                "rotate search needs a positive duration",
            ));
        }
        Ok(())
    }
}

/// Everything the decision engine reads. Built once at startup and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct NavigationConfig {
    pub vfh: VfhConfig,
    pub camera: CameraConfig,
    pub marker: MarkerConfig,
    pub search: SearchConfig,
}

impl NavigationConfig {
    /// Rejects configurations the engine must refuse to run with.
    pub fn validate(&self) -> Result<(), Error> {
        self.vfh.validate()?;
        self.camera.validate()?;
        self.marker.validate()?;
        self.search.validate()
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

fn positive(field: &'static str, value: f64) -> Result<(), Error> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not a positive number")))
    }
}

fn ordered(field: &'static str, min: f64, max: f64) -> Result<(), Error> {
    if min < max {
        Ok(())
    } else {
        Err(invalid(field, format!("band {min}..{max} is empty")))
    }
}

use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single fiducial marker seen in the current camera frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetection {
    pub id: u32,
    /// Horizontal position of the marker center as a fraction of the frame width.
    pub x_fraction: f64,
    /// Estimated distance to the marker in meters, if the detector could measure it.
    pub distance: Option<f64>,
}

impl MarkerDetection {
    pub fn new(id: u32, x_fraction: f64, distance: Option<f64>) -> Self {
        Self {
            id,
            x_fraction,
            distance,
        }
    }
}

#[auto_impl(Box, Arc)]
pub trait MarkerSource: Send + Sync {
    /// Returns `Ok(None)` when no marker was found in the latest frame.
    fn current_marker(&self) -> Result<Option<MarkerDetection>, Error>;
}

use auto_impl::auto_impl;
use nalgebra::Point3;

use crate::error::Error;

/// A snapshot of depth returns in the sensor frame.
///
/// Axes follow the usual camera convention: `x` to the right, `y` down and `z` forward,
/// all in meters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    pub points: Vec<Point3<f64>>,
}

impl PointCloud {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.points.iter()
    }
}

impl FromIterator<Point3<f64>> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[auto_impl(Box, Arc)]
pub trait DepthSource: Send + Sync {
    /// Returns the latest available cloud. Staleness is accepted by callers.
    fn current_cloud(&self) -> Result<PointCloud, Error>;
}

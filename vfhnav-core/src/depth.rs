use naci::{Point3, PointCloud};

use crate::{config::CameraConfig, error::Error};

/// Row-major depth image in meters. Zero (or any non-positive value) means no return.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl DepthImage {
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self, Error> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(Error::DepthImageSize {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Converts raw millimeter readings, as delivered by structured light sensors.
    pub fn from_millimeters(width: usize, height: usize, raw: &[u16]) -> Result<Self, Error> {
        Self::new(
            width,
            height,
            raw.iter().map(|&mm| f64::from(mm) / 1000.0).collect(),
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, u: usize, v: usize) -> Option<f64> {
        if u < self.width && v < self.height {
            Some(self.data[v * self.width + u])
        } else {
            None
        }
    }

    /// Back-projects every valid pixel through the pinhole model and applies the sensor yaw.
    pub fn to_point_cloud(&self, camera: &CameraConfig) -> PointCloud {
        let (sin_t, cos_t) = camera.yaw_deg.to_radians().sin_cos();
        let mut points = Vec::with_capacity(self.data.len());
        for v in 0..self.height {
            for u in 0..self.width {
                let z = self.data[v * self.width + u];
                if !z.is_finite() || z <= 0.0 {
                    continue;
                }
                let x = (u as f64 - camera.cx) * z / camera.fx;
                let y = (v as f64 - camera.cy) * z / camera.fy;
                points.push(Point3::new(
                    cos_t * x + sin_t * z,
                    y,
                    -sin_t * x + cos_t * z,
                ));
            }
        }
        PointCloud::new(points)
    }

    /// Median of the valid depths in a square window centered on `(u, v)`.
    ///
    /// Returns `None` when the center lies outside the image or the window has no returns.
    pub fn median_around(&self, u: usize, v: usize, radius: usize) -> Option<f64> {
        if u >= self.width || v >= self.height {
            return None;
        }
        let rows = v.saturating_sub(radius)..v.saturating_add(radius).min(self.height);
        let mut samples: Vec<f64> = rows
            .flat_map(|row| {
                (u.saturating_sub(radius)..u.saturating_add(radius).min(self.width))
                    .map(move |col| self.data[row * self.width + col])
            })
            .filter(|d| *d > 0.0 && d.is_finite())
            .collect();
        if samples.is_empty() {
            return None;
        }
        samples.sort_by(f64::total_cmp);
        let mid = samples.len() / 2;
        Some(if samples.len() % 2 == 0 {
            (samples[mid - 1] + samples[mid]) / 2.0
        } else {
            samples[mid]
        })
    }
}

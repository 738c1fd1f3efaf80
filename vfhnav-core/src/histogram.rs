use naci::{Point3, PointCloud};

use crate::config::VfhConfig;

/// One angular slice of the horizontal field of view.
///
/// Angles are bearings in radians, negative to the left of the optical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub min_angle: f64,
    pub max_angle: f64,
    /// Closest planar range seen in this sector, `f64::INFINITY` when nothing was seen.
    pub min_distance: f64,
}

impl Sector {
    pub fn is_empty(&self) -> bool {
        self.min_distance.is_infinite()
    }
}

/// Contiguous sectors ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    sectors: Vec<Sector>,
}

impl Histogram {
    /// Builds a histogram with the given per-sector distances spread evenly over `fov`.
    pub fn from_distances(fov: f64, distances: &[f64]) -> Self {
        let width = fov / distances.len() as f64;
        let left_edge = -fov / 2.0;
        let sectors = distances
            .iter()
            .enumerate()
            .map(|(i, &min_distance)| Sector {
                min_angle: left_edge + width * i as f64,
                max_angle: left_edge + width * (i + 1) as f64,
                min_distance,
            })
            .collect();
        Self { sectors }
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn min_distances(&self) -> Vec<f64> {
        self.sectors.iter().map(|s| s.min_distance).collect()
    }

    /// Distances capped at `cap`, so empty sectors report the cap instead of infinity.
    pub fn clamped(&self, cap: f64) -> Vec<f64> {
        self.sectors.iter().map(|s| s.min_distance.min(cap)).collect()
    }
}

/// Bins a point cloud into a [`Histogram`].
#[derive(Debug, Clone)]
pub struct HistogramBuilder {
    num_sectors: usize,
    fov: f64,
    height_band: (f64, f64),
    range_band: (f64, f64),
}

impl HistogramBuilder {
    pub fn new(config: &VfhConfig) -> Self {
        Self {
            num_sectors: config.num_sectors.max(1),
            fov: config.horizontal_fov(),
            height_band: (config.min_height, config.max_height),
            range_band: (config.min_range, config.max_range),
        }
    }

    pub fn num_sectors(&self) -> usize {
        self.num_sectors
    }

    pub fn build(&self, cloud: &PointCloud) -> Histogram {
        let mut distances = vec![f64::INFINITY; self.num_sectors];
        let mut accepted = 0usize;
        for point in cloud.iter() {
            let Some((index, range)) = self.bin(point) else {
                continue;
            };
            accepted += 1;
            if range < distances[index] {
                distances[index] = range;
            }
        }
        tracing::trace!(points = cloud.len(), accepted, "built histogram");
        Histogram::from_distances(self.fov, &distances)
    }

    /// Sector index and planar range of a point, or `None` if it does not count.
    fn bin(&self, point: &Point3<f64>) -> Option<(usize, f64)> {
        let (x, y, z) = (point.x, point.y, point.z);
        if !(x.is_finite() && y.is_finite() && z.is_finite()) || z <= 0.0 {
            return None;
        }
        let range = x.hypot(z);
        if range <= 0.0 || range < self.range_band.0 || range > self.range_band.1 {
            return None;
        }
        // camera y points down
        let height = -y;
        if height < self.height_band.0 || height > self.height_band.1 {
            return None;
        }

        let half = self.fov / 2.0;
        let bearing = x.atan2(z).clamp(-half, half);
        let width = self.fov / self.num_sectors as f64;
        let index = (((bearing + half) / width) as usize).min(self.num_sectors - 1);
        Some((index, range))
    }
}

use std::sync::Mutex;

use crate::{error::Error, traits::DepthSource, PointCloud};

/// Dummy DepthSource for debug or tests.
#[derive(Debug, Default)]
pub struct DummyDepthSource {
    pub cloud: Mutex<PointCloud>,
}

impl DummyDepthSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cloud(cloud: PointCloud) -> Self {
        Self {
            cloud: Mutex::new(cloud),
        }
    }

    pub fn set_cloud(&self, cloud: PointCloud) {
        *self.cloud.lock().unwrap() = cloud;
    }
}

impl DepthSource for DummyDepthSource {
    fn current_cloud(&self) -> Result<PointCloud, Error> {
        Ok(self.cloud.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;

    #[test]
    fn test_set_get() {
        let source = DummyDepthSource::new();
        assert!(source.current_cloud().unwrap().is_empty());

        source.set_cloud(PointCloud::new(vec![Point3::new(0.0, 0.0, 1.0)]));
        let cloud = source.current_cloud().unwrap();
        assert_eq!(cloud.len(), 1);
    }
}

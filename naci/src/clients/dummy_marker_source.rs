use std::sync::Mutex;

use crate::{error::Error, traits::MarkerSource, MarkerDetection};

/// Dummy MarkerSource for debug or tests.
#[derive(Debug, Default)]
pub struct DummyMarkerSource {
    pub detection: Mutex<Option<MarkerDetection>>,
}

impl DummyMarkerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_detection(&self, detection: Option<MarkerDetection>) {
        *self.detection.lock().unwrap() = detection;
    }
}

impl MarkerSource for DummyMarkerSource {
    fn current_marker(&self) -> Result<Option<MarkerDetection>, Error> {
        Ok(*self.detection.lock().unwrap())
    }
}

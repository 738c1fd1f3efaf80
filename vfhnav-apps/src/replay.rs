use std::path::Path;

use naci::{DepthSource, MarkerDetection, MarkerSource, Point3, PointCloud};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::debug;
use vfhnav_core::{detection_from_corners, CameraConfig, DepthImage};

use crate::Error;

/// One line of a replay file.
///
/// Obstacles come from either `points` (camera frame, meters) or a raw `depth` image in
/// millimeters. The marker comes from either a ready `marker` detection or the pixel
/// `marker_corners` of the detector, measured against `depth` when present.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RecordedFrame {
    points: Option<Vec<[f64; 3]>>,
    depth: Option<RecordedDepth>,
    marker: Option<MarkerDetection>,
    marker_corners: Option<RecordedCorners>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordedDepth {
    width: usize,
    height: usize,
    millimeters: Vec<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordedCorners {
    id: u32,
    corners: [[f64; 2]; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub cloud: PointCloud,
    pub marker: Option<MarkerDetection>,
}

impl RecordedFrame {
    fn into_frame(self, camera: &CameraConfig) -> Result<Frame, Error> {
        let depth = self
            .depth
            .map(|d| DepthImage::from_millimeters(d.width, d.height, &d.millimeters))
            .transpose()?;
        let cloud = match (self.points, &depth) {
            (Some(points), _) => points
                .into_iter()
                .map(|[x, y, z]| Point3::new(x, y, z))
                .collect(),
            (None, Some(depth)) => depth.to_point_cloud(camera),
            (None, None) => PointCloud::default(),
        };
        let marker = match (self.marker, self.marker_corners) {
            (Some(marker), _) => Some(marker),
            (None, Some(c)) => Some(detection_from_corners(
                c.id,
                &c.corners,
                camera,
                depth.as_ref(),
            )),
            (None, None) => None,
        };
        Ok(Frame { cloud, marker })
    }
}

/// Depth and marker source playing back frames recorded as JSON lines.
///
/// Every [`DepthSource::current_cloud`] call moves to the next frame; the marker
/// reported afterwards belongs to that same frame. Once all frames were played,
/// `current_cloud` returns [`naci::Error::EndOfStream`].
#[derive(Debug)]
pub struct ReplaySource {
    frames: Vec<Frame>,
    cursor: Mutex<Option<usize>>,
}

impl ReplaySource {
    pub fn load<P: AsRef<Path>>(path: P, camera: &CameraConfig) -> Result<Self, Error> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| Error::NoFile(path.to_owned(), e))?;
        let mut frames = vec![];
        for (i, line) in s.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let recorded: RecordedFrame =
                serde_json::from_str(line).map_err(|source| Error::ReplayParseFailure {
                    path: path.to_owned(),
                    line: i + 1,
                    source,
                })?;
            frames.push(recorded.into_frame(camera)?);
        }
        debug!(?path, frames = frames.len(), "loaded replay");
        Ok(Self::from_frames(frames))
    }

    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            cursor: Mutex::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl DepthSource for ReplaySource {
    fn current_cloud(&self) -> Result<PointCloud, naci::Error> {
        let mut cursor = self.cursor.lock();
        let next = cursor.map_or(0, |i| i + 1);
        let frame = self.frames.get(next).ok_or(naci::Error::EndOfStream)?;
        *cursor = Some(next);
        Ok(frame.cloud.clone())
    }
}

impl MarkerSource for ReplaySource {
    fn current_marker(&self) -> Result<Option<MarkerDetection>, naci::Error> {
        Ok(self
            .cursor
            .lock()
            .and_then(|i| self.frames.get(i))
            .and_then(|frame| frame.marker))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn write_replay(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_and_play() {
        let file = write_replay(concat!(
            r#"{"points": [[0.0, 0.0, 0.5]], "marker": {"id": 3, "x_fraction": 0.5, "distance": 2.0}}"#,
            "\n\n",
            r#"{"marker_corners": {"id": 7, "corners": [[0, 0], [64, 0], [64, 48], [0, 48]]}}"#,
            "\n",
        ));
        let source = ReplaySource::load(file.path(), &CameraConfig::default()).unwrap();
        assert_eq!(source.len(), 2);
        assert!(source.current_marker().unwrap().is_none());

        let cloud = source.current_cloud().unwrap();
        assert_eq!(cloud.len(), 1);
        assert_eq!(
            source.current_marker().unwrap(),
            Some(MarkerDetection::new(3, 0.5, Some(2.0)))
        );

        assert!(source.current_cloud().unwrap().is_empty());
        let marker = source.current_marker().unwrap().unwrap();
        assert_eq!(marker.id, 7);
        assert_approx_eq!(marker.x_fraction, 32.0 / 640.0);
        assert_eq!(marker.distance, None);

        assert!(matches!(
            source.current_cloud(),
            Err(naci::Error::EndOfStream)
        ));
        // The last frame stays current.
        assert_eq!(source.current_marker().unwrap().unwrap().id, 7);
    }

    #[test]
    fn test_depth_frame() {
        let camera = CameraConfig {
            frame_width: 2,
            frame_height: 2,
            cx: 0.5,
            cy: 0.5,
            depth_sample_radius: 1,
            ..Default::default()
        };
        let file = write_replay(concat!(
            r#"{"depth": {"width": 2, "height": 2, "millimeters": [1000, 1000, 0, 1000]},"#,
            r#" "marker_corners": {"id": 1, "corners": [[1, 1], [1, 1], [1, 1], [1, 1]]}}"#,
        ));
        let source = ReplaySource::load(file.path(), &camera).unwrap();
        assert_eq!(source.current_cloud().unwrap().len(), 3);
        let marker = source.current_marker().unwrap().unwrap();
        assert_approx_eq!(marker.distance.unwrap(), 1.0);
    }

    #[test]
    fn test_load_errors() {
        let file = write_replay("{}\n{\"unknown\": 1}\n");
        let err = ReplaySource::load(file.path(), &CameraConfig::default()).unwrap_err();
        assert!(matches!(err, Error::ReplayParseFailure { line: 2, .. }));

        let file = write_replay(r#"{"depth": {"width": 2, "height": 2, "millimeters": [1]}}"#);
        assert!(matches!(
            ReplaySource::load(file.path(), &CameraConfig::default()),
            Err(Error::Core(_))
        ));

        assert!(matches!(
            ReplaySource::load("/nonexistent/replay.jsonl", &CameraConfig::default()),
            Err(Error::NoFile(..))
        ));
    }
}

//! Deserialize tracing log in JSON format

use std::time::Duration;

use naci::{MarkerDetection, MotionAction, MotionCommand};
use serde::{de::Error as _, Deserialize};

pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub fn from_str(lines: &str) -> Result<Vec<TracingLog>, naci::Error> {
    let mut res = vec![];
    for line in lines.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|e| naci::Error::Other(e.into()))?;
        // ignore logs of other targets
        if !matches!(value.get("target"), Some(target) if target == "vfhnav_tracing") {
            continue;
        }
        let Some(fields) = value.get("fields") else {
            continue;
        };
        let log = match fields.get("method").and_then(|v| v.as_str()) {
            Some("naci::DepthSource::current_cloud") => {
                TracingLog::CurrentCloud(parse::<CurrentCloudLog>(value)?)
            }
            Some("naci::MarkerSource::current_marker") => {
                TracingLog::CurrentMarker(parse::<CurrentMarkerLog>(value)?)
            }
            Some("naci::CommandSink::send_command") => {
                TracingLog::SendCommand(parse::<SendCommandLog>(value)?)
            }
            _ => continue,
        };
        res.push(log);
    }
    Ok(res)
}

fn parse<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, naci::Error> {
    serde_json::from_value(value).map_err(|e| naci::Error::Other(e.into()))
}

#[derive(Debug)]
#[non_exhaustive]
pub enum TracingLog {
    /// [`naci::DepthSource::current_cloud`]
    CurrentCloud(CurrentCloudLog),
    /// [`naci::MarkerSource::current_marker`]
    CurrentMarker(CurrentMarkerLog),
    /// [`naci::CommandSink::send_command`]
    SendCommand(SendCommandLog),
}

#[derive(Deserialize)]
struct RawTracingLog<Fields> {
    timestamp: Timestamp,
    fields: Fields,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct CurrentCloudLog {
    pub timestamp: Timestamp,
    pub points: usize,
}

impl<'de> Deserialize<'de> for CurrentCloudLog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            points: usize,
        }
        let v = RawTracingLog::<Fields>::deserialize(deserializer)?;
        Ok(Self {
            timestamp: v.timestamp,
            points: v.fields.points,
        })
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct CurrentMarkerLog {
    pub timestamp: Timestamp,
    pub detection: Option<MarkerDetection>,
}

impl<'de> Deserialize<'de> for CurrentMarkerLog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            id: Option<u32>,
            x_fraction: Option<f64>,
            distance: Option<f64>,
        }
        let v = RawTracingLog::<Fields>::deserialize(deserializer)?;
        let detection = match (v.fields.id, v.fields.x_fraction) {
            (Some(id), Some(x_fraction)) => {
                Some(MarkerDetection::new(id, x_fraction, v.fields.distance))
            }
            _ => None,
        };
        Ok(Self {
            timestamp: v.timestamp,
            detection,
        })
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct SendCommandLog {
    pub timestamp: Timestamp,
    pub command: MotionCommand,
}

impl<'de> Deserialize<'de> for SendCommandLog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            action: String,
            duration_secs: u64,
            duration_nanos: u32,
        }
        let v = RawTracingLog::<Fields>::deserialize(deserializer)?;
        let action: MotionAction = v.fields.action.parse().map_err(D::Error::custom)?;
        Ok(Self {
            timestamp: v.timestamp,
            command: MotionCommand::new(
                action,
                Duration::new(v.fields.duration_secs, v.fields.duration_nanos),
            ),
        })
    }
}

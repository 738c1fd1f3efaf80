use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use naci::Policy;
use naci_serial::SerialConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vfhnav_core::{CameraConfig, MarkerConfig, NavigationConfig, SearchConfig, VfhConfig};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct ControlConfig {
    /// Control cycles per second.
    pub target_fps: f64,
    /// Let timed commands run to completion before starting the next one.
    pub hold_maneuvers: bool,
    pub initial_policy: Policy,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            target_fps: 30.0,
            hold_maneuvers: true,
            initial_policy: Policy::Hybrid,
        }
    }
}

impl ControlConfig {
    /// Time between two cycles. Fails unless it is a positive, representable duration.
    pub fn period(&self) -> Result<Duration, Error> {
        let invalid = |message: String| Error::InvalidConfig {
            field: "control.target_fps",
            message,
        };
        if !(self.target_fps.is_finite() && self.target_fps > 0.0) {
            return Err(invalid(format!(
                "{} is not a positive number",
                self.target_fps
            )));
        }
        match Duration::try_from_secs_f64(1.0 / self.target_fps) {
            Ok(period) if !period.is_zero() => Ok(period),
            _ => Err(invalid(format!(
                "{} gives no usable cycle period",
                self.target_fps
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Directory for the JSON log file. Relative paths are resolved against the
    /// config file. No file log when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Contents of the `vfhnav` configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    pub vfh: VfhConfig,
    pub camera: CameraConfig,
    pub marker: MarkerConfig,
    pub search: SearchConfig,
    pub control: ControlConfig,
    pub serial: SerialConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn try_new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        Self::from_str(
            &std::fs::read_to_string(path).map_err(|e| Error::NoFile(path.to_owned(), e))?,
            path,
        )
    }

    pub fn from_str<P: AsRef<Path>>(s: &str, path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut config: AppConfig =
            toml::from_str(s).map_err(|e| Error::TomlParseFailure(path.to_owned(), e))?;
        if let Some(directory) = config.logging.directory.take() {
            config.logging.directory = Some(resolve_relative_path(path, directory));
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml::to_string(self)?)
    }

    /// The validated, immutable part read by the navigation core.
    pub fn navigation(&self) -> Result<NavigationConfig, Error> {
        let config = NavigationConfig {
            vfh: self.vfh.clone(),
            camera: self.camera.clone(),
            marker: self.marker.clone(),
            search: self.search.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.navigation()?;
        self.control.period()?;
        if self.serial.enabled && self.serial.baud_rate == 0 {
            return Err(Error::InvalidConfig {
                field: "serial.baud_rate",
                message: "must be positive".to_owned(),
            });
        }
        Ok(())
    }
}

fn resolve_relative_path(base_file: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match base_file.parent() {
        Some(dir) => dir.join(path),
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn test_default_round_trip() {
        let config = AppConfig::default();
        config.validate().unwrap();
        let s = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_str(&s, "a.toml").unwrap(), config);
    }

    #[test]
    fn test_from_str() {
        let config = AppConfig::from_str(
            r#"
            [vfh]
            num_sectors = 7

            [control]
            target_fps = 10.0
            initial_policy = "vfh_only"

            [serial]
            port = "COM5"

            [logging]
            directory = "logs"
            "#,
            "/etc/vfhnav/robot.toml",
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.vfh.num_sectors, 7);
        assert_eq!(config.control.initial_policy, Policy::VfhOnly);
        assert_approx_eq!(config.control.period().unwrap().as_secs_f64(), 0.1);
        assert_eq!(config.serial.port, "COM5");
        assert_eq!(
            config.logging.directory,
            Some(PathBuf::from("/etc/vfhnav/logs"))
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            AppConfig::from_str("[unknown]\n", "a.toml"),
            Err(Error::TomlParseFailure(..))
        ));
        assert!(matches!(
            AppConfig::try_new("/nonexistent/vfhnav.toml"),
            Err(Error::NoFile(..))
        ));

        let mut config = AppConfig::default();
        config.control.target_fps = 0.0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                field: "control.target_fps",
                ..
            })
        ));

        for fps in [1e-300, 1e12, f64::INFINITY, f64::NAN] {
            let mut config = AppConfig::default();
            config.control.target_fps = fps;
            assert!(
                matches!(
                    config.validate(),
                    Err(Error::InvalidConfig {
                        field: "control.target_fps",
                        ..
                    })
                ),
                "{fps}"
            );
        }

        let mut config = AppConfig::default();
        config.marker.right_boundary = 0.1;
        assert!(matches!(config.validate(), Err(Error::Core(_))));
    }
}

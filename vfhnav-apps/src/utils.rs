use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Local};
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

use crate::{overrides, AppConfig, Error, LoggingConfig};

const VFHNAV_CONFIG_ENV_NAME: &str = "VFHNAV_CONFIG_PATH";

/// Get config path from input or env VFHNAV_CONFIG_PATH
pub fn get_config_path(config: Option<PathBuf>) -> Option<PathBuf> {
    if config.is_some() {
        config
    } else {
        std::env::var(VFHNAV_CONFIG_ENV_NAME)
            .map(|s| {
                warn!("### ENV VAR {} is used ###", s);
                PathBuf::from(s)
            })
            .ok()
    }
}

/// Loads the config file if any, applies the `--config` scripts on top and validates the
/// result.
pub fn resolve_config(path: Option<&Path>, scripts: Option<&str>) -> Result<AppConfig, Error> {
    let config = match (path, scripts) {
        (Some(path), Some(scripts)) => {
            let s = std::fs::read_to_string(path).map_err(|e| Error::NoFile(path.to_owned(), e))?;
            overrides::apply_to_config(Some(&s), scripts, path)?
        }
        (Some(path), None) => AppConfig::try_new(path)?,
        (None, Some(scripts)) => overrides::apply_to_config(None, scripts, "")?,
        (None, None) => AppConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// `robot_nav_<YYYYmmdd_HHMMSS>.log`
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("robot_nav_{}.log", started.format("%Y%m%d_%H%M%S"))
}

/// Installs the global subscriber: human-readable output on stderr filtered by
/// `RUST_LOG` (default `info`), plus a JSON file in `config.directory` when set.
///
/// The returned guard flushes the file writer on drop and must be kept alive until exit.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>, Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)
                .with_context(|| format!("failed to create log directory {directory:?}"))
                .map_err(Error::Logging)?;
            let appender =
                tracing_appender::rolling::never(directory, log_file_name(Local::now()));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_current_span(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("a global subscriber is already installed")
        .map_err(Error::Logging)?;
    Ok(guard)
}

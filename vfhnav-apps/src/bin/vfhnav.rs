use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use clap::Parser;
use naci::{DepthSource, DummyDepthSource, DummyMarkerSource, MarkerSource, Operator};
use naci_serial::SerialCommandSink;
use tracing::{debug, info, warn};
use vfhnav_apps::{utils, AppConfig, ControlLoop, ReplaySource};
use vfhnav_tracing::Tracing;

/// Marker-seeking robot driven by a vector field histogram and a priority arbiter.
#[derive(Parser, Debug)]
#[clap(name = env!("CARGO_BIN_NAME"))]
struct Args {
    /// Path to the setting file. Falls back to the VFHNAV_CONFIG_PATH env var.
    #[clap(short, long, value_parser)]
    config_path: Option<PathBuf>,
    /// Set options from command line. These settings take priority over the
    /// setting file specified by --config-path.
    #[clap(long)]
    config: Option<String>,
    /// Prints the default setting as TOML.
    #[clap(long)]
    show_default_config: bool,
    /// Plays back recorded frames (JSON lines) instead of live sensors.
    #[clap(long, value_parser, conflicts_with = "dry_run")]
    replay: Option<PathBuf>,
    /// Runs without sensors: the robot sees an empty scene and searches.
    #[clap(long)]
    dry_run: bool,
    /// Stops after this many control cycles.
    #[clap(long)]
    max_cycles: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.show_default_config {
        print!("{}", AppConfig::default().to_toml()?);
        return Ok(());
    }

    let config_path = utils::get_config_path(args.config_path);
    let config = utils::resolve_config(config_path.as_deref(), args.config.as_deref())?;
    let _guard = utils::init_tracing(&config.logging)?;
    debug!(?config_path, ?config);

    let (depth, markers): (Box<dyn DepthSource>, Box<dyn MarkerSource>) =
        match (&args.replay, args.dry_run) {
            (Some(path), _) => {
                let replay = Arc::new(ReplaySource::load(path, &config.camera)?);
                info!(?path, frames = replay.len(), "replaying recorded frames");
                (
                    Box::new(Tracing::new(replay.clone())),
                    Box::new(Tracing::new(replay)),
                )
            }
            (None, true) => (
                Box::new(Tracing::new(DummyDepthSource::new())),
                Box::new(Tracing::new(DummyMarkerSource::new())),
            ),
            (None, false) => bail!("no frame source: pass --replay <frames.jsonl> or --dry-run"),
        };
    let sink = Tracing::new(SerialCommandSink::open(&config.serial));

    let control_loop =
        ControlLoop::new(&config, depth, markers, sink)?.with_max_cycles(args.max_cycles);
    let operator = operator();
    let summary = control_loop.run(&*operator).await;
    info!(cycles = summary.cycles, exit = %summary.exit, "bye");
    Ok(())
}

#[cfg(unix)]
fn operator() -> Box<dyn Operator> {
    match naci_keyboard::KeyboardOperator::new() {
        Ok(keyboard) => {
            info!("keys: 1 = VFH only, 2 = marker only, 3 = hybrid, space = emergency stop, q = quit");
            Box::new(Tracing::new(keyboard))
        }
        Err(e) => {
            warn!("keyboard unavailable, running without operator input: {e}");
            Box::new(naci::DummyOperator::new(vec![]))
        }
    }
}

#[cfg(not(unix))]
fn operator() -> Box<dyn Operator> {
    warn!("keyboard input is only supported on unix, running without operator input");
    Box::new(naci::DummyOperator::new(vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let bin = env!("CARGO_BIN_NAME");
        let args = Args::try_parse_from([
            bin,
            "--config-path",
            "path",
            "--config",
            "vfh.num_sectors = 7",
            "--replay",
            "frames.jsonl",
            "--max-cycles",
            "30",
        ])
        .unwrap();
        assert_eq!(args.config_path, Some(PathBuf::from("path")));
        assert_eq!(args.config.as_deref(), Some("vfh.num_sectors = 7"));
        assert_eq!(args.replay, Some(PathBuf::from("frames.jsonl")));
        assert_eq!(args.max_cycles, Some(30));
        assert!(!args.dry_run);

        assert!(Args::try_parse_from([bin, "--replay", "a", "--dry-run"]).is_err());
    }
}

use std::{fmt, str::FromStr, time::Duration};

use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionAction {
    Forward,
    TurnLeft,
    TurnRight,
    Stop,
}

impl fmt::Display for MotionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forward => "FORWARD",
            Self::TurnLeft => "TURN_LEFT",
            Self::TurnRight => "TURN_RIGHT",
            Self::Stop => "STOP",
        })
    }
}

impl FromStr for MotionAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FORWARD" => Ok(Self::Forward),
            "TURN_LEFT" => Ok(Self::TurnLeft),
            "TURN_RIGHT" => Ok(Self::TurnRight),
            "STOP" => Ok(Self::Stop),
            _ => Err(Error::Other(anyhow::anyhow!("unknown motion action {s:?}"))),
        }
    }
}

/// A discrete action and how long the sink should hold it.
///
/// A zero duration means "hold until the next command".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionCommand {
    pub action: MotionAction,
    pub duration: Duration,
}

impl MotionCommand {
    pub fn new(action: MotionAction, duration: Duration) -> Self {
        Self { action, duration }
    }

    pub fn stop() -> Self {
        Self::new(MotionAction::Stop, Duration::ZERO)
    }

    pub fn is_timed(&self) -> bool {
        !self.duration.is_zero()
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s)", self.action, self.duration.as_secs_f64())
    }
}

#[auto_impl(Box, Arc)]
pub trait CommandSink: Send + Sync {
    fn send_command(&self, command: &MotionCommand) -> Result<(), Error>;
    fn last_command(&self) -> Result<Option<MotionCommand>, Error>;

    /// Stops the robot immediately.
    fn stop(&self) -> Result<(), Error> {
        self.send_command(&MotionCommand::stop())
    }

    /// Stops the robot and releases the underlying device.
    fn close(&self) -> Result<(), Error> {
        self.stop()
    }
}

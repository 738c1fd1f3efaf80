use std::time::{Duration, Instant};

use naci::MotionCommand;

/// Holds timed commands open-loop until they expire.
///
/// The clock is passed in so the scheduler can be driven by tests and by
/// `tokio::time::Instant::into_std` alike.
#[derive(Debug, Default, Clone)]
pub struct ManeuverScheduler {
    active: Option<(MotionCommand, Instant)>,
}

impl ManeuverScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a timed command started earlier is still running.
    pub fn is_busy(&self, now: Instant) -> bool {
        self.remaining(now).is_some_and(|d| !d.is_zero())
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let (command, started) = self.active.as_ref()?;
        Some(
            command
                .duration
                .saturating_sub(now.saturating_duration_since(*started)),
        )
    }

    pub fn current(&self) -> Option<&MotionCommand> {
        self.active.as_ref().map(|(command, _)| command)
    }

    /// Starts `command` unless a previous one is still being held.
    ///
    /// Returns whether the command was accepted.
    pub fn offer(&mut self, command: MotionCommand, now: Instant) -> bool {
        if self.is_busy(now) {
            return false;
        }
        self.active = Some((command, now));
        true
    }

    /// Replaces whatever is running, e.g. for an emergency stop.
    pub fn preempt(&mut self, command: MotionCommand, now: Instant) {
        self.active = Some((command, now));
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

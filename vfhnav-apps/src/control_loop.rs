use std::{fmt, time::Duration};

use naci::{
    CommandSink, DepthSource, MarkerSource, MotionAction, MotionCommand, Operator, OperatorEvent,
    Policy,
};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use vfhnav_core::{Decision, ManeuverScheduler, Navigator};

use crate::{AppConfig, ControlConfig, Error};

/// Why [`ControlLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    /// The operator input was closed or produced something unreadable.
    OperatorClosed,
    MaxCycles,
    /// The depth source has no more frames.
    EndOfStream,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Quit => "quit",
            Self::OperatorClosed => "operator closed",
            Self::MaxCycles => "max cycles reached",
            Self::EndOfStream => "end of stream",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    /// Number of cycles that ran the whole pipeline.
    pub cycles: u64,
    pub exit: ExitReason,
}

#[derive(Debug)]
struct LoopState {
    policy: Policy,
    /// Latched by an emergency stop, released by the next policy selection.
    estopped: bool,
    scheduler: ManeuverScheduler,
    last_decision: Option<Decision>,
    last_sent: Option<MotionAction>,
    cycles: u64,
}

/// Fixed-rate sense, decide and act loop.
#[derive(Debug)]
pub struct ControlLoop<D, M, S> {
    navigator: Navigator,
    control: ControlConfig,
    period: Duration,
    depth: D,
    markers: M,
    sink: S,
    max_cycles: Option<u64>,
}

impl<D, M, S> ControlLoop<D, M, S>
where
    D: DepthSource,
    M: MarkerSource,
    S: CommandSink,
{
    pub fn new(config: &AppConfig, depth: D, markers: M, sink: S) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            navigator: Navigator::new(config.navigation()?)?,
            control: config.control.clone(),
            period: config.control.period()?,
            depth,
            markers,
            sink,
            max_cycles: None,
        })
    }

    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Runs until the operator quits, the input ends or the cycle budget is spent, then
    /// stops the robot and closes the sink.
    ///
    /// Sources and the sink are called inline on this task, so a slow device write (bounded
    /// by `serial.timeout_ms` for the serial sink) delays the cycle it happens in. Ticks missed
    /// meanwhile are skipped rather than replayed back to back, and operator events wait until
    /// the write returns.
    pub async fn run<O>(&self, operator: &O) -> LoopSummary
    where
        O: Operator + ?Sized,
    {
        let mut state = LoopState {
            policy: self.control.initial_policy,
            estopped: false,
            scheduler: ManeuverScheduler::new(),
            last_decision: None,
            last_sent: None,
            cycles: 0,
        };
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(policy = ?state.policy, fps = self.control.target_fps, "control loop started");

        let exit = loop {
            if self.max_cycles.is_some_and(|max| state.cycles >= max) {
                break ExitReason::MaxCycles;
            }
            tokio::select! {
                biased;
                event = operator.next_event() => match event {
                    OperatorEvent::SelectPolicy(policy) => {
                        info!(?policy, "policy selected");
                        state.policy = policy;
                        state.estopped = false;
                        state.scheduler.clear();
                    }
                    OperatorEvent::EmergencyStop => {
                        warn!("emergency stop");
                        state.estopped = true;
                        let stop = MotionCommand::stop();
                        state.scheduler.preempt(stop, Instant::now().into_std());
                        self.send(&mut state, stop);
                    }
                    OperatorEvent::Quit => break ExitReason::Quit,
                    OperatorEvent::Unknown => break ExitReason::OperatorClosed,
                },
                _ = interval.tick() => match self.cycle(&mut state) {
                    Ok(()) => state.cycles += 1,
                    Err(naci::Error::EndOfStream) => break ExitReason::EndOfStream,
                    Err(e) => warn!("skipping cycle: {e}"),
                },
            }
        };

        info!(cycles = state.cycles, %exit, "control loop finished");
        operator.stop();
        if let Err(e) = self.sink.close() {
            error!("failed to close command sink: {e}");
        }
        LoopSummary {
            cycles: state.cycles,
            exit,
        }
    }

    fn cycle(&self, state: &mut LoopState) -> Result<(), naci::Error> {
        let cloud = self.depth.current_cloud()?;
        let detection = self.markers.current_marker()?;
        let report = self
            .navigator
            .step(&cloud, detection.as_ref(), state.policy);
        if state.estopped {
            return Ok(());
        }

        let decision = report.decision;
        if self.control.hold_maneuvers {
            let now = Instant::now().into_std();
            if !state.scheduler.offer(decision.command, now) {
                debug!(
                    remaining = ?state.scheduler.remaining(now),
                    "holding {}",
                    state.scheduler.current().map_or(decision.command, |c| *c)
                );
                return Ok(());
            }
        }
        if state.last_decision != Some(decision) {
            info!(mode = %decision.mode, command = %decision.command, "decision changed");
            state.last_decision = Some(decision);
        }
        self.send(state, decision.command);
        Ok(())
    }

    fn send(&self, state: &mut LoopState, command: MotionCommand) {
        if state.last_sent == Some(command.action) {
            return;
        }
        match self.sink.send_command(&command) {
            Ok(()) => state.last_sent = Some(command.action),
            Err(e) => {
                error!("failed to send {command}: {e}");
                state.last_sent = None;
            }
        }
    }
}

use std::{fmt, thread, time::Duration};

use naci::{CommandSink, Error, MotionAction, MotionCommand};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    config::SerialConfig,
    transport::{SerialTransport, Transport},
};

/// Opens the link to the controller; called on startup and on every reconnect.
pub type Opener = Box<dyn Fn() -> Result<Box<dyn Transport>, Error> + Send + Sync>;

/// Wire representation of an action, without the line terminator.
pub fn wire_line(action: MotionAction) -> &'static str {
    match action {
        MotionAction::Forward => "FORWARD",
        MotionAction::TurnLeft => "LEFT",
        MotionAction::TurnRight => "RIGHT",
        MotionAction::Stop => "STOP",
    }
}

/// [`CommandSink`] writing one line per command to the motor controller.
///
/// Only the action goes over the wire; the controller keeps executing it until the
/// next line arrives. Repeating the previous action writes nothing.
///
/// A sink that could not open its port at startup only logs commands. Once a connected
/// link fails, every command first tries to reopen the port and reports
/// [`Error::Connection`] while that fails.
pub struct SerialCommandSink {
    name: String,
    settle: Duration,
    opener: Option<Opener>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    transport: Option<Box<dyn Transport>>,
    last_command: Option<MotionCommand>,
    /// Set when a write on a connected link failed; cleared by a successful connect or close.
    link_lost: bool,
}

impl SerialCommandSink {
    /// Opens the configured port, falling back to simulation mode if that fails.
    pub fn open(config: &SerialConfig) -> Self {
        if !config.enabled {
            info!(port = %config.port, "serial output disabled, running in simulation mode");
            return Self::simulated(&config.port);
        }
        let port_config = config.clone();
        Self::with_opener(
            &config.port,
            config.settle(),
            Box::new(move || {
                SerialTransport::open(&port_config)
                    .map(|t| Box::new(t) as Box<dyn Transport>)
                    .map_err(|e| Error::Connection {
                        message: format!("{}: {e}", port_config.port),
                    })
            }),
        )
    }

    /// Uses `opener` to (re)connect. The first attempt happens here.
    pub fn with_opener(name: &str, settle: Duration, opener: Opener) -> Self {
        let sink = Self {
            name: name.to_owned(),
            settle,
            opener: Some(opener),
            state: Mutex::new(State::default()),
        };
        if let Err(e) = sink.connect(&mut sink.state.lock()) {
            warn!("{e}; running in simulation mode");
        }
        sink
    }

    /// A sink that never opens a port and only logs commands.
    pub fn simulated(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            settle: Duration::ZERO,
            opener: None,
            state: Mutex::new(State::default()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().transport.is_some()
    }

    /// Releases the port (sending `STOP` first) and opens it again.
    pub fn reconnect(&self) -> Result<(), Error> {
        info!(port = %self.name, "reconnecting");
        let mut state = self.state.lock();
        if let Err(e) = release(&self.name, &mut state) {
            warn!("{e}");
        }
        self.connect(&mut state)
    }

    fn connect(&self, state: &mut State) -> Result<(), Error> {
        let opener = self.opener.as_ref().ok_or_else(|| Error::Uninitialized {
            message: format!("{} is a simulated sink", self.name),
        })?;
        let transport = opener()?;
        if !self.settle.is_zero() {
            debug!(settle = ?self.settle, "waiting for controller reset");
            thread::sleep(self.settle);
        }
        state.transport = Some(transport);
        state.last_command = None;
        state.link_lost = false;
        info!(port = %self.name, "motor controller connected");
        Ok(())
    }
}

fn release(name: &str, state: &mut State) -> Result<(), Error> {
    state.last_command = None;
    let Some(mut transport) = state.transport.take() else {
        return Ok(());
    };
    let result = transport
        .write_all(b"STOP\n")
        .and_then(|()| transport.flush())
        .map_err(|e| Error::Connection {
            message: format!("{name}: failed to send STOP on close: {e}"),
        });
    info!(port = %name, "motor controller released");
    result
}

impl fmt::Debug for SerialCommandSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialCommandSink")
            .field("name", &self.name)
            .field("settle", &self.settle)
            .field(
                "connected",
                &self.state.try_lock().map(|s| s.transport.is_some()),
            )
            .finish_non_exhaustive()
    }
}

impl CommandSink for SerialCommandSink {
    fn send_command(&self, command: &MotionCommand) -> Result<(), Error> {
        let mut state = self.state.lock();
        if state.last_command.map(|c| c.action) == Some(command.action) {
            state.last_command = Some(*command);
            return Ok(());
        }
        let line = wire_line(command.action);
        if state.link_lost {
            self.connect(&mut state).map_err(|e| Error::Connection {
                message: format!("{}: link lost, {line} not delivered: {e}", self.name),
            })?;
        }
        let Some(transport) = state.transport.as_mut() else {
            info!(port = %self.name, line, "[sim] motor controller <<");
            state.last_command = Some(*command);
            return Ok(());
        };
        let written = transport
            .write_all(format!("{line}\n").as_bytes())
            .and_then(|()| transport.flush());
        match written {
            Ok(()) => {
                debug!(port = %self.name, line, "motor controller <<");
                state.last_command = Some(*command);
                Ok(())
            }
            Err(e) => {
                error!(port = %self.name, line, "write failed: {e}");
                state.transport = None;
                state.last_command = None;
                state.link_lost = true;
                Err(Error::Connection {
                    message: format!("{}: {e}", self.name),
                })
            }
        }
    }

    fn last_command(&self) -> Result<Option<MotionCommand>, Error> {
        Ok(self.state.lock().last_command)
    }

    /// Sends `STOP` and releases the port. The sink keeps working in simulation mode.
    fn close(&self) -> Result<(), Error> {
        let mut state = self.state.lock();
        if state.link_lost {
            self.connect(&mut state).map_err(|e| Error::Connection {
                message: format!("{}: link lost, STOP not delivered on close: {e}", self.name),
            })?;
        }
        release(&self.name, &mut state)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use super::*;
    use crate::transport::MockTransport;

    fn mock_sink(mock: &MockTransport) -> SerialCommandSink {
        let mock = mock.clone();
        SerialCommandSink::with_opener(
            "mock",
            Duration::ZERO,
            Box::new(move || Ok(Box::new(mock.clone()) as Box<dyn Transport>)),
        )
    }

    fn command(action: MotionAction) -> MotionCommand {
        MotionCommand::new(action, Duration::from_millis(200))
    }

    #[test]
    fn test_wire_line() {
        assert_eq!(wire_line(MotionAction::Forward), "FORWARD");
        assert_eq!(wire_line(MotionAction::TurnLeft), "LEFT");
        assert_eq!(wire_line(MotionAction::TurnRight), "RIGHT");
        assert_eq!(wire_line(MotionAction::Stop), "STOP");
    }

    #[test]
    fn test_repeated_action_is_not_resent() {
        let mock = MockTransport::new();
        let sink = mock_sink(&mock);
        assert!(sink.is_connected());

        sink.send_command(&command(MotionAction::Forward)).unwrap();
        sink.send_command(&command(MotionAction::Forward)).unwrap();
        sink.send_command(&command(MotionAction::TurnLeft)).unwrap();
        sink.stop().unwrap();
        assert_eq!(mock.written_lines(), ["FORWARD", "LEFT", "STOP"]);
        assert_eq!(sink.last_command().unwrap(), Some(MotionCommand::stop()));
    }

    #[test]
    fn test_simulation_mode() {
        let sink = SerialCommandSink::simulated("sim");
        assert!(!sink.is_connected());
        sink.send_command(&command(MotionAction::TurnRight)).unwrap();
        assert_eq!(
            sink.last_command().unwrap().map(|c| c.action),
            Some(MotionAction::TurnRight)
        );
        assert!(matches!(
            sink.reconnect(),
            Err(Error::Uninitialized { .. })
        ));
        sink.close().unwrap();
    }

    #[test]
    fn test_open_failure_falls_back_to_simulation() {
        let sink = SerialCommandSink::with_opener(
            "missing",
            Duration::ZERO,
            Box::new(|| {
                Err(Error::Connection {
                    message: "no such port".to_owned(),
                })
            }),
        );
        assert!(!sink.is_connected());
        sink.send_command(&command(MotionAction::Forward)).unwrap();
        assert!(matches!(sink.reconnect(), Err(Error::Connection { .. })));
    }

    #[test]
    fn test_disabled_config_is_simulated() {
        let config = SerialConfig {
            enabled: false,
            ..SerialConfig::default()
        };
        assert!(!SerialCommandSink::open(&config).is_connected());
    }

    #[test]
    fn test_write_failure_disconnects() {
        let mock = MockTransport::new();
        let sink = mock_sink(&mock);
        mock.set_fail_writes(true);
        assert!(matches!(
            sink.send_command(&command(MotionAction::Forward)),
            Err(Error::Connection { .. })
        ));
        assert!(!sink.is_connected());
        assert!(sink.last_command().unwrap().is_none());

        mock.set_fail_writes(false);
        sink.reconnect().unwrap();
        assert!(sink.is_connected());
        sink.send_command(&command(MotionAction::Forward)).unwrap();
        assert_eq!(mock.written_lines(), ["FORWARD"]);
    }

    #[test]
    fn test_stop_after_write_failure_is_delivered_or_reported() {
        let mock = MockTransport::new();
        let sink = mock_sink(&mock);
        sink.send_command(&command(MotionAction::Forward)).unwrap();
        mock.set_fail_writes(true);
        assert!(sink.send_command(&command(MotionAction::TurnLeft)).is_err());

        // The port is back: STOP reopens it and goes over the wire.
        mock.set_fail_writes(false);
        sink.stop().unwrap();
        assert!(sink.is_connected());
        assert_eq!(mock.written_lines(), ["FORWARD", "STOP"]);
    }

    #[test]
    fn test_lost_link_is_reported_until_reopened() {
        let mock = MockTransport::new();
        let port_present = Arc::new(AtomicBool::new(true));
        let sink = {
            let mock = mock.clone();
            let port_present = port_present.clone();
            SerialCommandSink::with_opener(
                "flaky",
                Duration::ZERO,
                Box::new(move || {
                    if port_present.load(Ordering::SeqCst) {
                        Ok(Box::new(mock.clone()) as Box<dyn Transport>)
                    } else {
                        Err(Error::Connection {
                            message: "unplugged".to_owned(),
                        })
                    }
                }),
            )
        };
        mock.set_fail_writes(true);
        port_present.store(false, Ordering::SeqCst);
        assert!(sink.send_command(&command(MotionAction::Forward)).is_err());

        mock.set_fail_writes(false);
        assert!(matches!(sink.stop(), Err(Error::Connection { .. })));
        assert!(matches!(sink.close(), Err(Error::Connection { .. })));
        assert!(sink.last_command().unwrap().is_none());
        assert!(mock.written_lines().is_empty());

        port_present.store(true, Ordering::SeqCst);
        sink.stop().unwrap();
        sink.close().unwrap();
        assert_eq!(mock.written_lines(), ["STOP", "STOP"]);
    }

    #[test]
    fn test_close_sends_stop() {
        let mock = MockTransport::new();
        let sink = mock_sink(&mock);
        sink.send_command(&command(MotionAction::Forward)).unwrap();
        sink.close().unwrap();
        assert!(!sink.is_connected());
        assert_eq!(mock.written_lines(), ["FORWARD", "STOP"]);
        assert!(sink.last_command().unwrap().is_none());
    }
}

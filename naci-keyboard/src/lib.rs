#![doc = include_str!("../README.md")]
#![cfg(unix)]
#![warn(missing_docs, rust_2018_idioms)]

use std::{
    io::{self, Read, Write},
    sync::{
        atomic::{AtomicBool, Ordering::Relaxed},
        Arc,
    },
};

use anyhow::Context as _;
use naci::{async_trait, Error, Operator, OperatorEvent, Policy};
use termios::{tcsetattr, Termios};
use tracing::{debug, error, warn};

const STDIN: i32 = 0;

/// Maps a key to the operator event it triggers, `None` for unbound keys.
pub fn key_event(ch: char) -> Option<OperatorEvent> {
    match ch {
        '1' => Some(OperatorEvent::SelectPolicy(Policy::VfhOnly)),
        '2' => Some(OperatorEvent::SelectPolicy(Policy::ArucoOnly)),
        '3' => Some(OperatorEvent::SelectPolicy(Policy::Hybrid)),
        ' ' => Some(OperatorEvent::EmergencyStop),
        'q' | 'Q' => Some(OperatorEvent::Quit),
        _ => None,
    }
}

fn forward_key(sender: &flume::Sender<OperatorEvent>, b: u8) -> bool {
    if !b.is_ascii() {
        debug!("non-ascii input: {b}");
        return true;
    }
    let Some(event) = key_event(b as char) else {
        debug!("unbound key {:?}", b as char);
        return true;
    };
    debug!("sending {event:?}");
    if let Err(e) = sender.send(event) {
        error!("{e}");
        return false;
    }
    true
}

/// [`naci::Operator`] implementation for the terminal keyboard.
#[derive(Debug)]
pub struct KeyboardOperator {
    receiver: flume::Receiver<OperatorEvent>,
    is_running: Arc<AtomicBool>,
    original: Termios,
}

impl KeyboardOperator {
    /// Switches stdin to unbuffered, no-echo mode and starts reading keys.
    pub fn new() -> Result<Self, Error> {
        let original = Termios::from_fd(STDIN).context("stdin is not a terminal")?;
        let mut raw = original;
        raw.c_lflag &= !(termios::ICANON | termios::ECHO);
        tcsetattr(STDIN, termios::TCSANOW, &raw).context("failed to set terminal mode")?;
        io::stdout()
            .lock()
            .flush()
            .context("failed to flush stdout")?;

        let (sender, receiver) = flume::unbounded();
        let is_running = Arc::new(AtomicBool::new(true));
        let is_running_cloned = is_running.clone();
        std::thread::spawn(move || {
            let mut reader = io::stdin();
            while is_running_cloned.load(Relaxed) {
                let mut buffer = [0; 1];
                if let Err(e) = reader.read_exact(&mut buffer) {
                    warn!("stopped reading keys: {e}");
                    break;
                }
                if !forward_key(&sender, buffer[0]) {
                    break;
                }
            }
            restore(&original);
        });

        Ok(Self {
            receiver,
            is_running,
            original,
        })
    }
}

fn restore(termios: &Termios) {
    if let Err(e) = tcsetattr(STDIN, termios::TCSANOW, termios) {
        error!("failed to restore terminal mode: {e}");
    }
}

#[async_trait]
impl Operator for KeyboardOperator {
    async fn next_event(&self) -> OperatorEvent {
        match self.receiver.recv_async().await {
            Ok(e) => e,
            Err(e) => {
                error!("recv error: {e}");
                OperatorEvent::Unknown
            }
        }
    }

    fn stop(&self) {
        self.is_running.store(false, Relaxed);
    }
}

impl Drop for KeyboardOperator {
    fn drop(&mut self) {
        self.stop();
        restore(&self.original);
    }
}

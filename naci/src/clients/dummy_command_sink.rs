use std::sync::Mutex;

use crate::{error::Error, traits::CommandSink, MotionCommand};

/// Dummy CommandSink for debug or tests. Records every command it receives.
#[derive(Debug, Default)]
pub struct DummyCommandSink {
    pub history: Mutex<Vec<MotionCommand>>,
}

impl DummyCommandSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<MotionCommand> {
        self.history.lock().unwrap().clone()
    }
}

impl CommandSink for DummyCommandSink {
    fn send_command(&self, command: &MotionCommand) -> Result<(), Error> {
        self.history.lock().unwrap().push(*command);
        Ok(())
    }

    fn last_command(&self) -> Result<Option<MotionCommand>, Error> {
        Ok(self.history.lock().unwrap().last().copied())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::MotionAction;

    #[test]
    fn test_set_get() {
        let sink = DummyCommandSink::new();
        assert!(sink.last_command().unwrap().is_none());

        let forward = MotionCommand::new(MotionAction::Forward, Duration::from_millis(400));
        sink.send_command(&forward).unwrap();
        assert_eq!(sink.last_command().unwrap(), Some(forward));

        sink.stop().unwrap();
        assert_eq!(sink.last_command().unwrap(), Some(MotionCommand::stop()));
        assert_eq!(sink.history().len(), 2);
    }
}

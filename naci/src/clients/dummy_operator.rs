use std::{future, sync::Mutex};

use async_trait::async_trait;

use crate::operator::{Operator, OperatorEvent};

/// Dummy Operator for debug or tests.
///
/// Returns the given events in order, then never resolves again.
#[derive(Debug)]
pub struct DummyOperator {
    pub events: Vec<OperatorEvent>,
    index: Mutex<usize>,
    stopped: Mutex<bool>,
}

impl DummyOperator {
    /// Creates a new `DummyOperator` which returns the given events.
    pub fn new(events: Vec<OperatorEvent>) -> Self {
        Self {
            events,
            index: Mutex::default(),
            stopped: Mutex::default(),
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap()
    }
}

#[async_trait]
impl Operator for DummyOperator {
    async fn next_event(&self) -> OperatorEvent {
        {
            let mut index = self.index.lock().unwrap();
            if let Some(event) = self.events.get(*index).copied() {
                *index += 1;
                return event;
            }
        }
        future::pending().await
    }

    fn stop(&self) {
        *self.stopped.lock().unwrap() = true;
    }
}

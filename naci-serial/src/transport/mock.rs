use std::{io, sync::Arc};

use parking_lot::Mutex;

use super::Transport;

/// In-memory transport for tests and dry runs.
///
/// Clones share the same buffer, so a test can keep one handle and give another to the sink.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    written: Vec<u8>,
    fail_writes: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written(&self) -> Vec<u8> {
        self.inner.lock().written.clone()
    }

    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.inner.lock().written)
            .lines()
            .map(str::to_owned)
            .collect()
    }

    pub fn clear_written(&self) {
        self.inner.lock().written.clear();
    }

    /// Makes every following write fail as if the cable was pulled.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock transport broken"));
        }
        inner.written.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

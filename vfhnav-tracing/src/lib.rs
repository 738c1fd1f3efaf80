#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]

pub mod de;

use tracing::trace;

#[derive(Debug)]
pub struct Tracing<T>(T);

impl<T> Tracing<T> {
    pub fn new(v: T) -> Self {
        Self(v)
    }

    pub fn get_ref(&self) -> &T {
        &self.0
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Tracing<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: naci::DepthSource> naci::DepthSource for Tracing<T> {
    fn current_cloud(&self) -> Result<naci::PointCloud, naci::Error> {
        let cloud = self.0.current_cloud()?;
        trace!(method = "naci::DepthSource::current_cloud", points = cloud.len());
        Ok(cloud)
    }
}

impl<T: naci::MarkerSource> naci::MarkerSource for Tracing<T> {
    fn current_marker(&self) -> Result<Option<naci::MarkerDetection>, naci::Error> {
        let detection = self.0.current_marker()?;
        trace!(
            method = "naci::MarkerSource::current_marker",
            id = detection.map(|d| d.id),
            x_fraction = detection.map(|d| d.x_fraction),
            distance = detection.and_then(|d| d.distance),
        );
        Ok(detection)
    }
}

impl<T: naci::CommandSink> naci::CommandSink for Tracing<T> {
    fn send_command(&self, command: &naci::MotionCommand) -> Result<(), naci::Error> {
        trace!(
            method = "naci::CommandSink::send_command",
            action = %command.action,
            duration_secs = command.duration.as_secs(),
            duration_nanos = command.duration.subsec_nanos(),
        );
        self.0.send_command(command)
    }

    fn last_command(&self) -> Result<Option<naci::MotionCommand>, naci::Error> {
        let command = self.0.last_command()?;
        trace!(method = "naci::CommandSink::last_command", ?command);
        Ok(command)
    }

    fn stop(&self) -> Result<(), naci::Error> {
        trace!(method = "naci::CommandSink::stop");
        self.0.stop()
    }

    fn close(&self) -> Result<(), naci::Error> {
        trace!(method = "naci::CommandSink::close");
        self.0.close()
    }
}

#[naci::async_trait]
impl<T: naci::Operator> naci::Operator for Tracing<T> {
    async fn next_event(&self) -> naci::OperatorEvent {
        let event = self.0.next_event().await;
        trace!(method = "naci::Operator::next_event", ?event);
        event
    }

    fn stop(&self) {
        trace!(method = "naci::Operator::stop");
        self.0.stop()
    }
}

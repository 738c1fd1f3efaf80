mod dummy_command_sink;
mod dummy_depth_source;
mod dummy_marker_source;
mod dummy_operator;

pub use dummy_command_sink::*;
pub use dummy_depth_source::*;
pub use dummy_marker_source::*;
pub use dummy_operator::*;

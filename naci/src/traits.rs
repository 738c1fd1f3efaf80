mod command_sink;
mod depth_source;
mod marker_source;
pub mod operator;

pub use command_sink::*;
pub use depth_source::*;
pub use marker_source::*;
pub use operator::{Operator, OperatorEvent, Policy};

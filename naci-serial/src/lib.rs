#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]

mod config;
mod sink;
mod transport;

pub use config::*;
pub use sink::*;
pub use transport::*;

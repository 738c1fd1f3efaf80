#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]

mod config;
mod control_loop;
mod error;
pub mod overrides;
mod replay;
pub mod utils;

pub use config::*;
pub use control_loop::*;
pub use error::*;
pub use replay::*;

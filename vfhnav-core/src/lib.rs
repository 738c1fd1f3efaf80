#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]

mod arbiter;
mod config;
mod depth;
mod error;
mod histogram;
mod maneuver;
mod marker;
mod navigator;
mod obstacle;

pub use arbiter::*;
pub use config::*;
pub use depth::*;
pub use error::*;
pub use histogram::*;
pub use maneuver::*;
pub use marker::*;
pub use navigator::*;
pub use obstacle::*;

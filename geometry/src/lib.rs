//! Sizes, points and scale transforms tagged with pixel or ratio units.

mod common;

pub use hw::*;
pub mod hw;

pub use xy::*;
pub mod xy;

pub use transform::*;
mod transform;

pub use unit::*;
pub mod unit;

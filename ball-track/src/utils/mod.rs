//! Misc utilities.

mod cancel;
pub mod checkpoint;

pub use cancel::*;
pub use checkpoint::*;

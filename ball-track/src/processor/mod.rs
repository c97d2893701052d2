//! Data preprocessing building blocks.

pub mod normalizer;

pub use normalizer::*;

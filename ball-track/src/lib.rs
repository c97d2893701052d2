//! Frame normalization, label alignment and dataset indexing for ball tracking.

mod common;
pub mod aligner;
pub mod artifact;
pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod processor;
pub mod profiling;
pub mod utils;

pub use error::{Error, Result};

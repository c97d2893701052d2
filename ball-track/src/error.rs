//! Error taxonomy of the preprocessing components.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An image or a persisted artifact cannot be decoded.
    #[error("failed to decode '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    /// An index entry has no paired label artifact.
    #[error("label artifact '{path}' of entry {entry} is missing")]
    MissingLabel { entry: String, path: PathBuf },

    /// A tensor does not have the expected shape.
    #[error("shape mismatch in '{path}': expect {expect:?}, but get {actual:?}")]
    ShapeMismatch {
        path: PathBuf,
        expect: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The source image dimensions of a clip cannot be determined.
    #[error("failed to determine image dimensions of clip '{clip}': {reason}")]
    DimensionLookup { clip: PathBuf, reason: String },

    /// An annotation table or one of its rows is malformed.
    #[error("invalid annotation in '{path}': {reason}")]
    Annotation { path: PathBuf, reason: String },

    #[error("index {index} is out of range for {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("processing '{path}' did not finish within {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("worker processing '{path}' failed: {reason}")]
    Worker { path: PathBuf, reason: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns true for per-item preprocessing failures that a batch may skip.
    ///
    /// Integrity failures at consumption time, such as a missing label, are not skippable.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. }
                | Self::DimensionLookup { .. }
                | Self::Annotation { .. }
                | Self::Io { .. }
                | Self::Timeout { .. }
                | Self::Worker { .. }
        )
    }

    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_owned(),
            source,
        }
    }

    pub(crate) fn decode(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.as_ref().to_owned(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn annotation(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Annotation {
            path: path.as_ref().to_owned(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn dimension_lookup(clip: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::DimensionLookup {
            clip: clip.as_ref().to_owned(),
            reason: reason.to_string(),
        }
    }
}

//! Common imports from external crates.

pub use anyhow::{Context, Result};
pub use ball_track::{
    aligner::LabelAligner,
    artifact,
    batch::{self, BatchOptions, BatchReport},
    config::{
        AlignerConfig, ArtifactNaming, ClipGeometry, LabelFields, MissingCoordinates,
        NormalizerConfig, ReferenceStats, ResizeFilter,
    },
    dataset::{DatasetIndex, RandomAccessDataset, SplitFile},
    processor::FrameNormalizer,
    utils::Cancellation,
};
pub use geometry::HW;
pub use noisy_float::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
pub use tracing::{error, info, info_span, warn, Instrument};

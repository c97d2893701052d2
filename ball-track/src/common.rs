pub use crate::error::{Error, Result};
pub use futures::{
    future::FutureExt as _,
    stream::{self, BoxStream, StreamExt as _},
};
pub use geometry::{Pixel, Transform, HW};
pub use image::{imageops::FilterType, DynamicImage};
pub use itertools::Itertools as _;
pub use label::{AnnotationRow, MotionPhase, NormalizedRow, Visibility};
pub use log::{debug, info, warn};
pub use ndarray::{Array1, Array3, ArrayD, Ix1, Ix3};
pub use noisy_float::prelude::*;
pub use once_cell::sync::Lazy;
pub use rand::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    collections::HashMap,
    convert::TryFrom,
    fmt::Debug,
    fs,
    future::Future,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};

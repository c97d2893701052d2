//! Preprocessing program configuration format.

use crate::common::*;

/// The main preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    /// The spatial size of normalized frames.
    pub image_size: HW<usize>,
    #[serde(default)]
    pub normalizer: NormalizerOptions,
    #[serde(default)]
    pub aligner: AlignerOptions,
    pub split: SplitConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }

    pub fn normalizer_config(&self) -> NormalizerConfig {
        let NormalizerOptions { reference, filter } = self.normalizer;
        NormalizerConfig {
            image_size: self.image_size,
            reference,
            filter,
        }
    }

    pub fn aligner_config(&self) -> AlignerConfig {
        let AlignerOptions {
            fields,
            geometry,
            missing_coordinates,
        } = self.aligner;
        AlignerConfig {
            image_size: self.image_size,
            fields,
            geometry,
            naming: self.dataset.naming,
            missing_coordinates,
        }
    }

    pub fn batch_options(&self, cancel: Cancellation) -> BatchOptions {
        let WorkerConfig {
            max_workers,
            item_timeout_secs,
        } = self.worker;
        BatchOptions {
            max_workers: max_workers.map(|num| num.get()),
            item_timeout: item_timeout_secs.map(Duration::from_secs),
            cancel,
        }
    }
}

/// Dataset location and artifact naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// The directory containing `<game>/<clip>/` directories.
    pub dir: PathBuf,
    #[serde(default)]
    pub naming: ArtifactNaming,
}

/// Frame normalization options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NormalizerOptions {
    #[serde(default)]
    pub reference: ReferenceStats,
    #[serde(default)]
    pub filter: ResizeFilter,
}

/// Label alignment options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AlignerOptions {
    #[serde(default)]
    pub fields: LabelFields,
    #[serde(default)]
    pub geometry: ClipGeometry,
    #[serde(default)]
    pub missing_coordinates: MissingCoordinates,
}

/// Train/validation partition options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    pub validation_ratio: R64,
    /// If set, the partition is reproducible across runs.
    pub seed: Option<u64>,
    /// The file to save the partition to.
    pub output_file: PathBuf,
}

/// Worker pool options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// The number of concurrent items. It defaults to the number of CPUs.
    pub max_workers: Option<NonZeroUsize>,
    /// The time limit of each frame or clip.
    pub item_timeout_secs: Option<u64>,
}

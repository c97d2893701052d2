//! Component configuration, threaded through the component constructors.

use crate::common::*;

/// Per-channel reference statistics of the corpus the backbone was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStats {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl ReferenceStats {
    /// The ImageNet statistics.
    pub const IMAGENET: Self = Self {
        mean: [0.485, 0.456, 0.406],
        std: [0.229, 0.224, 0.225],
    };

    pub fn validate(&self) -> Result<()> {
        if !self.mean.iter().all(|val| val.is_finite()) {
            return Err(Error::Config(format!(
                "mean must be finite, but get {:?}",
                self.mean
            )));
        }
        if !self.std.iter().all(|val| val.is_finite() && *val > 0.0) {
            return Err(Error::Config(format!(
                "std must be finite and positive, but get {:?}",
                self.std
            )));
        }
        Ok(())
    }
}

impl Default for ReferenceStats {
    fn default() -> Self {
        Self::IMAGENET
    }
}

/// The interpolation policy used to resize frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    /// Bilinear interpolation.
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl Default for ResizeFilter {
    fn default() -> Self {
        Self::Triangle
    }
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Frame normalizer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// The output spatial size.
    pub image_size: HW<usize>,
    #[serde(default)]
    pub reference: ReferenceStats,
    #[serde(default)]
    pub filter: ResizeFilter,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            image_size: default_image_size(),
            reference: ReferenceStats::default(),
            filter: ResizeFilter::default(),
        }
    }
}

/// The file naming rule of persisted label artifacts.
///
/// The aligner and the dataset index must agree on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactNaming {
    /// `0000.jpg` is labeled by `0000_labels.npy`.
    Stem,
    /// `0000.jpg` is labeled by `0000.jpg_labels.npy`.
    FileName,
}

impl Default for ArtifactNaming {
    fn default() -> Self {
        Self::Stem
    }
}

/// The fields stored in each label artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFields {
    /// `[x, y]`
    Coordinates,
    /// `[x, y, visibility, status]`, where absent codes are stored as -1.
    WithMetadata,
}

impl LabelFields {
    pub fn num_values(&self) -> usize {
        match self {
            Self::Coordinates => 2,
            Self::WithMetadata => 4,
        }
    }
}

impl Default for LabelFields {
    fn default() -> Self {
        Self::Coordinates
    }
}

/// Where the source image size of a clip comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClipGeometry {
    /// Read the header of the first frame of the clip in sorted order.
    Probe,
    /// All clips share the given size.
    Fixed { height: usize, width: usize },
}

impl Default for ClipGeometry {
    fn default() -> Self {
        Self::Probe
    }
}

/// The treatment of annotation rows without coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCoordinates {
    /// Abort the clip.
    Fail,
    /// Skip the row and write no label for it.
    Skip,
}

impl Default for MissingCoordinates {
    fn default() -> Self {
        Self::Fail
    }
}

/// Label aligner options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// The spatial size of normalized frames.
    pub image_size: HW<usize>,
    #[serde(default)]
    pub fields: LabelFields,
    #[serde(default)]
    pub geometry: ClipGeometry,
    #[serde(default)]
    pub naming: ArtifactNaming,
    #[serde(default)]
    pub missing_coordinates: MissingCoordinates,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            image_size: default_image_size(),
            fields: LabelFields::default(),
            geometry: ClipGeometry::default(),
            naming: ArtifactNaming::default(),
            missing_coordinates: MissingCoordinates::default(),
        }
    }
}

fn default_image_size() -> HW<usize> {
    HW::from_hw([224, 224])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imagenet_stats_are_valid() {
        ReferenceStats::default().validate().unwrap();
    }

    #[test]
    fn zero_std_is_rejected() {
        let stats = ReferenceStats {
            mean: [0.0; 3],
            std: [1.0, 0.0, 1.0],
        };
        assert!(matches!(stats.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn deserialize_aligner_config() {
        let text = r#"{
            "image_size": { "height": 360, "width": 640 },
            "fields": "with_metadata",
            "geometry": { "type": "fixed", "height": 720, "width": 1280 },
            "naming": "file_name"
        }"#;
        let config: AlignerConfig = serde_json::from_str(text).unwrap();
        assert_eq!(config.image_size.hw(), [360, 640]);
        assert_eq!(config.fields, LabelFields::WithMetadata);
        assert_eq!(
            config.geometry,
            ClipGeometry::Fixed {
                height: 720,
                width: 1280
            }
        );
        assert_eq!(config.naming, ArtifactNaming::FileName);
        assert_eq!(config.missing_coordinates, MissingCoordinates::Fail);
    }
}

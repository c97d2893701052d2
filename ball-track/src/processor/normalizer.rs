//! Resizing and per-channel standardization of frames.

use crate::{
    artifact,
    common::*,
    config::{ArtifactNaming, NormalizerConfig},
    profiling::Timing,
    utils::ItemGuard,
};

/// Turns decoded frames into fixed-size, standardized CHW tensors.
#[derive(Debug, Clone)]
pub struct FrameNormalizer {
    config: NormalizerConfig,
}

impl FrameNormalizer {
    /// Build a normalizer after validating the configuration.
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        if !config.image_size.is_positive() {
            return Err(Error::Config(format!(
                "image_size must be positive, but get {:?}",
                config.image_size
            )));
        }
        u32::try_from(config.image_size.h())
            .and(u32::try_from(config.image_size.w()))
            .map_err(|_| Error::Config("image_size is too large".into()))?;
        config.reference.validate()?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// The output shape, `[3, height, width]`.
    pub fn output_shape(&self) -> [usize; 3] {
        let [h, w] = self.config.image_size.hw();
        [3, h, w]
    }

    /// Resize and standardize a decoded image.
    ///
    /// The image is converted to 8-bit RGB whatever its source color model is.
    pub fn normalize_image(&self, image: &DynamicImage) -> Result<Array3<f32>> {
        let NormalizerConfig {
            image_size,
            reference,
            filter,
        } = self.config;
        let [out_h, out_w] = image_size.hw();

        let rgb = image.to_rgb8();
        let (in_w, in_h) = rgb.dimensions();
        if in_w == 0 || in_h == 0 {
            return Err(Error::ShapeMismatch {
                path: PathBuf::new(),
                expect: vec![3, out_h, out_w],
                actual: vec![3, in_h as usize, in_w as usize],
            });
        }

        let resized = image::imageops::resize(&rgb, out_w as u32, out_h as u32, filter.into());
        let tensor = Array3::from_shape_fn((3, out_h, out_w), |(c, y, x)| {
            let value = resized.get_pixel(x as u32, y as u32).0[c] as f32 / 255.0;
            (value - reference.mean[c]) / reference.std[c]
        });

        Ok(tensor)
    }

    /// Decode and normalize the image file.
    pub fn normalize_file(&self, frame_path: &Path) -> Result<Array3<f32>> {
        let mut timing = Timing::new("normalize_file");

        let image = image::open(frame_path).map_err(|err| match err {
            image::ImageError::IoError(err) => Error::io(frame_path, err),
            err => Error::decode(frame_path, err),
        })?;
        timing.set_record("decode");

        let tensor = self.normalize_image(&image).map_err(|err| match err {
            Error::ShapeMismatch { expect, actual, .. } => Error::ShapeMismatch {
                path: frame_path.to_owned(),
                expect,
                actual,
            },
            err => err,
        })?;
        timing.set_record("resize & standardize");
        timing.report();

        Ok(tensor)
    }

    /// Normalize a frame and persist the tensor next to it.
    ///
    /// It returns the path of the written artifact. The source frame is left untouched.
    pub fn process(&self, frame_path: &Path, naming: ArtifactNaming) -> Result<PathBuf> {
        self.process_guarded(frame_path, naming, &ItemGuard::new())
    }

    /// Like [FrameNormalizer::process], but nothing is written once `guard` is abandoned.
    pub fn process_guarded(
        &self,
        frame_path: &Path,
        naming: ArtifactNaming,
        guard: &ItemGuard,
    ) -> Result<PathBuf> {
        let tensor = self.normalize_file(frame_path)?;
        let output_path = naming.frame_artifact(frame_path)?;
        guard.commit()?;
        artifact::write_frame(&output_path, &tensor)?;
        Ok(output_path)
    }
}

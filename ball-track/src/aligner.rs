//! Alignment of per-clip ball annotations to the normalized frame space.

use crate::{
    artifact::{self, ANNOTATION_FILE, FRAME_EXTENSION, NORMALIZED_ANNOTATION_FILE},
    common::*,
    config::{AlignerConfig, ClipGeometry, LabelFields, MissingCoordinates},
    layout,
    utils::ItemGuard,
};

/// One aligned row of an annotation table.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    /// The frame identity, the stem of the row's file name.
    pub base_name: String,
    /// The persisted label vector.
    pub values: Array1<f32>,
    /// The row of the updated annotation table.
    pub row: NormalizedRow,
}

/// The outcome of aligning a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipSummary {
    pub labels_written: usize,
    pub rows_skipped: usize,
}

/// Computes and persists normalized ball labels for clips.
#[derive(Debug, Clone)]
pub struct LabelAligner {
    config: AlignerConfig,
}

impl LabelAligner {
    pub fn new(config: AlignerConfig) -> Result<Self> {
        if !config.image_size.is_positive() {
            return Err(Error::Config(format!(
                "image_size must be positive, but get {:?}",
                config.image_size
            )));
        }
        if let ClipGeometry::Fixed { height, width } = config.geometry {
            if height == 0 || width == 0 {
                return Err(Error::Config(format!(
                    "fixed clip geometry must be positive, but get {}x{}",
                    width, height
                )));
            }
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Determine the source image size of a clip.
    pub fn clip_size(&self, clip_dir: &Path) -> Result<Pixel<HW<f64>>> {
        let [h, w] = match self.config.geometry {
            ClipGeometry::Fixed { height, width } => [height, width],
            ClipGeometry::Probe => {
                let frames = layout::list_files(clip_dir, FRAME_EXTENSION)
                    .map_err(|err| Error::dimension_lookup(clip_dir, err))?;
                let first = frames
                    .first()
                    .ok_or_else(|| Error::dimension_lookup(clip_dir, "no representative image found"))?;
                let imagesize::ImageSize { width, height } = imagesize::size(first)
                    .map_err(|err| {
                        Error::dimension_lookup(clip_dir, format!("{}: {:?}", first.display(), err))
                    })?;
                if width == 0 || height == 0 {
                    return Err(Error::dimension_lookup(
                        clip_dir,
                        format!("'{}' has an empty image", first.display()),
                    ));
                }
                [height, width]
            }
        };

        Ok(Pixel(HW::from_hw([h as f64, w as f64])))
    }

    /// Align the rows of an annotation table given the source image size.
    ///
    /// Rows without coordinates are skipped or rejected according to the configuration.
    /// `table_path` only serves error reporting.
    pub fn align_rows(
        &self,
        rows: &[AnnotationRow],
        orig_size: &Pixel<HW<f64>>,
        table_path: &Path,
    ) -> Result<Vec<AlignedRow>> {
        let target_size = Pixel(self.config.image_size.cast::<f64>());
        let transform = Transform::from_sizes_exact(orig_size, &target_size)
            .map_err(|err| Error::annotation(table_path, err))?;

        let mut aligned = Vec::with_capacity(rows.len());

        for row in rows {
            let base_name = artifact::base_name(&row.file_name)
                .map_err(|err| Error::annotation(table_path, err))?;
            let pixel_label = row
                .to_pixel_label()
                .map_err(|err| Error::annotation(table_path, err))?;

            let pixel_label = match (pixel_label, self.config.missing_coordinates) {
                (Some(label), _) => label,
                (None, MissingCoordinates::Skip) => {
                    debug!(
                        "skip '{}' without coordinates in '{}'",
                        row.file_name.display(),
                        table_path.display()
                    );
                    continue;
                }
                (None, MissingCoordinates::Fail) => {
                    return Err(Error::annotation(
                        table_path,
                        format!("'{}' has no coordinates", row.file_name.display()),
                    ));
                }
            };

            // scale into the target resolution, then normalize by it
            let resized = &transform * &pixel_label;
            let ratio = resized.to_ratio_label(&target_size);

            if !ratio.point.is_unit_range() {
                warn!(
                    "label ({}, {}) of '{}' in '{}' lies outside of the image",
                    ratio.point.x(),
                    ratio.point.y(),
                    row.file_name.display(),
                    table_path.display()
                );
            }

            let [x, y] = ratio.point.cast::<f32>().xy();
            let values = match self.config.fields {
                LabelFields::Coordinates => vec![x, y],
                LabelFields::WithMetadata => vec![
                    x,
                    y,
                    ratio.visibility.map_or(-1.0, |v| v.code() as f32),
                    ratio.status.map_or(-1.0, |s| s.code() as f32),
                ],
            };

            aligned.push(AlignedRow {
                base_name,
                values: Array1::from(values),
                row: NormalizedRow {
                    file_name: row.file_name.clone(),
                    visibility: ratio.visibility,
                    status: ratio.status,
                    x,
                    y,
                },
            });
        }

        Ok(aligned)
    }

    /// Align a clip and persist one label artifact per row plus the updated table.
    ///
    /// Any failure aborts the clip. Labels written before the failure are kept.
    pub fn align_clip(&self, clip_dir: &Path) -> Result<ClipSummary> {
        self.align_clip_guarded(clip_dir, &ItemGuard::new())
    }

    /// Like [LabelAligner::align_clip], but nothing is written once `guard` is abandoned.
    pub fn align_clip_guarded(&self, clip_dir: &Path, guard: &ItemGuard) -> Result<ClipSummary> {
        let table_path = clip_dir.join(ANNOTATION_FILE);
        let rows = read_annotation_table(&table_path)?;
        let orig_size = self.clip_size(clip_dir)?;
        let aligned = self.align_rows(&rows, &orig_size, &table_path)?;

        guard.commit()?;

        for AlignedRow {
            base_name, values, ..
        } in &aligned
        {
            let path = self.config.naming.label_artifact(clip_dir, base_name);
            artifact::write_label(&path, values)?;
        }

        let output_path = clip_dir.join(NORMALIZED_ANNOTATION_FILE);
        write_normalized_table(&output_path, aligned.iter().map(|aligned| &aligned.row))?;

        let summary = ClipSummary {
            labels_written: aligned.len(),
            rows_skipped: rows.len() - aligned.len(),
        };
        debug!(
            "aligned {} labels in '{}'",
            summary.labels_written,
            clip_dir.display()
        );

        Ok(summary)
    }
}

/// Parse a clip's annotation table.
pub fn read_annotation_table(path: &Path) -> Result<Vec<AnnotationRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| csv_error(path, err))?;
    let rows: Vec<AnnotationRow> = reader
        .deserialize()
        .try_collect()
        .map_err(|err| csv_error(path, err))?;
    Ok(rows)
}

fn write_normalized_table<'a>(
    path: &Path,
    rows: impl IntoIterator<Item = &'a NormalizedRow>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|err| csv_error(path, err))?;
    for row in rows {
        writer.serialize(row).map_err(|err| csv_error(path, err))?;
    }
    writer.flush().map_err(|err| Error::io(path, err))?;
    Ok(())
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(err) => Error::io(path, err),
            kind => Error::annotation(path, format!("{:?}", kind)),
        }
    } else {
        Error::annotation(path, err)
    }
}

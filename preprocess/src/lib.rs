//! The preprocessing program for ball-track datasets.

pub mod common;
pub mod config;

use crate::{common::*, config::Config};

/// Preprocessing steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Write normalized frame tensors.
    Normalize,
    /// Write normalized label vectors and the updated annotation tables.
    Align,
    /// Scan the artifacts and report the dataset size.
    Index,
    /// Partition the indexed records and save the partition.
    Split,
    /// Remove every persisted artifact.
    Clean,
    /// Normalize, align, then split.
    All,
}

/// The entry of preprocessing program.
pub async fn start(config: Arc<Config>, command: Command, cancel: Cancellation) -> Result<()> {
    match command {
        Command::Normalize => {
            normalize(&config, &cancel)
                .instrument(info_span!("normalize"))
                .await?;
        }
        Command::Align => {
            align(&config, &cancel)
                .instrument(info_span!("align"))
                .await?;
        }
        Command::Index => {
            let _span = info_span!("index").entered();
            let index = scan(&config, &cancel)?;
            info!("{} records in '{}'", index.num_records(), index.root().display());
        }
        Command::Split => {
            let _span = info_span!("split").entered();
            split(&config, &cancel)?;
        }
        Command::Clean => {
            let _span = info_span!("clean").entered();
            let count = artifact::clean_artifacts(&config.dataset.dir, &cancel)?;
            info!("removed {} artifacts", count);
        }
        Command::All => {
            normalize(&config, &cancel)
                .instrument(info_span!("normalize"))
                .await?;
            align(&config, &cancel)
                .instrument(info_span!("align"))
                .await?;
            let _span = info_span!("split").entered();
            split(&config, &cancel)?;
        }
    }

    Ok(())
}

async fn normalize(config: &Config, cancel: &Cancellation) -> Result<BatchReport> {
    let normalizer = Arc::new(
        FrameNormalizer::new(config.normalizer_config())
            .context("invalid normalizer configuration")?,
    );
    let report = batch::normalize_dataset(
        &config.dataset.dir,
        normalizer,
        config.dataset.naming,
        &config.batch_options(cancel.clone()),
    )
    .await
    .with_context(|| {
        format!(
            "failed to normalize frames in '{}'",
            config.dataset.dir.display()
        )
    })?;
    summarize("frames", &report);
    Ok(report)
}

async fn align(config: &Config, cancel: &Cancellation) -> Result<BatchReport> {
    let aligner = Arc::new(
        LabelAligner::new(config.aligner_config()).context("invalid aligner configuration")?,
    );
    let report = batch::align_dataset(
        &config.dataset.dir,
        aligner,
        &config.batch_options(cancel.clone()),
    )
    .await
    .with_context(|| {
        format!(
            "failed to align labels in '{}'",
            config.dataset.dir.display()
        )
    })?;
    summarize("clips", &report);
    Ok(report)
}

fn scan(config: &Config, cancel: &Cancellation) -> Result<DatasetIndex> {
    let index = DatasetIndex::scan(
        &config.dataset.dir,
        config.dataset.naming,
        config.aligner.fields,
        cancel,
    )
    .with_context(|| format!("failed to index '{}'", config.dataset.dir.display()))?;
    Ok(index)
}

fn split(config: &Config, cancel: &Cancellation) -> Result<SplitFile> {
    let index = scan(config, cancel)?;
    let split_config = &config.split;

    let split = index.split(split_config.validation_ratio, split_config.seed)?;
    let file = index.split_file(&split, split_config.validation_ratio, split_config.seed)?;
    file.save(&split_config.output_file).with_context(|| {
        format!(
            "failed to save split file '{}'",
            split_config.output_file.display()
        )
    })?;

    info!(
        "split {} records into {} train and {} validation records, saved to '{}'",
        index.num_records(),
        file.train.len(),
        file.validation.len(),
        split_config.output_file.display()
    );
    Ok(file)
}

fn summarize(kind: &str, report: &BatchReport) {
    let (skipped, broken): (Vec<_>, Vec<_>) = report
        .failed
        .iter()
        .partition(|item| item.error.is_skippable());

    if !skipped.is_empty() {
        warn!("{} {} were skipped", skipped.len(), kind);
    }
    broken.iter().for_each(|item| {
        error!("{}: {}", item.path.display(), item.error);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn config(root: &Path) -> Config {
        let text = format!(
            r#"{{
                dataset: {{ dir: "{}" }},
                image_size: {{ height: 16, width: 24 }},
                split: {{ validation_ratio: 0.5, seed: 1, output_file: "{}" }},
            }}"#,
            root.display(),
            root.join("split.json").display()
        );
        json5::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn run_all_steps() {
        let dir = tempfile::tempdir().unwrap();
        let clip_dir = dir.path().join("game1").join("Clip1");
        std::fs::create_dir_all(&clip_dir).unwrap();

        let mut table = "file name,visibility,x-coordinate,y-coordinate,status\n".to_string();
        for index in 0..4 {
            RgbImage::from_pixel(64, 48, Rgb([0, 128, 255]))
                .save(clip_dir.join(format!("{:04}.jpg", index)))
                .unwrap();
            table.push_str(&format!("{:04}.jpg,1,{},24,0\n", index, index * 16));
        }
        std::fs::write(clip_dir.join("Label.csv"), table).unwrap();

        let config = Arc::new(config(dir.path()));
        start(config.clone(), Command::All, Cancellation::new())
            .await
            .unwrap();

        let file = SplitFile::load(&config.split.output_file).unwrap();
        assert_eq!(file.train.len(), 2);
        assert_eq!(file.validation.len(), 2);

        start(config, Command::Clean, Cancellation::new())
            .await
            .unwrap();
        assert!(!clip_dir.join("0000.npy").exists());
    }
}

use anyhow::Result;
use ball_track::{
    aligner::LabelAligner,
    artifact,
    batch::{self, BatchOptions},
    config::{AlignerConfig, ArtifactNaming, LabelFields, NormalizerConfig},
    dataset::{DatasetIndex, RandomAccessDataset},
    processor::FrameNormalizer,
    utils::Cancellation,
    Error,
};
use geometry::HW;
use image::{Rgb, RgbImage};
use std::{fs, path::Path, sync::Arc, time::Duration};

const TABLE_HEADER: &str = "file name,visibility,x-coordinate,y-coordinate,status\n";

/// Write a clip of `num_frames` 128x72 frames with a ball moving along the diagonal.
fn write_clip(clip_dir: &Path, num_frames: usize) -> Result<()> {
    fs::create_dir_all(clip_dir)?;
    let mut table = TABLE_HEADER.to_string();

    for index in 0..num_frames {
        let file_name = format!("{:04}.jpg", index);
        let shade = (index * 20) as u8;
        RgbImage::from_pixel(128, 72, Rgb([shade, 64, 255 - shade])).save(clip_dir.join(&file_name))?;
        let x = 128.0 * index as f64 / num_frames as f64;
        let y = 72.0 * index as f64 / num_frames as f64;
        table.push_str(&format!("{},1,{},{},0\n", file_name, x, y));
    }

    fs::write(clip_dir.join(artifact::ANNOTATION_FILE), table)?;
    Ok(())
}

fn components() -> (Arc<FrameNormalizer>, Arc<LabelAligner>) {
    let image_size = HW::from_hw([32, 32]);
    let normalizer = FrameNormalizer::new(NormalizerConfig {
        image_size,
        ..Default::default()
    })
    .unwrap();
    let aligner = LabelAligner::new(AlignerConfig {
        image_size,
        ..Default::default()
    })
    .unwrap();
    (Arc::new(normalizer), Arc::new(aligner))
}

#[tokio::test]
async fn preprocess_then_index() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write_clip(&root.join("game1/Clip1"), 6)?;
    write_clip(&root.join("game1/Clip2"), 4)?;

    // a corrupt frame is skipped and never indexed
    fs::write(root.join("game1/Clip2/0009.jpg"), b"corrupt")?;

    let (normalizer, aligner) = components();
    let options = BatchOptions::default();

    let report =
        batch::normalize_dataset(root, normalizer, ArtifactNaming::Stem, &options).await?;
    assert_eq!(report.succeeded, 10);
    assert_eq!(report.num_failed(), 1);
    assert!(matches!(report.failed[0].error, Error::Decode { .. }));

    let report = batch::align_dataset(root, aligner, &options).await?;
    assert_eq!(report.succeeded, 2);

    let index = DatasetIndex::scan(
        root,
        ArtifactNaming::Stem,
        LabelFields::Coordinates,
        &Cancellation::new(),
    )?;
    assert_eq!(index.num_records(), 10);

    for position in 0..index.num_records() {
        let record = index.get(position)?;
        assert_eq!(record.image.shape(), &[3, 32, 32]);
        assert!(record.image.iter().all(|value| value.is_finite()));
        assert!(record
            .label
            .iter()
            .all(|value| (0.0..=1.0).contains(value)));
    }

    // repeated retrieval is byte-identical
    let first = index.nth(3).await?;
    let second = index.nth(3).await?;
    assert_eq!(first, second);

    // clip 1 frame 3 of 6
    assert!((first.label[0] - 0.5).abs() < 1e-6);
    assert!((first.label[1] - 0.5).abs() < 1e-6);

    Ok(())
}

#[tokio::test]
async fn missing_label_fails_retrieval() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write_clip(&root.join("game1/Clip1"), 10)?;

    let (normalizer, aligner) = components();
    let options = BatchOptions::default();
    batch::normalize_dataset(root, normalizer, ArtifactNaming::Stem, &options).await?;
    batch::align_dataset(root, aligner, &options).await?;

    fs::remove_file(root.join("game1/Clip1/0005_labels.npy"))?;

    let index = DatasetIndex::scan(
        root,
        ArtifactNaming::Stem,
        LabelFields::Coordinates,
        &Cancellation::new(),
    )?;
    assert_eq!(index.num_records(), 10);
    assert!(index.get(4).is_ok());

    match index.get(5) {
        Err(Error::MissingLabel { entry, .. }) => assert_eq!(entry, "game1/Clip1/0005"),
        other => panic!("unexpected result {:?}", other),
    }
    assert!(matches!(
        index.nth(5).await,
        Err(Error::MissingLabel { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn failed_clip_does_not_stop_alignment() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write_clip(&root.join("game1/Clip1"), 3)?;

    // a clip with a table but without frames
    let empty_clip = root.join("game1/Clip2");
    fs::create_dir_all(&empty_clip)?;
    fs::write(
        empty_clip.join(artifact::ANNOTATION_FILE),
        format!("{}0000.jpg,1,10,10,0\n", TABLE_HEADER),
    )?;

    let (_, aligner) = components();
    let report = batch::align_dataset(root, aligner, &BatchOptions::default()).await?;

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed[0].path, empty_clip);
    assert!(matches!(
        report.failed[0].error,
        Error::DimensionLookup { .. }
    ));
    assert!(root.join("game1/Clip1/0002_labels.npy").is_file());

    Ok(())
}

#[tokio::test]
async fn file_name_naming_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write_clip(&root.join("game1/Clip1"), 2)?;

    let image_size = HW::from_hw([32, 32]);
    let normalizer = FrameNormalizer::new(NormalizerConfig {
        image_size,
        ..Default::default()
    })?;
    let aligner = LabelAligner::new(AlignerConfig {
        image_size,
        naming: ArtifactNaming::FileName,
        ..Default::default()
    })?;
    let options = BatchOptions::default();

    batch::normalize_dataset(
        root,
        Arc::new(normalizer),
        ArtifactNaming::FileName,
        &options,
    )
    .await?;
    batch::align_dataset(root, Arc::new(aligner), &options).await?;
    assert!(root.join("game1/Clip1/0001.jpg_labels.npy").is_file());

    let index = DatasetIndex::scan(
        root,
        ArtifactNaming::FileName,
        LabelFields::Coordinates,
        &Cancellation::new(),
    )?;
    let names: Vec<_> = index.entries().iter().map(ToString::to_string).collect();
    assert_eq!(names, ["game1/Clip1/0000", "game1/Clip1/0001"]);

    // frame 1 of 2 sits at the image center
    let record = index.get(1)?;
    assert!((record.label[0] - 0.5).abs() < 1e-6);
    assert!((record.label[1] - 0.5).abs() < 1e-6);
    assert_eq!(record.image.shape(), &[3, 32, 32]);

    Ok(())
}

#[test]
fn timed_out_frame_is_never_indexed() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let clip_dir = dir.path().join("game1/Clip1");
    fs::create_dir_all(&clip_dir)?;
    RgbImage::from_pixel(4000, 3000, Rgb([10, 200, 30])).save(clip_dir.join("0000.jpg"))?;

    let (normalizer, _) = components();
    let options = BatchOptions {
        item_timeout: Some(Duration::from_millis(1)),
        ..Default::default()
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(batch::normalize_dataset(
        dir.path(),
        normalizer,
        ArtifactNaming::Stem,
        &options,
    ))?;
    // let the abandoned worker run to its end
    runtime.shutdown_timeout(Duration::from_secs(120));

    assert_eq!(report.succeeded, 0);
    assert!(matches!(report.failed[0].error, Error::Timeout { .. }));
    assert!(!clip_dir.join("0000.npy").exists());

    let index = DatasetIndex::scan(
        dir.path(),
        ArtifactNaming::Stem,
        LabelFields::Coordinates,
        &Cancellation::new(),
    )?;
    assert_eq!(index.num_records(), 0);

    Ok(())
}

#[test]
fn aligner_is_idempotent() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let clip_dir = dir.path().join("game1/Clip1");
    write_clip(&clip_dir, 5)?;

    let (_, aligner) = components();
    let read_all = || -> Result<Vec<Vec<u8>>> {
        let mut files = vec![fs::read(clip_dir.join(artifact::NORMALIZED_ANNOTATION_FILE))?];
        for index in 0..5 {
            files.push(fs::read(clip_dir.join(format!("{:04}_labels.npy", index)))?);
        }
        Ok(files)
    };

    aligner.align_clip(&clip_dir)?;
    let first = read_all()?;
    aligner.align_clip(&clip_dir)?;
    let second = read_all()?;
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn clean_removes_artifacts_only() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let clip_dir = dir.path().join("game1/Clip1");
    write_clip(&clip_dir, 2)?;

    let (normalizer, aligner) = components();
    for index in 0..2 {
        normalizer.process(&clip_dir.join(format!("{:04}.jpg", index)), ArtifactNaming::Stem)?;
    }
    aligner.align_clip(&clip_dir)?;

    let removed = artifact::clean_artifacts(dir.path(), &Cancellation::new())?;
    assert_eq!(removed, 4);
    assert!(clip_dir.join("0000.jpg").is_file());
    assert!(clip_dir.join(artifact::ANNOTATION_FILE).is_file());

    Ok(())
}

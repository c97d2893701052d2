use ball_track::config::{ArtifactNaming, ClipGeometry, LabelFields, MissingCoordinates};
use noisy_float::prelude::*;
use preprocess::{common::Cancellation, config::Config};
use std::{path::Path, time::Duration};

#[test]
fn load_sample_config() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("preprocess.json5");
    let config = Config::open(path).unwrap();

    assert_eq!(config.dataset.naming, ArtifactNaming::Stem);
    assert_eq!(config.split.validation_ratio, r64(0.2));
    assert_eq!(config.split.seed, Some(42));

    let normalizer = config.normalizer_config();
    assert_eq!(normalizer.image_size.h(), 224);
    assert_eq!(normalizer.image_size.w(), 224);

    let aligner = config.aligner_config();
    assert_eq!(aligner.fields, LabelFields::Coordinates);
    assert_eq!(aligner.geometry, ClipGeometry::Probe);
    assert_eq!(aligner.missing_coordinates, MissingCoordinates::Skip);

    let options = config.batch_options(Cancellation::new());
    assert_eq!(options.max_workers, None);
    assert_eq!(options.item_timeout, Some(Duration::from_secs(60)));
}

#[test]
fn optional_sections_take_defaults() {
    let config: Config = json5::from_str(
        r#"{
            dataset: { dir: "data", naming: "file_name" },
            image_size: { height: 64, width: 96 },
            aligner: { geometry: { type: "fixed", height: 720, width: 1280 } },
            split: { validation_ratio: 0.1, output_file: "split.json" },
        }"#,
    )
    .unwrap();

    let aligner = config.aligner_config();
    assert_eq!(aligner.naming, ArtifactNaming::FileName);
    assert_eq!(
        aligner.geometry,
        ClipGeometry::Fixed {
            height: 720,
            width: 1280
        }
    );
    assert_eq!(aligner.image_size.w(), 96);
    assert_eq!(config.split.seed, None);
    assert_eq!(config.batch_options(Cancellation::new()).item_timeout, None);
}

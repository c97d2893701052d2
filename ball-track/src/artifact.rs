//! Artifact naming conventions and numpy persistence.

use crate::{common::*, config::ArtifactNaming, utils::Cancellation};
use ndarray_npy::{read_npy, write_npy};

/// The annotation table of a clip.
pub const ANNOTATION_FILE: &str = "Label.csv";
/// The updated copy of the annotation table written by the aligner.
pub const NORMALIZED_ANNOTATION_FILE: &str = "Label_normalized.csv";
pub const FRAME_EXTENSION: &str = "jpg";
pub const ARTIFACT_EXTENSION: &str = "npy";
const LABEL_SUFFIX: &str = "_labels";

impl ArtifactNaming {
    /// The normalized frame artifact of a source frame, `<stem>.npy` in the same directory.
    pub fn frame_artifact(&self, frame_path: &Path) -> Result<PathBuf> {
        let base = base_name(frame_path)?;
        Ok(frame_path.with_file_name(format!("{}.{}", base, ARTIFACT_EXTENSION)))
    }

    /// The label artifact of the frame with base name `base` in `clip_dir`.
    pub fn label_artifact(&self, clip_dir: &Path, base: &str) -> PathBuf {
        let file_name = match self {
            Self::Stem => format!("{}{}.{}", base, LABEL_SUFFIX, ARTIFACT_EXTENSION),
            Self::FileName => format!(
                "{}.{}{}.{}",
                base, FRAME_EXTENSION, LABEL_SUFFIX, ARTIFACT_EXTENSION
            ),
        };
        clip_dir.join(file_name)
    }

    /// Check if an artifact is a label artifact under this naming rule.
    ///
    /// Under [ArtifactNaming::Stem], `<base>_labels.npy` is a label artifact only if the
    /// frame `<base>` exists beside it. Otherwise it is the artifact of a frame whose own
    /// stem ends in `_labels`.
    pub fn is_label_artifact(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name,
            None => return false,
        };

        match self {
            Self::FileName => name.ends_with(&format!(
                ".{}{}.{}",
                FRAME_EXTENSION, LABEL_SUFFIX, ARTIFACT_EXTENSION
            )),
            Self::Stem => {
                let base = match name.strip_suffix(&format!("{}.{}", LABEL_SUFFIX, ARTIFACT_EXTENSION))
                {
                    Some(base) if !base.is_empty() => base,
                    _ => return false,
                };
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                [FRAME_EXTENSION, ARTIFACT_EXTENSION]
                    .iter()
                    .any(|ext| dir.join(format!("{}.{}", base, ext)).is_file())
            }
        }
    }
}

/// The frame identity shared by a source frame and its artifacts, i.e. the file stem.
pub fn base_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| Error::Config(format!("'{}' has no valid file stem", path.display())))
}

pub fn write_frame(path: &Path, frame: &Array3<f32>) -> Result<()> {
    write_npy(path, frame).map_err(|err| match err {
        ndarray_npy::WriteNpyError::Io(err) => Error::io(path, err),
        err => Error::decode(path, err),
    })
}

/// Read a CHW frame tensor with three channels.
pub fn read_frame(path: &Path) -> Result<Array3<f32>> {
    let array = read_any(path)?;
    let shape = array.shape().to_vec();
    if shape.len() != 3 || shape[0] != 3 {
        return Err(Error::ShapeMismatch {
            path: path.to_owned(),
            expect: vec![3, 0, 0],
            actual: shape,
        });
    }
    array
        .into_dimensionality::<Ix3>()
        .map_err(|err| Error::decode(path, err))
}

pub fn write_label(path: &Path, label: &Array1<f32>) -> Result<()> {
    write_npy(path, label).map_err(|err| match err {
        ndarray_npy::WriteNpyError::Io(err) => Error::io(path, err),
        err => Error::decode(path, err),
    })
}

/// Read a label vector of exactly `len` values.
pub fn read_label(path: &Path, len: usize) -> Result<Array1<f32>> {
    let array = read_any(path)?;
    let shape = array.shape().to_vec();
    if shape != [len] {
        return Err(Error::ShapeMismatch {
            path: path.to_owned(),
            expect: vec![len],
            actual: shape,
        });
    }
    array
        .into_dimensionality::<Ix1>()
        .map_err(|err| Error::decode(path, err))
}

fn read_any(path: &Path) -> Result<ArrayD<f32>> {
    read_npy(path).map_err(|err| match err {
        ndarray_npy::ReadNpyError::Io(err) => Error::io(path, err),
        err => Error::decode(path, err),
    })
}

/// Delete every `.npy` artifact in the clip directories under `root`.
///
/// It returns the number of deleted files.
pub fn clean_artifacts(root: &Path, cancel: &Cancellation) -> Result<usize> {
    let clips = crate::layout::list_clip_dirs(root, cancel)?;
    let mut count = 0;

    for clip in clips {
        for path in crate::layout::list_files(&clip.path, ARTIFACT_EXTENSION)? {
            cancel.check()?;
            fs::remove_file(&path).map_err(|err| Error::io(&path, err))?;
            count += 1;
        }
    }

    info!("removed {} artifacts under '{}'", count, root.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_artifact_naming() {
        let clip = Path::new("game1/Clip1");
        assert_eq!(
            ArtifactNaming::Stem.label_artifact(clip, "0000"),
            clip.join("0000_labels.npy")
        );
        assert_eq!(
            ArtifactNaming::FileName.label_artifact(clip, "0000"),
            clip.join("0000.jpg_labels.npy")
        );
        assert_eq!(
            ArtifactNaming::Stem
                .frame_artifact(&clip.join("0000.jpg"))
                .unwrap(),
            clip.join("0000.npy")
        );
    }

    #[test]
    fn detect_label_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path();
        for name in ["0000.jpg", "x_labels.jpg"] {
            fs::write(clip.join(name), b"").unwrap();
        }

        let stem = ArtifactNaming::Stem;
        assert!(stem.is_label_artifact(&clip.join("0000_labels.npy")));
        assert!(!stem.is_label_artifact(&clip.join("0000.npy")));
        assert!(!stem.is_label_artifact(&clip.join("labels.csv")));
        // the frame artifact of x_labels.jpg
        assert!(!stem.is_label_artifact(&clip.join("x_labels.npy")));
        assert!(stem.is_label_artifact(&clip.join("x_labels_labels.npy")));

        let file_name = ArtifactNaming::FileName;
        assert!(file_name.is_label_artifact(&clip.join("0000.jpg_labels.npy")));
        assert!(!file_name.is_label_artifact(&clip.join("x_labels.npy")));
        assert!(!file_name.is_label_artifact(&clip.join("0000.npy")));
    }

    #[test]
    fn wrong_label_length_is_a_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0000_labels.npy");
        write_label(&path, &Array1::from(vec![0.5f32, 0.5, 1.0])).unwrap();

        assert!(read_label(&path, 3).is_ok());
        assert!(matches!(
            read_label(&path, 2),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(read_frame(&path), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0000.npy");
        fs::write(&path, b"not a numpy file").unwrap();
        assert!(matches!(read_frame(&path), Err(Error::Decode { .. })));
    }
}

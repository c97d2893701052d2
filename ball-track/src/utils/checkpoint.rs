//! Naming of per-epoch model checkpoints.
//!
//! The checkpoint content is an opaque parameter blob produced by the trainer.

use crate::common::*;
use regex::Regex;

static CHECKPOINT_FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^epoch_(\d+)\.ckpt$").unwrap());

/// The checkpoint file of `epoch` in `checkpoint_dir`.
pub fn checkpoint_path(checkpoint_dir: &Path, epoch: usize) -> PathBuf {
    checkpoint_dir.join(format!("epoch_{:04}.ckpt", epoch))
}

/// Save a parameter blob as the checkpoint of `epoch`.
pub fn save_checkpoint(checkpoint_dir: &Path, epoch: usize, blob: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(checkpoint_dir).map_err(|err| Error::io(checkpoint_dir, err))?;
    let path = checkpoint_path(checkpoint_dir, epoch);
    fs::write(&path, blob).map_err(|err| Error::io(&path, err))?;
    info!("saved checkpoint '{}'", path.display());
    Ok(path)
}

/// Find the checkpoint with the largest epoch number.
pub fn latest_checkpoint(checkpoint_dir: &Path) -> Result<Option<(usize, PathBuf)>> {
    if !checkpoint_dir.is_dir() {
        warn!("'{}' is not a directory", checkpoint_dir.display());
        return Ok(None);
    }

    let entries = fs::read_dir(checkpoint_dir).map_err(|err| Error::io(checkpoint_dir, err))?;
    let mut latest: Option<(usize, PathBuf)> = None;

    for entry in entries {
        let path = entry.map_err(|err| Error::io(checkpoint_dir, err))?.path();
        let epoch = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| CHECKPOINT_FILE_NAME.captures(name))
            .and_then(|captures| captures.get(1)?.as_str().parse::<usize>().ok());

        if let Some(epoch) = epoch {
            if latest.as_ref().map_or(true, |(max, _)| epoch > *max) {
                latest = Some((epoch, path));
            }
        }
    }

    if latest.is_none() {
        warn!("no checkpoint file found in '{}'", checkpoint_dir.display());
    }

    Ok(latest)
}

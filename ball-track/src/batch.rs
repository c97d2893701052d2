//! Batch drivers that apply per-item preprocessing over the whole dataset.
//!
//! Items run on blocking worker threads. A failed item is logged and recorded in the
//! [BatchReport], and never stops the other items.

use crate::{
    aligner::LabelAligner,
    artifact::FRAME_EXTENSION,
    common::*,
    config::ArtifactNaming,
    layout::{self, ClipDir},
    processor::FrameNormalizer,
    utils::{Cancellation, ItemGuard},
};

/// Worker pool options of the batch drivers.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of items processed concurrently. It defaults to the number of CPUs.
    pub max_workers: Option<usize>,
    /// The time limit of a single item.
    pub item_timeout: Option<Duration>,
    pub cancel: Cancellation,
}

impl BatchOptions {
    fn num_workers(&self) -> usize {
        self.max_workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// A failed batch item.
#[derive(Debug)]
pub struct FailedItem {
    pub path: PathBuf,
    pub error: Error,
}

/// The outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: Vec<FailedItem>,
}

impl BatchReport {
    pub fn num_failed(&self) -> usize {
        self.failed.len()
    }

    fn record<T>(&mut self, path: PathBuf, result: Result<T>) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(error) => {
                warn!("skip '{}': {}", path.display(), error);
                self.failed.push(FailedItem { path, error });
            }
        }
    }
}

/// Normalize every frame under `root` and persist the tensors.
pub async fn normalize_dataset(
    root: &Path,
    normalizer: Arc<FrameNormalizer>,
    naming: ArtifactNaming,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let frames = list_frames(root, &options.cancel)?;
    info!("normalizing {} frames", frames.len());

    let report = run_items(frames, options, move |path, guard| {
        normalizer
            .process_guarded(&path, naming, &guard)
            .map(|_| ())
    })
    .await?;

    info!(
        "normalized {} frames, {} failed",
        report.succeeded,
        report.num_failed()
    );
    Ok(report)
}

/// Align the annotation table of every clip under `root`.
pub async fn align_dataset(
    root: &Path,
    aligner: Arc<LabelAligner>,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let clips: Vec<_> = layout::list_clip_dirs(root, &options.cancel)?
        .into_iter()
        .map(|ClipDir { path, .. }| path)
        .collect();
    info!("aligning labels of {} clips", clips.len());

    let report = run_items(clips, options, move |clip_dir, guard| {
        aligner.align_clip_guarded(&clip_dir, &guard).map(|_| ())
    })
    .await?;

    info!(
        "aligned {} clips, {} failed",
        report.succeeded,
        report.num_failed()
    );
    Ok(report)
}

fn list_frames(root: &Path, cancel: &Cancellation) -> Result<Vec<PathBuf>> {
    let mut frames = vec![];
    for clip in layout::list_clip_dirs(root, cancel)? {
        cancel.check()?;
        frames.extend(layout::list_files(&clip.path, FRAME_EXTENSION)?);
    }
    Ok(frames)
}

/// Run `f` on each item on blocking threads, at most `num_workers` at a time.
///
/// A timed-out item is abandoned through its [ItemGuard], so it persists nothing. An
/// item that already committed its outputs is awaited to completion instead.
async fn run_items<F>(items: Vec<PathBuf>, options: &BatchOptions, f: F) -> Result<BatchReport>
where
    F: 'static + Fn(PathBuf, ItemGuard) -> Result<()> + Send + Sync,
{
    let f = Arc::new(f);
    let timeout = options.item_timeout;
    let cancel = options.cancel.clone();

    let results: Vec<_> = stream::iter(items)
        .map(move |path| {
            let f = f.clone();
            let cancel = cancel.clone();

            async move {
                if cancel.is_cancelled() {
                    return (path, Err(Error::Cancelled));
                }

                let guard = ItemGuard::new();
                let mut handle = {
                    let path = path.clone();
                    let guard = guard.clone();
                    tokio::task::spawn_blocking(move || f(path, guard))
                };
                let waited = match timeout {
                    Some(timeout) => Some(tokio::time::timeout(timeout, &mut handle).await),
                    None => None,
                };
                let result = match (waited, timeout) {
                    (Some(Ok(joined)), _) => joined,
                    (Some(Err(_)), Some(timeout)) if guard.abandon() => {
                        return (path.clone(), Err(Error::Timeout { path, timeout }))
                    }
                    _ => handle.await,
                };
                let result = result.unwrap_or_else(|err| {
                    Err(Error::Worker {
                        path: path.clone(),
                        reason: err.to_string(),
                    })
                });

                (path, result)
            }
        })
        .buffered(options.num_workers())
        .collect()
        .await;

    options.cancel.check()?;

    let mut report = BatchReport::default();
    results
        .into_iter()
        .for_each(|(path, result)| report.record(path, result));
    Ok(report)
}

use super::*;
use crate::{
    artifact::{self, ARTIFACT_EXTENSION},
    common::*,
    config::{ArtifactNaming, LabelFields},
    layout,
    profiling::Timing,
    utils::Cancellation,
};

/// The ordered collection of persisted frame and label pairs under a dataset root.
#[derive(Debug, Clone)]
pub struct DatasetIndex {
    root: Arc<Path>,
    naming: ArtifactNaming,
    fields: LabelFields,
    entries: Arc<[IndexEntry]>,
}

impl DatasetIndex {
    /// Scan `<root>/<game>/<clip>/` for frame artifacts.
    ///
    /// Entries are ordered by game, clip and base name. Entries whose label artifact is
    /// missing are kept, and fail at retrieval.
    pub fn scan(
        root: impl AsRef<Path>,
        naming: ArtifactNaming,
        fields: LabelFields,
        cancel: &Cancellation,
    ) -> Result<Self> {
        let root = root.as_ref();
        let mut entries = vec![];
        let mut missing_labels = 0;

        for clip in layout::list_clip_dirs(root, cancel)? {
            for path in layout::list_files(&clip.path, ARTIFACT_EXTENSION)? {
                cancel.check()?;

                if naming.is_label_artifact(&path) {
                    continue;
                }

                let base_name = artifact::base_name(&path)?;
                if !naming.label_artifact(&clip.path, &base_name).is_file() {
                    missing_labels += 1;
                }

                entries.push(IndexEntry {
                    game: clip.game.clone(),
                    clip: clip.clip.clone(),
                    base_name,
                });
            }
        }

        if missing_labels > 0 {
            warn!(
                "{} of {} frames under '{}' have no label artifact",
                missing_labels,
                entries.len(),
                root.display()
            );
        }
        info!("indexed {} frames under '{}'", entries.len(), root.display());

        Ok(Self::from_entries(root, naming, fields, entries))
    }

    pub fn from_entries(
        root: impl AsRef<Path>,
        naming: ArtifactNaming,
        fields: LabelFields,
        entries: Vec<IndexEntry>,
    ) -> Self {
        Self {
            root: root.as_ref().into(),
            naming,
            fields,
            entries: entries.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load the record at `index`.
    pub fn get(&self, index: usize) -> Result<DataRecord> {
        let entry = self.entries.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })?;
        load_record(&self.root, entry, self.naming, self.fields)
    }

    /// Build the index of the records at `indexes`, in the given order.
    pub fn subset(&self, indexes: &[usize]) -> Result<Self> {
        let entries: Vec<_> = indexes
            .iter()
            .map(|&index| {
                self.entries
                    .get(index)
                    .cloned()
                    .ok_or(Error::IndexOutOfRange {
                        index,
                        len: self.entries.len(),
                    })
            })
            .try_collect()?;

        Ok(Self {
            root: self.root.clone(),
            naming: self.naming,
            fields: self.fields,
            entries: entries.into(),
        })
    }

    /// Find the position of an entry.
    pub fn position(&self, entry: &IndexEntry) -> Option<usize> {
        self.entries.iter().position(|other| other == entry)
    }
}

impl RandomAccessDataset for DatasetIndex {
    fn num_records(&self) -> usize {
        self.entries.len()
    }

    fn nth(&self, index: usize) -> Pin<Box<dyn Future<Output = Result<DataRecord>> + Send>> {
        let root = self.root.clone();
        let entry = self.entries.get(index).cloned();
        let len = self.entries.len();
        let naming = self.naming;
        let fields = self.fields;

        Box::pin(async move {
            let entry = entry.ok_or(Error::IndexOutOfRange { index, len })?;
            let path = entry.clip_dir(&root);

            tokio::task::spawn_blocking(move || load_record(&root, &entry, naming, fields))
                .await
                .map_err(|err| Error::Worker {
                    path,
                    reason: err.to_string(),
                })?
        })
    }
}

fn load_record(
    root: &Path,
    entry: &IndexEntry,
    naming: ArtifactNaming,
    fields: LabelFields,
) -> Result<DataRecord> {
    let mut timing = Timing::new("load_record");
    let clip_dir = entry.clip_dir(root);

    let label_path = naming.label_artifact(&clip_dir, &entry.base_name);
    if !label_path.is_file() {
        return Err(Error::MissingLabel {
            entry: entry.to_string(),
            path: label_path,
        });
    }

    let image_path = clip_dir.join(format!("{}.{}", entry.base_name, ARTIFACT_EXTENSION));
    let image = artifact::read_frame(&image_path)?;
    timing.set_record("load image");

    let values = artifact::read_label(&label_path, fields.num_values())?;
    let label = values.slice(ndarray::s![..2]).to_owned();
    let metadata = match fields {
        LabelFields::Coordinates => None,
        LabelFields::WithMetadata => Some(LabelMetadata {
            visibility: decode_code(values[2], &label_path)?,
            status: decode_code(values[3], &label_path)?,
        }),
    };
    timing.set_record("load label");
    timing.report();

    Ok(DataRecord {
        image,
        label,
        metadata,
    })
}

fn decode_code<T>(value: f32, path: &Path) -> Result<Option<T>>
where
    T: TryFrom<u8>,
    T::Error: std::fmt::Display,
{
    if value < 0.0 {
        return Ok(None);
    }
    if value.fract() != 0.0 || value > u8::MAX as f32 {
        return Err(Error::decode(path, format!("invalid code {}", value)));
    }
    T::try_from(value as u8)
        .map(Some)
        .map_err(|err| Error::decode(path, err))
}

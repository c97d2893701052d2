use super::*;
use crate::common::*;

/// A train/validation partition of record positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

/// The persisted form of a [Split], keyed by entry identity so it survives rescans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitFile {
    pub seed: Option<u64>,
    pub validation_ratio: R64,
    pub train: Vec<IndexEntry>,
    pub validation: Vec<IndexEntry>,
}

impl SplitFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        serde_json::from_str(&text).map_err(|err| Error::decode(path, err))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(|err| Error::decode(path, err))?;
        fs::write(path, text).map_err(|err| Error::io(path, err))
    }
}

impl DatasetIndex {
    /// Randomly partition the records.
    ///
    /// The validation part receives `round(ratio * n)` records. Without a seed the
    /// partition is drawn from entropy and differs between runs.
    pub fn split(&self, validation_ratio: R64, seed: Option<u64>) -> Result<Split> {
        if !(0.0..=1.0).contains(&validation_ratio.raw()) {
            return Err(Error::Config(format!(
                "validation ratio must be within [0, 1], but get {}",
                validation_ratio
            )));
        }

        let num_records = self.entries().len();
        let num_validation = (validation_ratio.raw() * num_records as f64).round() as usize;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut indexes: Vec<_> = (0..num_records).collect();
        indexes.shuffle(&mut rng);

        let mut train = indexes.split_off(num_validation.min(num_records));
        let mut validation = indexes;
        train.sort_unstable();
        validation.sort_unstable();

        Ok(Split { train, validation })
    }

    /// The persisted form of `split` over this index.
    pub fn split_file(
        &self,
        split: &Split,
        validation_ratio: R64,
        seed: Option<u64>,
    ) -> Result<SplitFile> {
        let lookup = |indexes: &[usize]| -> Result<Vec<IndexEntry>> {
            Ok(self.subset(indexes)?.entries().to_vec())
        };

        Ok(SplitFile {
            seed,
            validation_ratio,
            train: lookup(&split.train)?,
            validation: lookup(&split.validation)?,
        })
    }

    /// Resolve a persisted split against this index.
    pub fn resolve_split(&self, file: &SplitFile) -> Result<Split> {
        let positions: HashMap<&IndexEntry, usize> = self
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry, index))
            .collect();
        let resolve = |entries: &[IndexEntry]| -> Result<Vec<usize>> {
            entries
                .iter()
                .map(|entry| {
                    positions.get(entry).copied().ok_or_else(|| {
                        Error::Config(format!("split entry {} is not in the index", entry))
                    })
                })
                .try_collect()
        };

        Ok(Split {
            train: resolve(&file.train)?,
            validation: resolve(&file.validation)?,
        })
    }

    /// Build the train and validation indexes of a split.
    pub fn apply_split(&self, split: &Split) -> Result<(Self, Self)> {
        Ok((self.subset(&split.train)?, self.subset(&split.validation)?))
    }
}

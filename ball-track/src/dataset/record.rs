use crate::common::*;

/// Identity of an aligned frame and label pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    pub game: String,
    pub clip: String,
    /// The file stem shared by the source frame and its artifacts.
    pub base_name: String,
}

impl IndexEntry {
    pub fn clip_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.game).join(&self.clip)
    }
}

impl std::fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.game, self.clip, self.base_name)
    }
}

/// Per-frame metadata stored along with the coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMetadata {
    pub visibility: Option<Visibility>,
    pub status: Option<MotionPhase>,
}

/// A decoded frame and label pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    /// The normalized frame in CHW order.
    pub image: Array3<f32>,
    /// The normalized `[x, y]` position.
    pub label: Array1<f32>,
    pub metadata: Option<LabelMetadata>,
}

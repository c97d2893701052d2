use super::*;
use crate::common::*;

/// The dataset that can be random accessed.
///
/// Retrieval only reads, so it can be called concurrently from many workers.
pub trait RandomAccessDataset
where
    Self: Debug + Send + Sync,
{
    /// Get number of records in the dataset.
    fn num_records(&self) -> usize;

    /// Get the nth record in the dataset.
    fn nth(&self, index: usize) -> Pin<Box<dyn Future<Output = Result<DataRecord>> + Send>>;
}

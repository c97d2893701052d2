use super::*;
use crate::common::*;

/// Epoch-wise shuffled sampling over a random access dataset.
#[derive(Debug)]
pub struct SampleStream<D>
where
    D: 'static + RandomAccessDataset,
{
    dataset: Arc<D>,
    seed: Option<u64>,
    num_workers: usize,
}

impl<D> SampleStream<D>
where
    D: 'static + RandomAccessDataset,
{
    /// Build a sampler. Records of an epoch are loaded by up to `num_workers` concurrent tasks.
    pub fn new(dataset: D, seed: Option<u64>, num_workers: usize) -> Self {
        Self {
            dataset: Arc::new(dataset),
            seed,
            num_workers: num_workers.max(1),
        }
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    /// The record order of an epoch.
    ///
    /// With a seed, each epoch has its own reproducible permutation.
    pub fn epoch_order(&self, epoch: usize) -> Vec<usize> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(epoch as u64)),
            None => StdRng::from_entropy(),
        };
        let mut indexes: Vec<_> = (0..self.dataset.num_records()).collect();
        indexes.shuffle(&mut rng);
        indexes
    }

    /// Stream the records of an epoch as `(record index, record)` pairs.
    pub fn epoch(&self, epoch: usize) -> BoxStream<'static, Result<(usize, DataRecord)>> {
        let dataset = self.dataset.clone();

        stream::iter(self.epoch_order(epoch))
            .map(move |index| {
                dataset
                    .nth(index)
                    .map(move |result| result.map(|record| (index, record)))
            })
            .buffered(self.num_workers)
            .boxed()
    }
}

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::StoreError;
use crate::record::Dataset;

/// Storage backend for the dataset
///
/// `load` must hand back the same dataset until the next `save`, and must
/// create the seed set the first time a fresh store is read. `save` replaces
/// everything previously stored.
pub trait DatasetStore {
    fn load(&mut self) -> Result<Dataset, StoreError>;
    fn save(&mut self, dataset: &Dataset) -> Result<(), StoreError>;
}

impl<S: DatasetStore + ?Sized> DatasetStore for Box<S> {
    fn load(&mut self) -> Result<Dataset, StoreError> {
        (**self).load()
    }

    fn save(&mut self, dataset: &Dataset) -> Result<(), StoreError> {
        (**self).save(dataset)
    }
}

/// Source of the ratings used when a store seeds itself.
pub(crate) fn seed_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Dataset held in process memory
///
/// One shared instance backs the in-memory variant; the session registry keeps
/// one per session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dataset: Option<Dataset>,
    seed: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose seed ratings come from a fixed random seed.
    pub fn with_seed(seed: u64) -> Self {
        MemoryStore {
            dataset: None,
            seed: Some(seed),
        }
    }

    /// A store that starts with `dataset` instead of the seed set.
    pub fn with_dataset(dataset: Dataset) -> Self {
        MemoryStore {
            dataset: Some(dataset),
            seed: None,
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.dataset.is_some()
    }
}

impl DatasetStore for MemoryStore {
    fn load(&mut self) -> Result<Dataset, StoreError> {
        let seed = self.seed;
        let dataset = self
            .dataset
            .get_or_insert_with(|| Dataset::seeded(&mut seed_rng(seed)));
        Ok(dataset.clone())
    }

    fn save(&mut self, dataset: &Dataset) -> Result<(), StoreError> {
        self.dataset = Some(dataset.clone());
        Ok(())
    }
}

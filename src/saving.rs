use bincode::{deserialize_from, serialize_into};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::record::Dataset;
use crate::store::{DatasetStore, seed_rng};

pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = BufWriter::new(encoder);

    serialize_into(&mut writer, dataset)?;

    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?.flush()?;
    Ok(())
}

pub fn load_dataset(path: &Path) -> Result<Dataset, StoreError> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = BufReader::new(decoder);

    let dataset: Dataset = deserialize_from(&mut reader)?;
    Ok(dataset)
}

/// Dataset kept as a gzip-compressed bincode snapshot on disk
///
/// A missing file counts as a fresh store: the seed set is written out on the
/// first load.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    seed: Option<u64>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            seed: None,
        }
    }

    pub fn with_seed(path: impl Into<PathBuf>, seed: u64) -> Self {
        FileStore {
            path: path.into(),
            seed: Some(seed),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetStore for FileStore {
    fn load(&mut self) -> Result<Dataset, StoreError> {
        if self.path.exists() {
            return load_dataset(&self.path);
        }
        let dataset = Dataset::seeded(&mut seed_rng(self.seed));
        save_dataset(&dataset, &self.path)?;
        log::info!("seeded snapshot {}", self.path.display());
        Ok(dataset)
    }

    fn save(&mut self, dataset: &Dataset) -> Result<(), StoreError> {
        save_dataset(dataset, &self.path)
    }
}

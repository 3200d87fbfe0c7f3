use crate::readers::CsvSource;
use crate::record::Record;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Seed for the loader's deterministic shuffle.
pub const DEFAULT_SHUFFLE_SEED: u64 = 1234;

/// A `DataSource` streams raw items from some backing storage (a file, a
/// directory, a remote store) as a fallible iterator.
///
/// Implementations must be `Send + Sync` so a source can be handed to
/// whatever execution engine ends up driving the pipeline.
pub trait DataSource<T>: Send + Sync {
    fn stream(&self) -> Result<Box<dyn Iterator<Item = Result<T>> + Send>>;
}

/// A dataset that stores all items in contiguous memory with atomic
/// reference counting (`Arc<[T]>`).
///
/// Cloning only bumps the `Arc` counter, so datasets can be shared cheaply
/// between pipeline stages. Every order-changing operation (`shuffled`,
/// `take`) returns a new dataset and leaves the receiver untouched, which
/// keeps seeded runs reproducible: the same input dataset and seed always
/// produce the same output dataset.
///
/// The metadata map carries provenance strings (e.g. which split a dataset
/// came from) without touching the items themselves.
#[derive(Debug, Clone)]
pub struct InMemoryDataset<T> {
    items: Arc<[T]>,
    metadata: HashMap<String, String>,
}

impl<T> InMemoryDataset<T> {
    /// Creates a new in-memory dataset from a vector of items.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
            metadata: HashMap::new(),
        }
    }

    /// Returns the total number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Random-access lookup by index; `None` when out of bounds.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Iterates over all items in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterates over consecutive batches of at most `batch_size` items.
    /// The final batch may be smaller.
    ///
    /// # Panics
    /// Panics if `batch_size` is zero (slice `chunks` contract).
    pub fn batches(&self, batch_size: usize) -> std::slice::Chunks<'_, T> {
        self.items.chunks(batch_size)
    }

    /// Adds/updates metadata and returns the modified dataset.
    /// Enables chaining: `dataset.with_metadata("split", "train")`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns the value of a metadata field, if it exists.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }
}

impl<T: Clone> InMemoryDataset<T> {
    /// Returns a new dataset with the same items in a deterministically
    /// shuffled order. The same `seed` over the same input order always
    /// yields the same output order. Metadata is preserved.
    pub fn shuffled(&self, seed: u64) -> Self {
        let mut items: Vec<T> = self.items.to_vec();
        let mut rng = StdRng::seed_from_u64(seed);
        items.shuffle(&mut rng);
        Self {
            items: items.into(),
            metadata: self.metadata.clone(),
        }
    }

    /// Returns a new dataset containing the first `n` items (all items when
    /// `n` exceeds the length). Metadata is preserved.
    pub fn take(&self, n: usize) -> Self {
        let n = n.min(self.items.len());
        Self {
            items: self.items[..n].to_vec().into(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Loads the tagged-record table at `path` into an [`InMemoryDataset`].
///
/// The rows are read through [`CsvSource`], deterministically shuffled with
/// [`DEFAULT_SHUFFLE_SEED`], and, when `num_samples` is given, truncated to
/// that many records. The truncation is not stratified: which records
/// survive depends only on the shuffle.
///
/// # Errors
/// Fails when the file cannot be opened or any row does not parse as a
/// [`Record`]; the error names the path and offending line.
pub fn load_dataset(
    path: impl AsRef<Path>,
    num_samples: Option<usize>,
) -> Result<InMemoryDataset<Record>> {
    let path = path.as_ref();
    let records: Vec<Record> = CsvSource::new(path)
        .stream()?
        .collect::<Result<_>>()
        .with_context(|| format!("Failed to load dataset from {}", path.display()))?;
    tracing::debug!("loaded {} records from {}", records.len(), path.display());

    let dataset = InMemoryDataset::new(records).shuffled(DEFAULT_SHUFFLE_SEED);
    Ok(match num_samples {
        Some(n) => dataset.take(n),
        None => dataset,
    })
}

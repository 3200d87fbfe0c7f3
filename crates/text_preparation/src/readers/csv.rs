use crate::dataset::DataSource;
use crate::record::Record;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// A row-by-row CSV reader that deserializes each row into a typed value.
///
/// The first line is treated as the header and used for field matching, so
/// column order in the file does not have to match field order in the type.
///
/// # Example
/// ```ignore
/// let source = CsvSource::new("dataset.csv");
/// for record in source.stream::<Record>()? {
///     let record = record?;
///     println!("{}: {}", record.tag, record.title);
/// }
/// ```
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    /// Creates a new reader for a CSV file at the given path.
    ///
    /// # Arguments
    /// - `path`: Accepts `String`, `&str`, `&Path`, or `PathBuf`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Streams rows as Rust types.
    ///
    /// # Type Parameter
    /// - `T`: Must implement `serde::Deserialize` (use `#[derive(Deserialize)]`).
    ///
    /// # Errors
    /// - Fails if the file cannot be opened.
    /// - Yielded items fail on rows that are not valid `T`, with the data
    ///   line number in the error (line 1 is the header).
    pub fn stream<T: DeserializeOwned + Send + 'static>(
        &self,
    ) -> Result<Box<dyn Iterator<Item = Result<T>> + Send>> {
        let reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let iter = reader
            .into_deserialize::<T>()
            .enumerate()
            .map(|(row_num, row)| {
                // Header occupies line 1, first data row is line 2.
                row.with_context(|| format!("Invalid record at line {}", row_num + 2))
            });
        Ok(Box::new(iter))
    }
}

impl DataSource<Record> for CsvSource {
    fn stream(&self) -> Result<Box<dyn Iterator<Item = Result<Record>> + Send>> {
        self.stream::<Record>()
    }
}

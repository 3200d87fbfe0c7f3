use crate::batch::EncodedBatch;
use crate::dataset::InMemoryDataset;
use crate::record::Record;
use crate::transforms::text::CleanText;
use crate::transforms::{Chain, ToText, Transform};
use anyhow::{anyhow, bail, ensure, Result};
use std::collections::HashMap;
use tokenizers::Tokenizer;

/// ===========================================================================
/// Bidirectional mapping between class labels and dense integer indices.
///
/// Indices always form the dense range `[0, num_classes)`, assigned in
/// first-seen order of the labels the mapping was built from. Once built the
/// mapping is immutable; rebuilding requires a new fit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMapping {
    label_to_index: HashMap<String, usize>,
    index_to_label: Vec<String>,
}

impl ClassMapping {
    /// Builds a mapping from a stream of labels, deduplicating while keeping
    /// first-seen order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = Self::default();
        for label in labels {
            let label = label.as_ref();
            if !mapping.label_to_index.contains_key(label) {
                mapping
                    .label_to_index
                    .insert(label.to_string(), mapping.index_to_label.len());
                mapping.index_to_label.push(label.to_string());
            }
        }
        mapping
    }

    /// Forward lookup: label → index.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.label_to_index.get(label).copied()
    }

    /// Inverse lookup: index → label (for decoding predictions).
    pub fn label_of(&self, index: usize) -> Option<&str> {
        self.index_to_label.get(index).map(|s| s.as_str())
    }

    /// Number of distinct classes.
    pub fn num_classes(&self) -> usize {
        self.index_to_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_label.is_empty()
    }

    /// Iterates over the labels in index order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.index_to_label.iter().map(|s| s.as_str())
    }
}

/// ===========================================================================
/// The stateful preprocessor tying the pipeline together: it owns the text
/// pipeline (title+description → cleaned text), the subword tokenizer, and
/// the fitted [`ClassMapping`].
///
/// The fit/transform asymmetry is the point: `fit` learns the class mapping
/// from training data once, and `transform` applies it unchanged to any
/// dataset afterwards (train, test, or future inference data), so labels
/// encode identically everywhere.
///
/// The tokenizer is injected by the caller and loaded once; tokenization
/// itself is stateless per call, so the same instance serves every batch.
///
/// # Example
/// ```ignore
/// let cleaner = CleanText::new(config::STOPWORDS.iter().copied())?;
/// let preprocessor = Preprocessor::new(tokenizer, cleaner).fit(&train_ds);
/// let train_batches = preprocessor.transform(&train_ds, 128)?;
/// let test_batches = preprocessor.transform(&test_ds, 128)?;
/// ```
pub struct Preprocessor {
    pipeline: Chain<ToText, CleanText, String>,
    tokenizer: Tokenizer,
    mapping: ClassMapping,
}

impl Preprocessor {
    /// Creates a preprocessor with an empty class mapping; call
    /// [`fit`](Self::fit) before transforming.
    pub fn new(tokenizer: Tokenizer, cleaner: CleanText) -> Self {
        Self {
            pipeline: ToText.then(cleaner),
            tokenizer,
            mapping: ClassMapping::default(),
        }
    }

    /// Restores a preprocessor around a previously fitted mapping, for
    /// encoding new data with the exact label indices of an earlier fit.
    pub fn with_mapping(tokenizer: Tokenizer, cleaner: CleanText, mapping: ClassMapping) -> Self {
        Self {
            pipeline: ToText.then(cleaner),
            tokenizer,
            mapping,
        }
    }

    /// Learns the class mapping from the dataset's tags: distinct values in
    /// first-seen order get dense indices `[0, num_classes)`. Returns `self`
    /// for chaining.
    pub fn fit(mut self, dataset: &InMemoryDataset<Record>) -> Self {
        self.mapping = ClassMapping::from_labels(dataset.iter().map(|record| record.tag.as_str()));
        tracing::debug!("fit class mapping with {} classes", self.mapping.num_classes());
        self
    }

    /// The fitted mapping (empty before [`fit`](Self::fit)).
    pub fn mapping(&self) -> &ClassMapping {
        &self.mapping
    }

    /// Encodes one batch of records: the pure per-batch function behind
    /// [`transform`](Self::transform).
    ///
    /// Each record's title and description are joined, cleaned, and
    /// tokenized; tags are mapped through the fitted class mapping. Token
    /// IDs are padded to the longest sequence in this batch.
    ///
    /// # Errors
    /// - the batch is empty;
    /// - a record carries a tag absent from the fitted mapping (the error
    ///   names the label);
    /// - the tokenizer rejects an input.
    pub fn encode_records(&self, records: &[Record]) -> Result<EncodedBatch> {
        if records.is_empty() {
            bail!("Cannot encode an empty batch");
        }

        let mut texts = Vec::with_capacity(records.len());
        let mut targets = Vec::with_capacity(records.len());
        for record in records {
            let target = self.mapping.index_of(&record.tag).ok_or_else(|| {
                anyhow!(
                    "Unknown class label '{}': not present when the preprocessor was fit",
                    record.tag
                )
            })?;
            targets.push(target as i64);
            texts.push(self.pipeline.apply(record.clone())?);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        EncodedBatch::from_encodings(&encodings, targets)
    }

    /// Encodes a whole dataset in consecutive batches of `batch_size`
    /// records (the final batch may be smaller). Callable on any dataset
    /// once fit.
    pub fn transform(
        &self,
        dataset: &InMemoryDataset<Record>,
        batch_size: usize,
    ) -> Result<Vec<EncodedBatch>> {
        ensure!(
            batch_size > 0,
            "batch_size must be > 0, but got batch_size={}",
            batch_size
        );
        dataset
            .batches(batch_size)
            .map(|batch| self.encode_records(batch))
            .collect()
    }
}

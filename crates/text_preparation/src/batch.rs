use anyhow::{bail, ensure, Result};
use ndarray::{Array1, Array2};
use tokenizers::Encoding;

/// A batch of encoded examples ready for a model.
///
/// - `ids`: token IDs, shape `[batch_size, seq_len]`, padded with 0 to the
///   longest sequence in the batch
/// - `masks`: attention masks, same shape as `ids`; 1 marks a real token,
///   0 marks padding
/// - `targets`: integer class targets, shape `[batch_size]`
///
/// All three share the leading (batch) dimension; [`EncodedBatch::new`]
/// rejects anything else.
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    pub ids: Array2<u32>,
    pub masks: Array2<u8>,
    pub targets: Array1<i64>,
}

impl EncodedBatch {
    /// Assembles a batch from pre-built arrays, checking the shape invariant.
    pub fn new(ids: Array2<u32>, masks: Array2<u8>, targets: Array1<i64>) -> Result<Self> {
        ensure!(
            ids.dim() == masks.dim(),
            "ids shape {:?} does not match masks shape {:?}",
            ids.dim(),
            masks.dim()
        );
        ensure!(
            ids.nrows() == targets.len(),
            "batch has {} sequences but {} targets",
            ids.nrows(),
            targets.len()
        );
        Ok(Self { ids, masks, targets })
    }

    /// Builds a batch from tokenizer output, padding every sequence to the
    /// longest one in the batch. Padded positions get id 0 and mask 0; real
    /// positions carry the encoding's own attention mask values.
    pub fn from_encodings(encodings: &[Encoding], targets: Vec<i64>) -> Result<Self> {
        if encodings.is_empty() {
            bail!("Cannot build a batch from an empty encoding list");
        }
        ensure!(
            encodings.len() == targets.len(),
            "batch has {} encodings but {} targets",
            encodings.len(),
            targets.len()
        );

        let max_len = encodings
            .iter()
            .map(|encoding| encoding.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut ids = Array2::<u32>::zeros((encodings.len(), max_len));
        let mut masks = Array2::<u8>::zeros((encodings.len(), max_len));
        for (row, encoding) in encodings.iter().enumerate() {
            for (col, &id) in encoding.get_ids().iter().enumerate() {
                ids[[row, col]] = id;
            }
            for (col, &mask) in encoding.get_attention_mask().iter().enumerate() {
                masks[[row, col]] = mask as u8;
            }
        }

        Self::new(ids, masks, Array1::from_vec(targets))
    }

    /// Number of examples in the batch.
    pub fn batch_size(&self) -> usize {
        self.ids.nrows()
    }

    /// Padded sequence length shared by every example in the batch.
    pub fn seq_len(&self) -> usize {
        self.ids.ncols()
    }
}

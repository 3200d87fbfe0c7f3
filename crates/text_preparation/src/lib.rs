pub mod batch;
pub mod config;
pub mod dataset;
pub mod preprocessor;
pub mod readers;
pub mod record;
pub mod split;
pub mod transforms;

pub use batch::EncodedBatch;
pub use dataset::{load_dataset, DataSource, InMemoryDataset, DEFAULT_SHUFFLE_SEED};
pub use preprocessor::{ClassMapping, Preprocessor};
pub use record::Record;
pub use split::stratified_split;
pub use transforms::text::CleanText;
pub use transforms::{ToText, Transform};

pub mod clean;

pub use clean::CleanText;

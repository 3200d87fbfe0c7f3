pub mod core;
pub mod text;

pub use self::core::{Chain, Transform};

/// ===========================================================================
use crate::record::Record;
use anyhow::Result;

/// Collapses a [`Record`] to the text the classifier sees: title and
/// description joined with a single space. The identifier and timestamp
/// columns are dropped here by construction; only text (and, outside this
/// transform, the tag) flow onward.
#[derive(Debug)]
pub struct ToText;

impl Transform<Record, String> for ToText {
    fn apply(&self, record: Record) -> Result<String> {
        Ok(format!("{} {}", record.title, record.description))
    }
}

#[cfg(test)]
mod to_text_tests {
    use super::*;

    #[test]
    fn joins_title_and_description() -> Result<()> {
        let record = Record {
            id: 1,
            created_on: "2020-02-17 06:30:41".into(),
            title: "Diffusion to Vector".into(),
            description: "Reference implementation of Diffusion2Vec".into(),
            tag: "graph-learning".into(),
        };
        assert_eq!(
            ToText.apply(record)?,
            "Diffusion to Vector Reference implementation of Diffusion2Vec"
        );
        Ok(())
    }
}

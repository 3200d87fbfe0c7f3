use anyhow::Result;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;
use text_preparation::Record;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::pre_tokenizers::PreTokenizerWrapper;
use tokenizers::Tokenizer;

/// Builds a tiny in-code WordPiece tokenizer over the fixture vocabulary so
/// the suite runs offline. Words outside the vocabulary collapse to `[UNK]`;
/// sequence lengths still track word counts, which is what the pipeline
/// invariants care about.
pub fn tiny_tokenizer() -> Tokenizer {
    let vocab: HashMap<String, u32> = [
        "[UNK]",
        "[PAD]",
        "text",
        "classification",
        "with",
        "transformers",
        "image",
        "segmentation",
        "for",
        "production",
        "monitoring",
        "data",
        "pipelines",
        "deployment",
        "detection",
        "models",
        "attention",
        "serving",
        "drift",
        "object",
        "!",
        ".",
    ]
    .iter()
    .enumerate()
    .map(|(i, word)| (word.to_string(), i as u32))
    .collect();

    let model = WordPiece::builder()
        .vocab(vocab)
        .unk_token("[UNK]".into())
        .build()
        .expect("fixture vocabulary is valid");
    let mut tokenizer = Tokenizer::new(model);
    let pre_tokenizer: PreTokenizerWrapper = Whitespace {}.into();
    tokenizer.with_pre_tokenizer(pre_tokenizer);
    tokenizer
}

pub fn record(id: i64, title: &str, description: &str, tag: &str) -> Record {
    Record {
        id,
        created_on: "2020-02-17 06:30:41".into(),
        title: title.into(),
        description: description.into(),
        tag: tag.into(),
    }
}

/// The fixture corpus: 24 records over three tags (10 / 8 / 6), with
/// varying text lengths so dynamic padding actually pads.
pub fn corpus() -> Vec<Record> {
    let rows: [(&str, &str, &str); 24] = [
        ("Text classification", "with transformers", "natural-language-processing"),
        ("Attention models", "text classification with attention", "natural-language-processing"),
        ("Text pipelines", "production text serving", "natural-language-processing"),
        ("Transformers for text", "", "natural-language-processing"),
        ("Text classification with transformers", "production deployment", "natural-language-processing"),
        ("Serving text models", "monitoring drift", "natural-language-processing"),
        ("Attention for classification", "text data pipelines", "natural-language-processing"),
        ("Text data", "classification models for production", "natural-language-processing"),
        ("Production text serving", "", "natural-language-processing"),
        ("Text drift monitoring", "data drift detection for text", "natural-language-processing"),
        ("Image segmentation", "segmentation models", "computer-vision"),
        ("Object detection", "detection with transformers", "computer-vision"),
        ("Image pipelines", "image data for production", "computer-vision"),
        ("Segmentation models", "", "computer-vision"),
        ("Image classification", "image models with attention", "computer-vision"),
        ("Object detection for production", "serving detection models", "computer-vision"),
        ("Image data pipelines", "image segmentation deployment", "computer-vision"),
        ("Detection drift", "monitoring image models", "computer-vision"),
        ("Pipeline monitoring", "data drift detection", "mlops"),
        ("Model deployment", "production serving", "mlops"),
        ("Data pipelines", "production data monitoring", "mlops"),
        ("Serving models", "deployment for production", "mlops"),
        ("Drift detection", "monitoring models in production", "mlops"),
        ("Production monitoring", "", "mlops"),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (title, description, tag))| record(i as i64, title, description, tag))
        .collect()
}

/// Writes the fixture corpus to a temporary CSV file with the pipeline's
/// expected header.
pub fn corpus_csv() -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "id,created_on,title,description,tag")?;
    for r in corpus() {
        writeln!(
            file,
            "{},{},{},{},{}",
            r.id, r.created_on, r.title, r.description, r.tag
        )?;
    }
    Ok(file)
}

use crate::transforms::Transform;
use anyhow::{Context, Result};
use regex::Regex;

/// The punctuation characters that get spaced out into their own tokens
/// (step 3) and survive the non-alphanumeric filter (step 4). As a character
/// class body: `-`, `\`, `[`, `]` are escaped for the regex engine.
const PUNCTUATION_CLASS: &str = r#"!"'#$%&()*+,\-./:;<=>?@\\\[\]^_`{|}~"#;

/// Normalizes raw text for tokenization.
///
/// The steps run in a fixed order, and the order is load-bearing: each step
/// operates on the previous step's output:
///
/// 1. lowercase;
/// 2. remove whole-word stopword matches, collapsing each removed span
///    (word plus trailing whitespace) to a single space;
/// 3. insert spaces around punctuation so each mark becomes its own token;
/// 4. replace runs of any remaining character that is neither alphanumeric,
///    a space, nor spaced-out punctuation with a single space;
/// 5. collapse runs of spaces and trim the ends;
/// 6. strip URL-like tokens: `http` followed by at least one non-space
///    character. Because this runs last, only a URL that survived steps 1–5
///    as a contiguous non-space run is removed; a bare `http` token is left
///    alone.
///
/// All patterns are compiled once at construction; `clean` is a pure
/// function of its input after that.
///
/// # Example
/// ```ignore
/// let cleaner = CleanText::new(["please", "me", "some"])?;
/// assert_eq!(
///     cleaner.clean("Hi! Please Give me some text."),
///     "hi ! give text ."
/// );
/// ```
#[derive(Debug)]
pub struct CleanText {
    stopwords: Option<Regex>,
    punctuation: Regex,
    filter: Regex,
    spaces: Regex,
    urls: Regex,
}

impl CleanText {
    /// Builds a cleaner over the given stopword set. Stopwords are lowercased
    /// and matched on word boundaries; an empty set disables step 2 entirely.
    pub fn new<I, S>(stopwords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = stopwords
            .into_iter()
            .map(|word| regex::escape(&word.as_ref().to_lowercase()))
            .filter(|word| !word.is_empty())
            .collect();
        let stopwords = if words.is_empty() {
            None
        } else {
            Some(
                Regex::new(&format!(r"\b(?:{})\b\s*", words.join("|")))
                    .context("Failed to compile stopword pattern")?,
            )
        };

        Ok(Self {
            stopwords,
            punctuation: Regex::new(&format!("([{PUNCTUATION_CLASS}])"))
                .context("Failed to compile punctuation pattern")?,
            filter: Regex::new(&format!("[^A-Za-z0-9 {PUNCTUATION_CLASS}]+"))
                .context("Failed to compile filter pattern")?,
            spaces: Regex::new(" +").context("Failed to compile whitespace pattern")?,
            urls: Regex::new(r"http\S+").context("Failed to compile URL pattern")?,
        })
    }

    /// Runs the full normalization pipeline over `text`.
    pub fn clean(&self, text: &str) -> String {
        let mut text = text.to_lowercase();
        if let Some(stopwords) = &self.stopwords {
            text = stopwords.replace_all(&text, " ").into_owned();
        }
        text = self.punctuation.replace_all(&text, " ${1} ").into_owned();
        text = self.filter.replace_all(&text, " ").into_owned();
        text = self.spaces.replace_all(&text, " ").into_owned();
        let trimmed = text.trim();
        self.urls.replace_all(trimmed, "").into_owned()
    }
}

impl Transform<String, String> for CleanText {
    fn apply(&self, input: String) -> Result<String> {
        Ok(self.clean(&input))
    }
}

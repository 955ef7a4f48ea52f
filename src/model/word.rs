//! Line-level recognition results and the word-level records derived from them.

use super::Quad;
use serde::{Deserialize, Serialize};

/// One text line as returned by the recognition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionLine {
    /// Quadrilateral enclosing the whole line
    pub quad: Quad,

    /// Transcribed text; whitespace-delimited tokens read left to right
    pub text: String,

    /// Recognition confidence in `[0, 1]`, if the engine reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl DetectionLine {
    /// Create a line without a confidence score.
    pub fn new(quad: Quad, text: impl Into<String>) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence: None,
        }
    }

    /// Attach a confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Check if the line has no tokens.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A single word and its quadrilateral. Serialized as `[text, quad]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Quad)", into = "(String, Quad)")]
pub struct WordSpan {
    pub text: String,
    pub quad: Quad,
}

impl WordSpan {
    /// Create a new word span.
    pub fn new(text: impl Into<String>, quad: Quad) -> Self {
        Self {
            text: text.into(),
            quad,
        }
    }
}

impl From<(String, Quad)> for WordSpan {
    fn from((text, quad): (String, Quad)) -> Self {
        Self { text, quad }
    }
}

impl From<WordSpan> for (String, Quad) {
    fn from(w: WordSpan) -> Self {
        (w.text, w.quad)
    }
}

/// All words of one page, in line order then token order.
///
/// Serialized as a bare JSON array of [`WordSpan`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportRecord {
    pub words: Vec<WordSpan>,
}

impl ExportRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of words on the page.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the page produced no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterate over the words.
    pub fn iter(&self) -> std::slice::Iter<'_, WordSpan> {
        self.words.iter()
    }
}

impl From<Vec<WordSpan>> for ExportRecord {
    fn from(words: Vec<WordSpan>) -> Self {
        Self { words }
    }
}

impl FromIterator<WordSpan> for ExportRecord {
    fn from_iter<I: IntoIterator<Item = WordSpan>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().collect(),
        }
    }
}

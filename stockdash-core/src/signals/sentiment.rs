//! Headline sentiment: thresholding a compound score and the scorer seam.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const POSITIVE_THRESHOLD: f64 = 0.05;
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

/// Classify a compound score in [-1, 1]. Boundaries are inclusive; NaN is
/// neutral.
pub fn classify_sentiment(compound: f64) -> Sentiment {
    if compound >= POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if compound <= NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Anything that turns text into a compound polarity score in [-1, 1].
pub trait SentimentScorer: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

impl<F> SentimentScorer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn compound(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Small word-list scorer for when no external model is wired in.
///
/// Sums per-word valences, flips the sign of a word preceded by a negator
/// and squashes the sum with `x / sqrt(x² + 15)` into (-1, 1).
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: HashMap<String, f64>,
}

const NORMALIZATION_ALPHA: f64 = 15.0;

const DEFAULT_LEXICON: [(&str, f64); 36] = [
    ("beat", 1.5),
    ("beats", 1.5),
    ("boost", 1.7),
    ("bullish", 2.0),
    ("gain", 1.6),
    ("gains", 1.6),
    ("growth", 1.6),
    ("high", 0.8),
    ("jump", 1.2),
    ("jumps", 1.2),
    ("profit", 1.8),
    ("rally", 1.8),
    ("rallies", 1.8),
    ("record", 1.0),
    ("rise", 1.2),
    ("rises", 1.2),
    ("soar", 2.0),
    ("soars", 2.0),
    ("strong", 1.8),
    ("surge", 1.9),
    ("upgrade", 1.6),
    ("bearish", -2.0),
    ("cautious", -0.8),
    ("crash", -2.6),
    ("cut", -1.2),
    ("decline", -1.5),
    ("downgrade", -1.6),
    ("drop", -1.3),
    ("fall", -1.3),
    ("falling", -1.3),
    ("fraud", -3.0),
    ("lawsuit", -1.8),
    ("loss", -1.9),
    ("miss", -1.4),
    ("plunge", -2.2),
    ("weak", -1.7),
];

const NEGATORS: [&str; 6] = ["not", "no", "never", "without", "isn't", "don't"];

impl LexiconScorer {
    pub fn new(lexicon: HashMap<String, f64>) -> Self {
        Self { lexicon }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(
            DEFAULT_LEXICON
                .iter()
                .map(|(w, v)| (w.to_string(), *v))
                .collect(),
        )
    }
}

impl SentimentScorer for LexiconScorer {
    fn compound(&self, text: &str) -> f64 {
        let mut sum = 0.0;
        let mut negate = false;
        for word in text
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if NEGATORS.contains(&word.as_str()) {
                negate = true;
                continue;
            }
            if let Some(&v) = self.lexicon.get(&word) {
                sum += if negate { -v } else { v };
            }
            negate = false;
        }
        if sum == 0.0 {
            return 0.0;
        }
        sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()
    }
}

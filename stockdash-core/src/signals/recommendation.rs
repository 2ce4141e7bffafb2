//! Analyst rating heuristic.

use serde::{Deserialize, Serialize};
use std::fmt;

const BUY_TERMS: [&str; 3] = ["buy", "outperform", "overweight"];
const SELL_TERMS: [&str; 3] = ["sell", "underperform", "underweight"];
const HOLD_TERMS: [&str; 3] = ["hold", "neutral", "equal-weight"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Suggestion {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Suggestion::Buy => "BUY",
            Suggestion::Sell => "SELL",
            Suggestion::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// Per-category counts and the decision drawn from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
    pub suggestion: Suggestion,
}

fn matches_any(label: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| label.contains(t))
}

/// Count case-folded substring matches and pick a suggestion.
///
/// A label may count toward several categories. "Strong Buy" counts as buy,
/// "Underperform" and "Sector Underperform" count as sell.
/// BUY or SELL need a strict majority over both other counts; everything
/// else, ties and the empty list included, is HOLD.
pub fn classify_recommendations<S: AsRef<str>>(labels: &[S]) -> RecommendationSummary {
    let (mut buy, mut sell, mut hold) = (0, 0, 0);
    for label in labels {
        let label = label.as_ref().to_lowercase();
        buy += usize::from(matches_any(&label, &BUY_TERMS));
        sell += usize::from(matches_any(&label, &SELL_TERMS));
        hold += usize::from(matches_any(&label, &HOLD_TERMS));
    }

    let suggestion = if buy > sell && buy > hold {
        Suggestion::Buy
    } else if sell > buy && sell > hold {
        Suggestion::Sell
    } else {
        Suggestion::Hold
    };

    RecommendationSummary {
        buy,
        sell,
        hold,
        suggestion,
    }
}

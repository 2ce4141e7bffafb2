//! Discrete signals derived from provider data: analyst suggestion and
//! headline sentiment. Pure functions, no provider access.

pub mod recommendation;
pub mod sentiment;

pub use recommendation::{classify_recommendations, RecommendationSummary, Suggestion};
pub use sentiment::{
    classify_sentiment, LexiconScorer, Sentiment, SentimentScorer, NEGATIVE_THRESHOLD,
    POSITIVE_THRESHOLD,
};

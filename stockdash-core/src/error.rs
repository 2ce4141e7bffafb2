//! Dashboard-level error taxonomy.
//!
//! Every page handler reports failures through `DashboardError`. Transport
//! errors from providers (`data::DataError`) never reach the caller directly;
//! handlers fold them into `NoDataAvailable` so the render layer only ever
//! shows a "no data for this input" state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// Empty or missing series, quote, or provider response.
    #[error("no data available for {0}")]
    NoDataAvailable(String),

    /// Non-positive shares/price, malformed ticker, or a window that does
    /// not fit the series.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Valuation requested for a ticker with no current quote.
    #[error("no current quote for {ticker}")]
    QuoteUnavailable { ticker: String },
}

impl DashboardError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn no_data(what: impl Into<String>) -> Self {
        Self::NoDataAvailable(what.into())
    }

    /// True for the "nothing to show" outcome, as opposed to a caller mistake.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoDataAvailable(_) | Self::QuoteUnavailable { .. })
    }
}

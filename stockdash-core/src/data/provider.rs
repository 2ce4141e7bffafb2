//! Market data provider trait and structured error types.
//!
//! The `MarketDataProvider` trait abstracts over data sources (Yahoo Finance,
//! the synthetic offline source) so pages can swap implementations and tests
//! can mock them. Providers return typed results; turning a failure into a
//! "no data" state is the caller's job (see `dashboard`).

use crate::domain::{
    CompanyProfile, CorporateActions, DaySnapshot, Financials, NewsItem, PriceSeries, Quote,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider returned no rows for {0}")]
    Empty(String),

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("data error: {0}")]
    Other(String),
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Synthetic,
}

/// Trait for market data providers.
///
/// Every call is a blocking request. The memoizing cache sits above this
/// trait (`CachedProvider`); providers don't know about it.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Daily bars for `ticker` between `start` and `end`, inclusive.
    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError>;

    /// Latest traded price.
    fn get_quote(&self, ticker: &str) -> Result<Quote, DataError>;

    /// Analyst rating labels, newest first (e.g. "Buy", "Market Perform").
    fn get_recommendations(&self, ticker: &str) -> Result<Vec<String>, DataError>;

    fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, DataError>;

    fn get_profile(&self, ticker: &str) -> Result<CompanyProfile, DataError>;

    /// Open/close/volume of the most recent session.
    fn get_day_snapshot(&self, ticker: &str) -> Result<DaySnapshot, DataError>;

    /// Dividends and splits with ex-dates between `start` and `end`.
    /// A ticker that never paid or split returns empty vectors, not an error.
    fn get_corporate_actions(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CorporateActions, DataError>;

    /// Annual and quarterly statements plus institutional holders.
    fn get_financials(&self, ticker: &str) -> Result<Financials, DataError>;

    /// False while the provider refuses requests (circuit breaker open).
    /// Multi-ticker pages stop fetching once this turns false.
    fn is_available(&self) -> bool;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn source(&self) -> DataSource {
        (**self).source()
    }

    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        (**self).get_history(ticker, start, end)
    }

    fn get_quote(&self, ticker: &str) -> Result<Quote, DataError> {
        (**self).get_quote(ticker)
    }

    fn get_recommendations(&self, ticker: &str) -> Result<Vec<String>, DataError> {
        (**self).get_recommendations(ticker)
    }

    fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, DataError> {
        (**self).get_news(ticker)
    }

    fn get_profile(&self, ticker: &str) -> Result<CompanyProfile, DataError> {
        (**self).get_profile(ticker)
    }

    fn get_day_snapshot(&self, ticker: &str) -> Result<DaySnapshot, DataError> {
        (**self).get_day_snapshot(ticker)
    }

    fn get_corporate_actions(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CorporateActions, DataError> {
        (**self).get_corporate_actions(ticker, start, end)
    }

    fn get_financials(&self, ticker: &str) -> Result<Financials, DataError> {
        (**self).get_financials(ticker)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

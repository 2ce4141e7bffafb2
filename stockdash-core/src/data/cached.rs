//! Memoizing decorator over any `MarketDataProvider`.

use super::memo::MemoCache;
use super::provider::{DataError, DataSource, MarketDataProvider};
use crate::domain::{
    CompanyProfile, CorporateActions, DaySnapshot, Financials, NewsItem, PriceSeries, Quote,
};
use chrono::NaiveDate;
use std::time::Duration;

/// Wraps a provider and memoizes every successful call by its arguments.
///
/// Failures pass through uncached.
pub struct CachedProvider<P> {
    inner: P,
    history: MemoCache<(String, NaiveDate, NaiveDate), PriceSeries>,
    quotes: MemoCache<String, Quote>,
    recommendations: MemoCache<String, Vec<String>>,
    news: MemoCache<String, Vec<NewsItem>>,
    profiles: MemoCache<String, CompanyProfile>,
    snapshots: MemoCache<String, DaySnapshot>,
    actions: MemoCache<(String, NaiveDate, NaiveDate), CorporateActions>,
    financials: MemoCache<String, Financials>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            history: MemoCache::new(ttl),
            quotes: MemoCache::new(ttl),
            recommendations: MemoCache::new(ttl),
            news: MemoCache::new(ttl),
            profiles: MemoCache::new(ttl),
            snapshots: MemoCache::new(ttl),
            actions: MemoCache::new(ttl),
            financials: MemoCache::new(ttl),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop every memoized value for one ticker.
    pub fn invalidate(&self, ticker: &str) {
        let key = ticker.to_string();
        self.quotes.invalidate(&key);
        self.recommendations.invalidate(&key);
        self.news.invalidate(&key);
        self.profiles.invalidate(&key);
        self.snapshots.invalidate(&key);
        self.financials.invalidate(&key);
        // Range-keyed caches; only a full clear reaches every entry.
        self.history.clear();
        self.actions.clear();
    }

    pub fn clear(&self) {
        self.history.clear();
        self.quotes.clear();
        self.recommendations.clear();
        self.news.clear();
        self.profiles.clear();
        self.snapshots.clear();
        self.actions.clear();
        self.financials.clear();
    }
}

fn memoized<K, V>(
    cache: &MemoCache<K, V>,
    what: &str,
    ticker: &str,
    key: K,
    fetch: impl FnOnce() -> Result<V, DataError>,
) -> Result<V, DataError>
where
    K: Eq + std::hash::Hash,
    V: Clone,
{
    if let Some(v) = cache.get(&key) {
        tracing::debug!(ticker, what, "cache hit");
        return Ok(v);
    }
    cache.get_or_try_insert_with(key, fetch)
}

impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn source(&self) -> DataSource {
        self.inner.source()
    }

    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        memoized(
            &self.history,
            "history",
            ticker,
            (ticker.to_string(), start, end),
            || self.inner.get_history(ticker, start, end),
        )
    }

    fn get_quote(&self, ticker: &str) -> Result<Quote, DataError> {
        memoized(&self.quotes, "quote", ticker, ticker.to_string(), || {
            self.inner.get_quote(ticker)
        })
    }

    fn get_recommendations(&self, ticker: &str) -> Result<Vec<String>, DataError> {
        memoized(
            &self.recommendations,
            "recommendations",
            ticker,
            ticker.to_string(),
            || self.inner.get_recommendations(ticker),
        )
    }

    fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, DataError> {
        memoized(&self.news, "news", ticker, ticker.to_string(), || {
            self.inner.get_news(ticker)
        })
    }

    fn get_profile(&self, ticker: &str) -> Result<CompanyProfile, DataError> {
        memoized(&self.profiles, "profile", ticker, ticker.to_string(), || {
            self.inner.get_profile(ticker)
        })
    }

    fn get_day_snapshot(&self, ticker: &str) -> Result<DaySnapshot, DataError> {
        memoized(&self.snapshots, "snapshot", ticker, ticker.to_string(), || {
            self.inner.get_day_snapshot(ticker)
        })
    }

    fn get_corporate_actions(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CorporateActions, DataError> {
        memoized(
            &self.actions,
            "corporate_actions",
            ticker,
            (ticker.to_string(), start, end),
            || self.inner.get_corporate_actions(ticker, start, end),
        )
    }

    fn get_financials(&self, ticker: &str) -> Result<Financials, DataError> {
        memoized(&self.financials, "financials", ticker, ticker.to_string(), || {
            self.inner.get_financials(ticker)
        })
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}

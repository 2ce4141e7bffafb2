//! Page handlers.
//!
//! Each handler validates its input, makes the provider calls the page needs
//! and returns a typed report. Provider failures are logged here and folded
//! into `DashboardError::NoDataAvailable`; nothing above this layer sees a
//! transport error.

use crate::config::DashboardConfig;
use crate::data::{DataError, MarketDataProvider, TickerDirectory};
use crate::domain::{
    normalize_ticker, CompanyProfile, CorporateActions, DaySnapshot, Financials, Holding,
    LatestSummary, NewsItem, Quote, SessionId,
};
use crate::error::DashboardError;
use crate::indicators::{IndicatorFrame, IndicatorSet, RsiZone};
use crate::portfolio::{aggregate_portfolio, PortfolioValuation};
use crate::screener::{rank_trending, sectors, ScreenerFilter, ScreenerRow};
use crate::session::SessionStore;
use crate::signals::{
    classify_recommendations, classify_sentiment, RecommendationSummary, Sentiment,
    SentimentScorer,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Price history plus the indicator bundle for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub latest: LatestSummary,
    pub frame: IndicatorFrame,
    /// Zone of the most recent RSI reading, if RSI could be computed.
    pub rsi_zone: Option<RsiZone>,
    /// Dividends and splits in the range; `None` when they could not be
    /// fetched, which does not fail the page.
    pub corporate_actions: Option<CorporateActions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub ticker: String,
    pub labels: Vec<String>,
    pub summary: RecommendationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHeadline {
    pub item: NewsItem,
    pub compound: f64,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerReport {
    /// Rows fetched before filtering.
    pub total: usize,
    /// Sectors present among the fetched rows, for the sector picker.
    pub sectors: Vec<String>,
    pub rows: Vec<ScreenerRow>,
}

fn fetch_failed(ticker: &str, what: &str, err: DataError) -> DashboardError {
    tracing::warn!(ticker, what, error = %err, "provider request failed");
    DashboardError::no_data(ticker)
}

pub struct Dashboard<P> {
    provider: P,
    config: DashboardConfig,
    indicators: IndicatorSet,
    directory: TickerDirectory,
}

impl<P: MarketDataProvider> Dashboard<P> {
    pub fn new(provider: P, config: DashboardConfig, directory: TickerDirectory) -> Self {
        let indicators = IndicatorSet::from_config(&config.indicators);
        Self {
            provider,
            config,
            indicators,
            directory,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn directory(&self) -> &TickerDirectory {
        &self.directory
    }

    /// Map a display name from the directory, or a raw ticker, to a ticker.
    pub fn resolve(&self, input: &str) -> Result<String, DashboardError> {
        match self.directory.lookup(input) {
            Some(ticker) => Ok(ticker.to_string()),
            None => normalize_ticker(input),
        }
    }

    /// History from `start` (or the configured default) through `end` with
    /// every indicator column that fits.
    pub fn analyze(
        &self,
        input: &str,
        start: Option<NaiveDate>,
        end: NaiveDate,
    ) -> Result<AnalysisReport, DashboardError> {
        let ticker = self.resolve(input)?;
        let start = start.unwrap_or(self.config.history_start);
        if start > end {
            return Err(DashboardError::invalid(format!(
                "start date {start} is after end date {end}"
            )));
        }

        let series = self
            .provider
            .get_history(&ticker, start, end)
            .map_err(|e| fetch_failed(&ticker, "history", e))?;
        let latest = series
            .latest()
            .ok_or_else(|| DashboardError::no_data(&ticker))?;
        let frame = self.indicators.compute(&series)?;

        let rsi_name = format!("rsi_{}", self.config.indicators.rsi_window);
        let rsi_zone = frame.latest(&rsi_name).map(RsiZone::classify);

        let corporate_actions = match self.provider.get_corporate_actions(&ticker, start, end) {
            Ok(actions) => Some(actions),
            Err(e) => {
                tracing::warn!(ticker = %ticker, error = %e, "no corporate actions");
                None
            }
        };

        tracing::info!(
            ticker = %ticker,
            bars = frame.len(),
            columns = frame.columns.len(),
            skipped = frame.skipped.len(),
            "analysis computed"
        );

        Ok(AnalysisReport {
            ticker,
            start,
            end,
            latest,
            frame,
            rsi_zone,
            corporate_actions,
        })
    }

    pub fn quote(&self, input: &str) -> Result<Quote, DashboardError> {
        let ticker = self.resolve(input)?;
        let quote = self
            .provider
            .get_quote(&ticker)
            .map_err(|e| fetch_failed(&ticker, "quote", e))?;
        if !quote.is_usable() {
            return Err(DashboardError::QuoteUnavailable { ticker });
        }
        Ok(quote)
    }

    /// Append a holding to the session portfolio, starting the session if
    /// needed.
    pub fn add_holding(
        &self,
        store: &mut SessionStore,
        session: &SessionId,
        ticker: &str,
        shares: f64,
        cost_basis: f64,
    ) -> Result<Holding, DashboardError> {
        let holding = store
            .create(session.clone())
            .portfolio
            .add(ticker, shares, cost_basis)?;
        Ok(holding.clone())
    }

    /// Value the session portfolio against fresh quotes.
    ///
    /// Tickers whose quote cannot be fetched are valued at zero and flagged.
    pub fn portfolio(
        &self,
        store: &SessionStore,
        session: &SessionId,
    ) -> Result<PortfolioValuation, DashboardError> {
        let session_state = store
            .get(session)
            .ok_or_else(|| DashboardError::no_data(format!("session {session}")))?;
        let portfolio = &session_state.portfolio;

        let mut quotes = HashMap::new();
        for ticker in portfolio.tickers() {
            match self.provider.get_quote(ticker) {
                Ok(q) => {
                    quotes.insert(ticker.to_string(), q);
                }
                Err(e) => {
                    tracing::warn!(ticker, error = %e, "no quote for holding");
                }
            }
        }

        Ok(aggregate_portfolio(portfolio.holdings(), &quotes))
    }

    pub fn suggestion(&self, input: &str) -> Result<SuggestionReport, DashboardError> {
        let ticker = self.resolve(input)?;
        let labels = self
            .provider
            .get_recommendations(&ticker)
            .map_err(|e| fetch_failed(&ticker, "recommendations", e))?;
        if labels.is_empty() {
            return Err(DashboardError::no_data(&ticker));
        }
        let summary = classify_recommendations(&labels);
        Ok(SuggestionReport {
            ticker,
            labels,
            summary,
        })
    }

    /// Headlines with each title scored by `scorer`.
    pub fn news(
        &self,
        input: &str,
        scorer: &dyn SentimentScorer,
    ) -> Result<Vec<ScoredHeadline>, DashboardError> {
        let ticker = self.resolve(input)?;
        let items = self
            .provider
            .get_news(&ticker)
            .map_err(|e| fetch_failed(&ticker, "news", e))?;
        if items.is_empty() {
            return Err(DashboardError::no_data(&ticker));
        }
        Ok(items
            .into_iter()
            .map(|item| {
                let compound = scorer.compound(&item.title);
                ScoredHeadline {
                    sentiment: classify_sentiment(compound),
                    compound,
                    item,
                }
            })
            .collect())
    }

    /// Fetch one item per ticker, skipping failures. Stops early once the
    /// provider reports itself unavailable.
    fn fetch_each<T>(
        &self,
        tickers: &[String],
        what: &str,
        fetch: impl Fn(&str) -> Result<T, DataError>,
    ) -> Vec<T> {
        let mut out = Vec::with_capacity(tickers.len());
        for (i, ticker) in tickers.iter().enumerate() {
            if !self.provider.is_available() {
                tracing::warn!(what, skipped = tickers.len() - i, "provider unavailable");
                break;
            }
            match fetch(ticker.as_str()) {
                Ok(v) => out.push(v),
                Err(e) => tracing::warn!(ticker = %ticker, what, error = %e, "skipping ticker"),
            }
        }
        out
    }

    /// Latest session for each configured trending ticker, most active first.
    /// Tickers without a snapshot are left out.
    pub fn trending(&self) -> Result<Vec<DaySnapshot>, DashboardError> {
        let snapshots = self.fetch_each(&self.config.lists.trending, "snapshot", |t| {
            self.provider.get_day_snapshot(t)
        });
        if snapshots.is_empty() {
            return Err(DashboardError::no_data("trending list"));
        }
        Ok(rank_trending(snapshots))
    }

    /// Fundamentals for the configured screener list, filtered.
    pub fn screener(&self, filter: &ScreenerFilter) -> Result<ScreenerReport, DashboardError> {
        let rows = self.fetch_each(&self.config.lists.screener, "profile", |t| {
            self.provider.get_profile(t).map(|p| ScreenerRow::from(&p))
        });
        if rows.is_empty() {
            return Err(DashboardError::no_data("screener list"));
        }
        let total = rows.len();
        let available = sectors(&rows).into_iter().map(str::to_string).collect();
        let rows = filter.apply(&rows).into_iter().cloned().collect();
        Ok(ScreenerReport {
            total,
            sectors: available,
            rows,
        })
    }

    pub fn company_info(&self, input: &str) -> Result<CompanyProfile, DashboardError> {
        let ticker = self.resolve(input)?;
        self.provider
            .get_profile(&ticker)
            .map_err(|e| fetch_failed(&ticker, "profile", e))
    }

    /// Annual and quarterly statements with institutional holders. A response
    /// carrying none of them is no data.
    pub fn financials(&self, input: &str) -> Result<Financials, DashboardError> {
        let ticker = self.resolve(input)?;
        let financials = self
            .provider
            .get_financials(&ticker)
            .map_err(|e| fetch_failed(&ticker, "financials", e))?;
        if financials.is_empty() {
            return Err(DashboardError::no_data(&ticker));
        }
        Ok(financials)
    }
}

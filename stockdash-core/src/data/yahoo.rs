//! Yahoo Finance data provider.
//!
//! Uses three public endpoints:
//! - v8 chart: daily bars, latest price, day snapshot, dividends and splits
//! - v10 quoteSummary: analyst grade changes, company profile, financial
//!   statements, institutional ownership
//! - v1 search: news headlines
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; every parse failure maps to `DataError::ResponseFormatChanged`
//! so pages degrade to "no data" rather than failing loudly.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataSource, MarketDataProvider};
use crate::config::ProviderConfig;
use crate::domain::{
    CompanyProfile, CorporateActions, DaySnapshot, Dividend, FinancialStatement, Financials,
    InstitutionalHolder, NewsItem, PriceBar, PriceSeries, Quote, ReportingPeriod, StatementKind,
    StockSplit,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://query2.finance.yahoo.com";
const NEWS_COUNT: u32 = 10;
const FINANCIAL_MODULES: &str = "incomeStatementHistory,incomeStatementHistoryQuarterly,\
balanceSheetHistory,balanceSheetHistoryQuarterly,\
cashflowStatementHistory,cashflowStatementHistoryQuarterly,institutionOwnership";

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
    events: Option<ChartEvents>,
}

/// Present only when the request asks for `events=div,splits`; keyed by
/// the event timestamp as a string.
#[derive(Debug, Default, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: BTreeMap<String, DividendEvent>,
    #[serde(default)]
    splits: BTreeMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: Option<f64>,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: Option<f64>,
    denominator: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryResult,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    result: Option<Vec<SummaryModules>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryModules {
    upgrade_downgrade_history: Option<GradeHistory>,
    price: Option<PriceModule>,
    summary_profile: Option<ProfileModule>,
    summary_detail: Option<DetailModule>,
    income_statement_history: Option<StatementHistory>,
    income_statement_history_quarterly: Option<StatementHistory>,
    balance_sheet_history: Option<StatementHistory>,
    balance_sheet_history_quarterly: Option<StatementHistory>,
    cashflow_statement_history: Option<StatementHistory>,
    cashflow_statement_history_quarterly: Option<StatementHistory>,
    institution_ownership: Option<OwnershipModule>,
}

/// Each statement module wraps its list under a different key.
#[derive(Debug, Deserialize)]
struct StatementHistory {
    #[serde(
        alias = "incomeStatementHistory",
        alias = "balanceSheetStatements",
        alias = "cashflowStatements",
        default
    )]
    statements: Vec<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnershipModule {
    #[serde(default)]
    ownership_list: Vec<OwnershipEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnershipEntry {
    organization: Option<String>,
    report_date: Option<RawValue>,
    pct_held: Option<RawValue>,
    position: Option<RawValue>,
    value: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct GradeHistory {
    #[serde(default)]
    history: Vec<GradeChange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeChange {
    to_grade: Option<String>,
}

/// quoteSummary numbers arrive as `{"raw": 1.0, "fmt": "1.00"}` or `{}`.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileModule {
    sector: Option<String>,
    industry: Option<String>,
    website: Option<String>,
    full_time_employees: Option<u64>,
    long_business_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailModule {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    dividend_yield: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
struct SearchNews {
    title: Option<String>,
    publisher: Option<String>,
    link: Option<String>,
}

// ── Parsing ──────────────────────────────────────────────────────────

fn api_error(symbol: &str, err: Option<ApiError>) -> DataError {
    match err {
        Some(e) if e.code == "Not Found" => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(e) => DataError::ResponseFormatChanged(format!("{}: {}", e.code, e.description)),
        None => DataError::ResponseFormatChanged("empty result with no error".into()),
    }
}

fn first_chart(symbol: &str, resp: ChartResponse) -> Result<ChartData, DataError> {
    resp.chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| api_error(symbol, resp.chart.error))
}

/// Convert chart rows into bars.
///
/// Rows without a close (holidays, halted sessions) are dropped; a missing
/// open/high/low falls back to the close. When Yahoo repeats a date (the live
/// session is sometimes appended twice) the later row wins.
fn chart_bars(symbol: &str, data: &ChartData) -> Result<Vec<PriceBar>, DataError> {
    let timestamps = data
        .timestamp
        .as_ref()
        .ok_or_else(|| DataError::Empty(symbol.to_string()))?;
    let quote = data
        .indicators
        .quote
        .first()
        .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

    let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = date_from_timestamp(ts)
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        if !(close.is_finite() && close > 0.0) {
            continue;
        }
        let field = |v: &Vec<Option<f64>>| {
            v.get(i)
                .copied()
                .flatten()
                .filter(|x| x.is_finite() && *x > 0.0)
                .unwrap_or(close)
        };

        let bar = PriceBar {
            date,
            open: field(&quote.open),
            high: field(&quote.high),
            low: field(&quote.low),
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        };

        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            Some(last) if last.date > date => {
                return Err(DataError::ResponseFormatChanged(format!(
                    "timestamps out of order at {date}"
                )))
            }
            _ => bars.push(bar),
        }
    }

    if bars.is_empty() {
        return Err(DataError::Empty(symbol.to_string()));
    }
    Ok(bars)
}

fn parse_history(symbol: &str, resp: ChartResponse) -> Result<PriceSeries, DataError> {
    let data = first_chart(symbol, resp)?;
    let bars = chart_bars(symbol, &data)?;
    PriceSeries::new(symbol, bars).map_err(|e| DataError::ResponseFormatChanged(e.to_string()))
}

fn meta_name(meta: Option<&ChartMeta>) -> Option<String> {
    meta.and_then(|m| m.long_name.clone().or_else(|| m.short_name.clone()))
}

fn parse_quote(symbol: &str, resp: ChartResponse) -> Result<Quote, DataError> {
    let data = first_chart(symbol, resp)?;
    let live = data
        .meta
        .as_ref()
        .and_then(|m| m.regular_market_price)
        .filter(|p| p.is_finite() && *p > 0.0);
    let price = match live {
        Some(p) => p,
        None => {
            let bars = chart_bars(symbol, &data)?;
            bars.last()
                .map(|b| b.close)
                .ok_or_else(|| DataError::Empty(symbol.to_string()))?
        }
    };
    Ok(Quote::new(symbol, price))
}

fn parse_day_snapshot(symbol: &str, resp: ChartResponse) -> Result<DaySnapshot, DataError> {
    let data = first_chart(symbol, resp)?;
    let bars = chart_bars(symbol, &data)?;
    let last = bars
        .last()
        .ok_or_else(|| DataError::Empty(symbol.to_string()))?;
    Ok(DaySnapshot {
        ticker: symbol.to_string(),
        name: meta_name(data.meta.as_ref()),
        open: last.open,
        close: last.close,
        volume: last.volume,
    })
}

fn first_summary(symbol: &str, resp: SummaryResponse) -> Result<SummaryModules, DataError> {
    resp.quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| api_error(symbol, resp.quote_summary.error))
}

fn parse_recommendations(symbol: &str, resp: SummaryResponse) -> Result<Vec<String>, DataError> {
    let modules = first_summary(symbol, resp)?;
    let labels: Vec<String> = modules
        .upgrade_downgrade_history
        .map(|h| h.history)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|g| g.to_grade)
        .filter(|g| !g.trim().is_empty())
        .collect();
    if labels.is_empty() {
        return Err(DataError::Empty(symbol.to_string()));
    }
    Ok(labels)
}

fn raw(v: Option<RawValue>) -> Option<f64> {
    v.and_then(|r| r.raw).filter(|x| x.is_finite())
}

fn parse_profile(symbol: &str, resp: SummaryResponse) -> Result<CompanyProfile, DataError> {
    let modules = first_summary(symbol, resp)?;
    let mut profile = CompanyProfile {
        ticker: symbol.to_string(),
        ..Default::default()
    };

    let mut detail_cap = None;
    if let Some(detail) = modules.summary_detail {
        profile.trailing_pe = raw(detail.trailing_pe);
        profile.dividend_yield = raw(detail.dividend_yield);
        detail_cap = raw(detail.market_cap);
    }
    if let Some(price) = modules.price {
        profile.name = price.long_name.or(price.short_name);
        profile.market_cap = raw(price.market_cap);
    }
    profile.market_cap = profile.market_cap.or(detail_cap);
    if let Some(p) = modules.summary_profile {
        profile.sector = p.sector;
        profile.industry = p.industry;
        profile.website = p.website;
        profile.employees = p.full_time_employees;
        profile.summary = p.long_business_summary;
    }
    Ok(profile)
}

fn date_from_timestamp(ts: i64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.naive_utc().date())
}

/// Dividends and splits, oldest first. A chart without events is a ticker
/// that never paid or split in the range.
fn parse_corporate_actions(
    symbol: &str,
    resp: ChartResponse,
) -> Result<CorporateActions, DataError> {
    let data = first_chart(symbol, resp)?;
    let events = data.events.unwrap_or_default();

    let mut dividends: Vec<Dividend> = events
        .dividends
        .into_values()
        .filter_map(|e| {
            let amount = e.amount.filter(|a| a.is_finite() && *a > 0.0)?;
            Some(Dividend {
                date: date_from_timestamp(e.date)?,
                amount,
            })
        })
        .collect();
    dividends.sort_by_key(|d| d.date);

    let mut splits: Vec<StockSplit> = events
        .splits
        .into_values()
        .filter_map(|e| {
            Some(StockSplit {
                date: date_from_timestamp(e.date)?,
                numerator: e.numerator.filter(|n| *n > 0.0)?,
                denominator: e.denominator.filter(|d| *d > 0.0)?,
            })
        })
        .collect();
    splits.sort_by_key(|s| s.date);

    Ok(CorporateActions { dividends, splits })
}

/// Line items are `{"raw": n, "fmt": ".."}` objects; anything else (maxAge,
/// empty `{}` placeholders) is skipped. Entries without an end date are
/// dropped.
fn parse_statement(
    kind: StatementKind,
    period: ReportingPeriod,
    raw: BTreeMap<String, serde_json::Value>,
) -> Option<FinancialStatement> {
    let number = |v: &serde_json::Value| v.get("raw").and_then(serde_json::Value::as_f64);
    let end_date = raw
        .get("endDate")
        .and_then(number)
        .and_then(|ts| date_from_timestamp(ts as i64))?;
    let items = raw
        .iter()
        .filter(|(k, _)| k.as_str() != "endDate")
        .filter_map(|(k, v)| Some((k.clone(), number(v).filter(|x| x.is_finite())?)))
        .collect();
    Some(FinancialStatement {
        kind,
        period,
        end_date,
        items,
    })
}

fn parse_financials(symbol: &str, resp: SummaryResponse) -> Result<Financials, DataError> {
    let modules = first_summary(symbol, resp)?;
    let sections = [
        (StatementKind::Income, ReportingPeriod::Annual, modules.income_statement_history),
        (
            StatementKind::Income,
            ReportingPeriod::Quarterly,
            modules.income_statement_history_quarterly,
        ),
        (StatementKind::BalanceSheet, ReportingPeriod::Annual, modules.balance_sheet_history),
        (
            StatementKind::BalanceSheet,
            ReportingPeriod::Quarterly,
            modules.balance_sheet_history_quarterly,
        ),
        (StatementKind::CashFlow, ReportingPeriod::Annual, modules.cashflow_statement_history),
        (
            StatementKind::CashFlow,
            ReportingPeriod::Quarterly,
            modules.cashflow_statement_history_quarterly,
        ),
    ];

    let statements = sections
        .into_iter()
        .flat_map(|(kind, period, history)| {
            history
                .map(|h| h.statements)
                .unwrap_or_default()
                .into_iter()
                .filter_map(move |raw| parse_statement(kind, period, raw))
        })
        .collect();

    let institutional_holders = modules
        .institution_ownership
        .map(|o| o.ownership_list)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|e| {
            let organization = e.organization.filter(|o| !o.trim().is_empty())?;
            Some(InstitutionalHolder {
                organization,
                reported: raw(e.report_date).and_then(|ts| date_from_timestamp(ts as i64)),
                pct_held: raw(e.pct_held),
                shares: raw(e.position).filter(|p| *p >= 0.0).map(|p| p as u64),
                value: raw(e.value),
            })
        })
        .collect();

    Ok(Financials {
        ticker: symbol.to_string(),
        statements,
        institutional_holders,
    })
}

fn parse_news(symbol: &str, resp: SearchResponse) -> Result<Vec<NewsItem>, DataError> {
    let items: Vec<NewsItem> = resp
        .news
        .into_iter()
        .filter_map(|n| {
            let title = n.title.filter(|t| !t.trim().is_empty())?;
            Some(NewsItem {
                title,
                publisher: n.publisher.unwrap_or_else(|| "Unknown".into()),
                link: n.link.unwrap_or_default(),
            })
        })
        .collect();
    if items.is_empty() {
        return Err(DataError::Empty(symbol.to_string()));
    }
    Ok(items)
}

// ── Provider ─────────────────────────────────────────────────────────

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Exponential backoff before retry `attempt` (1-based), capped at
/// `MAX_BACKOFF`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

impl YahooProvider {
    pub fn new(cfg: &ProviderConfig, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(cfg.timeout())
            .user_agent(cfg.user_agent.as_str())
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: cfg.max_retries,
            base_delay: Duration::from_millis(cfg.retry_base_delay_ms),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{BASE_URL}/v8/finance/chart/{symbol}")
    }

    fn summary_url(&self, symbol: &str) -> String {
        format!("{BASE_URL}/v10/finance/quoteSummary/{symbol}")
    }

    /// One GET with circuit breaker checks and optional retry with
    /// exponential backoff.
    fn get_json<T: DeserializeOwned>(
        &self,
        symbol: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.base_delay, attempt);
                tracing::debug!(symbol, attempt, ?delay, "retrying provider request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(url).query(query).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "Yahoo Finance requires authentication".into(),
                ));
            }

            // 404 carries a JSON body with an error code; let the parser map it.
            if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let body: T = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse response for {symbol}: {e}"
                ))
            })?;
            self.circuit_breaker.record_success();
            return Ok(body);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }

    /// Daily chart from `start` through `end` inclusive.
    fn range_chart(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        events: Option<&str>,
    ) -> Result<ChartResponse, DataError> {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = (end + chrono::Duration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        let mut query = vec![
            ("period1", start_ts.to_string()),
            ("period2", end_ts.to_string()),
            ("interval", "1d".to_string()),
        ];
        if let Some(events) = events {
            query.push(("events", events.to_string()));
        }
        self.get_json(ticker, &self.chart_url(ticker), &query)
    }

    fn recent_chart(&self, ticker: &str) -> Result<ChartResponse, DataError> {
        self.get_json(
            ticker,
            &self.chart_url(ticker),
            &[("range", "5d".into()), ("interval", "1d".into())],
        )
    }

    fn summary(&self, ticker: &str, modules: &str) -> Result<SummaryResponse, DataError> {
        self.get_json(ticker, &self.summary_url(ticker), &[("modules", modules.into())])
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        parse_history(ticker, self.range_chart(ticker, start, end, None)?)
    }

    fn get_quote(&self, ticker: &str) -> Result<Quote, DataError> {
        parse_quote(ticker, self.recent_chart(ticker)?)
    }

    fn get_recommendations(&self, ticker: &str) -> Result<Vec<String>, DataError> {
        parse_recommendations(ticker, self.summary(ticker, "upgradeDowngradeHistory")?)
    }

    fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, DataError> {
        let resp = self.get_json(
            ticker,
            &format!("{BASE_URL}/v1/finance/search"),
            &[
                ("q", ticker.to_string()),
                ("quotesCount", "0".into()),
                ("newsCount", NEWS_COUNT.to_string()),
            ],
        )?;
        parse_news(ticker, resp)
    }

    fn get_profile(&self, ticker: &str) -> Result<CompanyProfile, DataError> {
        parse_profile(ticker, self.summary(ticker, "price,summaryProfile,summaryDetail")?)
    }

    fn get_day_snapshot(&self, ticker: &str) -> Result<DaySnapshot, DataError> {
        parse_day_snapshot(ticker, self.recent_chart(ticker)?)
    }

    fn get_corporate_actions(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CorporateActions, DataError> {
        let resp = self.range_chart(ticker, start, end, Some("div,splits"))?;
        parse_corporate_actions(ticker, resp)
    }

    fn get_financials(&self, ticker: &str) -> Result<Financials, DataError> {
        parse_financials(ticker, self.summary(ticker, FINANCIAL_MODULES)?)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    fn summary(json: &str) -> SummaryResponse {
        serde_json::from_str(json).unwrap()
    }

    // 2024-01-02, 2024-01-03, 2024-01-04 at 14:30 UTC
    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"regularMarketPrice": 187.5, "longName": "Apple Inc."},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {"quote": [{
                    "open":   [187.0, null, 182.1],
                    "high":   [188.4, null, 183.0],
                    "low":    [183.9, null, 180.9],
                    "close":  [185.6, null, 181.9],
                    "volume": [82488700, null, 71983600]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn history_skips_rows_without_close() {
        let s = parse_history("AAPL", chart(CHART)).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.bars()[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(s.bars()[1].close, 181.9);
        assert_eq!(s.bars()[1].volume, 71_983_600);
    }

    #[test]
    fn missing_open_falls_back_to_close() {
        let json = r#"{"chart": {"result": [{
            "timestamp": [1704205800],
            "indicators": {"quote": [{"open": [null], "high": [2.0], "low": [1.0], "close": [1.5], "volume": [null]}]}
        }], "error": null}}"#;
        let s = parse_history("X", chart(json)).unwrap();
        assert_eq!(s.bars()[0].open, 1.5);
        assert_eq!(s.bars()[0].volume, 0);
    }

    #[test]
    fn duplicate_trailing_date_keeps_latest() {
        let json = r#"{"chart": {"result": [{
            "timestamp": [1704205800, 1704222000],
            "indicators": {"quote": [{"open": [1.0, 1.0], "high": [2.0, 2.0], "low": [1.0, 1.0], "close": [1.5, 1.7], "volume": [10, 20]}]}
        }], "error": null}}"#;
        let s = parse_history("X", chart(json)).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.bars()[0].close, 1.7);
    }

    #[test]
    fn not_found_maps_to_symbol_not_found() {
        let json = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let err = parse_history("ZZZZ", chart(json)).unwrap_err();
        assert_eq!(
            err,
            DataError::SymbolNotFound {
                symbol: "ZZZZ".into()
            }
        );
    }

    #[test]
    fn no_timestamps_is_empty() {
        let json = r#"{"chart": {"result": [{"indicators": {"quote": [{}]}}], "error": null}}"#;
        assert!(matches!(
            parse_history("X", chart(json)).unwrap_err(),
            DataError::Empty(_)
        ));
    }

    #[test]
    fn quote_prefers_live_price() {
        let q = parse_quote("AAPL", chart(CHART)).unwrap();
        assert_eq!(q, Quote::new("AAPL", 187.5));
    }

    #[test]
    fn quote_falls_back_to_last_close() {
        let json = CHART.replace("\"regularMarketPrice\": 187.5, ", "");
        let q = parse_quote("AAPL", chart(&json)).unwrap();
        assert_eq!(q.last_price, 181.9);
    }

    #[test]
    fn day_snapshot_uses_last_bar_and_name() {
        let snap = parse_day_snapshot("AAPL", chart(CHART)).unwrap();
        assert_eq!(snap.name.as_deref(), Some("Apple Inc."));
        assert_eq!(snap.open, 182.1);
        assert_eq!(snap.close, 181.9);
        assert_eq!(snap.volume, 71_983_600);
    }

    #[test]
    fn recommendations_collect_to_grades() {
        let json = r#"{"quoteSummary": {"result": [{"upgradeDowngradeHistory": {"history": [
            {"firm": "A", "toGrade": "Buy", "fromGrade": "Hold"},
            {"firm": "B", "toGrade": "Outperform"},
            {"firm": "C", "toGrade": ""},
            {"firm": "D"}
        ]}}], "error": null}}"#;
        let labels = parse_recommendations("AAPL", summary(json)).unwrap();
        assert_eq!(labels, vec!["Buy", "Outperform"]);
    }

    #[test]
    fn recommendations_empty_history() {
        let json = r#"{"quoteSummary": {"result": [{}], "error": null}}"#;
        assert!(matches!(
            parse_recommendations("AAPL", summary(json)).unwrap_err(),
            DataError::Empty(_)
        ));
    }

    #[test]
    fn profile_reads_raw_values() {
        let json = r#"{"quoteSummary": {"result": [{
            "price": {"longName": "Microsoft Corporation", "marketCap": {"raw": 3.1e12, "fmt": "3.1T"}},
            "summaryProfile": {"sector": "Technology", "industry": "Software", "fullTimeEmployees": 221000},
            "summaryDetail": {"trailingPE": {"raw": 36.5}, "dividendYield": {}}
        }], "error": null}}"#;
        let p = parse_profile("MSFT", summary(json)).unwrap();
        assert_eq!(p.display_name(), "Microsoft Corporation");
        assert_eq!(p.sector.as_deref(), Some("Technology"));
        assert_eq!(p.market_cap, Some(3.1e12));
        assert_eq!(p.trailing_pe, Some(36.5));
        assert_eq!(p.dividend_yield, None);
        assert_eq!(p.employees, Some(221_000));
    }

    #[test]
    fn news_skips_untitled_items() {
        let json = r#"{"news": [
            {"title": "Apple beats estimates", "publisher": "Reuters", "link": "https://example.com/a"},
            {"title": "", "publisher": "X"},
            {"publisher": "Y"}
        ]}"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        let items = parse_news("AAPL", resp).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].publisher, "Reuters");
    }

    #[test]
    fn news_without_items_is_empty() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parse_news("AAPL", resp).is_err());
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), base);
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2000));
        assert_eq!(backoff_delay(base, 8), MAX_BACKOFF);
        assert_eq!(backoff_delay(base, 40), MAX_BACKOFF);
        assert_eq!(backoff_delay(Duration::MAX, u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn corporate_actions_sorted_by_date() {
        let json = r#"{"chart": {"result": [{
            "timestamp": [1704205800],
            "indicators": {"quote": [{"close": [1.5]}]},
            "events": {
                "dividends": {
                    "1715348400": {"amount": 0.25, "date": 1715348400},
                    "1707489000": {"amount": 0.24, "date": 1707489000},
                    "1699540200": {"date": 1699540200}
                },
                "splits": {
                    "1598880600": {"date": 1598880600, "numerator": 4, "denominator": 1, "splitRatio": "4:1"}
                }
            }
        }], "error": null}}"#;
        let actions = parse_corporate_actions("AAPL", chart(json)).unwrap();
        assert_eq!(actions.dividends.len(), 2);
        assert_eq!(actions.dividends[0].amount, 0.24);
        assert!(actions.dividends[0].date < actions.dividends[1].date);
        assert_eq!(actions.splits.len(), 1);
        assert_eq!(actions.splits[0].date, NaiveDate::from_ymd_opt(2020, 8, 31).unwrap());
        assert_eq!(actions.splits[0].ratio(), Some(4.0));
    }

    #[test]
    fn chart_without_events_has_no_actions() {
        let actions = parse_corporate_actions("AAPL", chart(CHART)).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn financials_read_statements_and_holders() {
        let json = r#"{"quoteSummary": {"result": [{
            "incomeStatementHistory": {"incomeStatementHistory": [
                {"maxAge": 1, "endDate": {"raw": 1696032000, "fmt": "2023-09-30"},
                 "totalRevenue": {"raw": 383285000000, "fmt": "383.29B"},
                 "netIncome": {"raw": 96995000000}, "researchDevelopment": {}},
                {"maxAge": 1, "totalRevenue": {"raw": 1.0}}
            ], "maxAge": 86400},
            "balanceSheetHistoryQuarterly": {"balanceSheetStatements": [
                {"endDate": {"raw": 1703894400}, "totalAssets": {"raw": 353514000000}}
            ]},
            "cashflowStatementHistory": {"cashflowStatements": []},
            "institutionOwnership": {"ownershipList": [
                {"organization": "Vanguard Group Inc", "reportDate": {"raw": 1703980800},
                 "pctHeld": {"raw": 0.0834}, "position": {"raw": 1297000000}, "value": {"raw": 2.4e11}},
                {"organization": "", "pctHeld": {"raw": 0.01}}
            ]}
        }], "error": null}}"#;
        let f = parse_financials("AAPL", summary(json)).unwrap();

        let income = f.statements_for(StatementKind::Income, ReportingPeriod::Annual);
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].end_date, NaiveDate::from_ymd_opt(2023, 9, 30).unwrap());
        assert_eq!(income[0].items.get("totalRevenue"), Some(&383_285_000_000.0));
        assert!(!income[0].items.contains_key("researchDevelopment"));
        assert!(!income[0].items.contains_key("maxAge"));

        let balance = f.statements_for(StatementKind::BalanceSheet, ReportingPeriod::Quarterly);
        assert_eq!(balance.len(), 1);
        assert!(f
            .statements_for(StatementKind::CashFlow, ReportingPeriod::Annual)
            .is_empty());

        assert_eq!(f.institutional_holders.len(), 1);
        let holder = &f.institutional_holders[0];
        assert_eq!(holder.organization, "Vanguard Group Inc");
        assert_eq!(holder.shares, Some(1_297_000_000));
        assert_eq!(holder.reported, NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[test]
    fn financials_without_modules_are_empty() {
        let json = r#"{"quoteSummary": {"result": [{}], "error": null}}"#;
        assert!(parse_financials("AAPL", summary(json)).unwrap().is_empty());
    }
}

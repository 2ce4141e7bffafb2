//! Deterministic offline provider.
//!
//! Every symbol gets its own random walk seeded from the BLAKE3 hash of the
//! ticker, always started from the same anchor date. Any two requests for the
//! same symbol therefore agree on overlapping dates, and the latest quote
//! matches the last close of the history.

use super::provider::{DataError, DataSource, MarketDataProvider};
use crate::domain::{
    normalize_ticker, CompanyProfile, CorporateActions, DaySnapshot, Dividend,
    FinancialStatement, Financials, InstitutionalHolder, NewsItem, PriceBar, PriceSeries, Quote,
    ReportingPeriod, StatementKind, StockSplit,
};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

const GRADES: [&str; 9] = [
    "Buy",
    "Strong Buy",
    "Outperform",
    "Overweight",
    "Hold",
    "Neutral",
    "Equal-Weight",
    "Underperform",
    "Sell",
];

const SECTORS: [&str; 6] = [
    "Technology",
    "Healthcare",
    "Financial Services",
    "Consumer Cyclical",
    "Energy",
    "Industrials",
];

const HEADLINES: [&str; 4] = [
    "{} shares rally after strong quarterly results",
    "Analysts stay cautious on {} ahead of earnings",
    "{} announces new product line",
    "{} faces weak demand and falling margins",
];

const HOLDERS: [&str; 6] = [
    "Vanguard Group Inc",
    "Blackrock Inc.",
    "State Street Corporation",
    "FMR, LLC",
    "Geode Capital Management, LLC",
    "Morgan Stanley",
];

/// Dividend ex-dates fall in these months, on the first weekday from the 15th.
const DIVIDEND_MONTHS: [u32; 4] = [2, 5, 8, 11];

const QUARTER_ENDS: [(u32, u32); 4] = [(3, 31), (6, 30), (9, 30), (12, 31)];

fn next_weekday(mut date: NaiveDate) -> NaiveDate {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += chrono::Duration::days(1);
    }
    date
}

fn statement(
    kind: StatementKind,
    period: ReportingPeriod,
    end_date: NaiveDate,
    items: &[(&str, f64)],
) -> FinancialStatement {
    FinancialStatement {
        kind,
        period,
        end_date,
        items: items
            .iter()
            .map(|(name, v)| (name.to_string(), v.round()))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub struct SyntheticProvider {
    anchor: NaiveDate,
    as_of: NaiveDate,
}

impl SyntheticProvider {
    /// Synthetic market whose latest session is on or before `as_of`.
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            anchor: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN),
            as_of,
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    fn rng(ticker: &str, salt: &str) -> StdRng {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ticker.as_bytes());
        hasher.update(salt.as_bytes());
        StdRng::from_seed(*hasher.finalize().as_bytes())
    }

    fn ticker(raw: &str) -> Result<String, DataError> {
        normalize_ticker(raw).map_err(|_| DataError::SymbolNotFound {
            symbol: raw.to_string(),
        })
    }

    /// Walk from the anchor through `end`, keeping bars on or after `start`.
    fn walk(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
        let mut rng = Self::rng(ticker, "bars");
        let mut price: f64 = rng.gen_range(20.0..500.0);
        let mut bars = Vec::new();
        let mut current = self.anchor;
        let end = end.min(self.as_of);

        while current <= end {
            let weekday = current.weekday();
            if weekday == Weekday::Sat || weekday == Weekday::Sun {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..50_000_000u64);

            if current >= start {
                bars.push(PriceBar {
                    date: current,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }

            price = close;
            current += chrono::Duration::days(1);
        }

        bars
    }

    /// Three statement kinds for one period, scaled from a revenue draw.
    fn statements_for_period(
        rng: &mut StdRng,
        period: ReportingPeriod,
        end_date: NaiveDate,
        scale: f64,
    ) -> Vec<FinancialStatement> {
        let revenue = scale * rng.gen_range(0.8..1.2);
        let gross = revenue * rng.gen_range(0.3..0.7);
        let operating = gross * rng.gen_range(0.3..0.8);
        let net = operating * rng.gen_range(0.6..0.9);
        let assets = revenue * rng.gen_range(1.0..3.0);
        let liabilities = assets * rng.gen_range(0.3..0.8);
        let operating_cash = net * rng.gen_range(1.0..1.5);
        let capex = -operating_cash * rng.gen_range(0.1..0.4);

        vec![
            statement(
                StatementKind::Income,
                period,
                end_date,
                &[
                    ("totalRevenue", revenue),
                    ("grossProfit", gross),
                    ("operatingIncome", operating),
                    ("netIncome", net),
                ],
            ),
            statement(
                StatementKind::BalanceSheet,
                period,
                end_date,
                &[
                    ("totalAssets", assets),
                    ("totalLiab", liabilities),
                    ("totalStockholderEquity", assets - liabilities),
                ],
            ),
            statement(
                StatementKind::CashFlow,
                period,
                end_date,
                &[
                    ("totalCashFromOperatingActivities", operating_cash),
                    ("capitalExpenditures", capex),
                    ("freeCashFlow", operating_cash + capex),
                ],
            ),
        ]
    }

    fn last_bar(&self, ticker: &str) -> Result<PriceBar, DataError> {
        let start = self.as_of - chrono::Duration::days(7);
        self.walk(ticker, start, self.as_of)
            .pop()
            .ok_or_else(|| DataError::Empty(ticker.to_string()))
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn get_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let ticker = Self::ticker(ticker)?;
        let bars = self.walk(&ticker, start, end);
        if bars.is_empty() {
            return Err(DataError::Empty(ticker));
        }
        PriceSeries::new(ticker, bars).map_err(|e| DataError::Other(e.to_string()))
    }

    fn get_quote(&self, ticker: &str) -> Result<Quote, DataError> {
        let ticker = Self::ticker(ticker)?;
        let bar = self.last_bar(&ticker)?;
        Ok(Quote::new(ticker, bar.close))
    }

    fn get_recommendations(&self, ticker: &str) -> Result<Vec<String>, DataError> {
        let ticker = Self::ticker(ticker)?;
        let mut rng = Self::rng(&ticker, "grades");
        let n = rng.gen_range(4..12);
        Ok((0..n)
            .map(|_| GRADES[rng.gen_range(0..GRADES.len())].to_string())
            .collect())
    }

    fn get_news(&self, ticker: &str) -> Result<Vec<NewsItem>, DataError> {
        let ticker = Self::ticker(ticker)?;
        Ok(HEADLINES
            .iter()
            .enumerate()
            .map(|(i, template)| NewsItem {
                title: template.replace("{}", &ticker),
                publisher: "Synthetic Wire".into(),
                link: format!("https://example.com/news/{}/{i}", ticker.to_lowercase()),
            })
            .collect())
    }

    fn get_profile(&self, ticker: &str) -> Result<CompanyProfile, DataError> {
        let ticker = Self::ticker(ticker)?;
        let close = self.last_bar(&ticker)?.close;
        let mut rng = Self::rng(&ticker, "profile");
        let shares_outstanding: f64 = rng.gen_range(1.0e8..1.0e10);
        let pays_dividend = rng.gen_bool(0.6);

        Ok(CompanyProfile {
            name: Some(format!("{ticker} Holdings Inc.")),
            sector: Some(SECTORS[rng.gen_range(0..SECTORS.len())].to_string()),
            industry: Some("Diversified".into()),
            market_cap: Some(close * shares_outstanding),
            trailing_pe: Some(rng.gen_range(5.0..60.0)),
            dividend_yield: pays_dividend.then(|| rng.gen_range(0.001..0.06)),
            website: Some(format!("https://www.{}.example.com", ticker.to_lowercase())),
            employees: Some(rng.gen_range(1_000..300_000)),
            summary: Some(format!(
                "{ticker} is a synthetic company used for offline dashboards."
            )),
            ticker,
        })
    }

    fn get_day_snapshot(&self, ticker: &str) -> Result<DaySnapshot, DataError> {
        let ticker = Self::ticker(ticker)?;
        let bar = self.last_bar(&ticker)?;
        Ok(DaySnapshot {
            name: Some(format!("{ticker} Holdings Inc.")),
            ticker,
            open: bar.open,
            close: bar.close,
            volume: bar.volume,
        })
    }

    fn get_corporate_actions(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CorporateActions, DataError> {
        let profile = self.get_profile(ticker)?;
        let ticker = profile.ticker.clone();
        let end = end.min(self.as_of);
        let mut actions = CorporateActions::default();

        if let Some(yield_) = profile.dividend_yield {
            let close = self.last_bar(&ticker)?.close;
            let amount = (close * yield_ / 4.0 * 100.0).round() / 100.0;
            for year in start.year()..=end.year() {
                for month in DIVIDEND_MONTHS {
                    let Some(day) = NaiveDate::from_ymd_opt(year, month, 15) else {
                        continue;
                    };
                    let date = next_weekday(day);
                    if date >= start && date <= end {
                        actions.dividends.push(Dividend { date, amount });
                    }
                }
            }
        }

        let mut rng = Self::rng(&ticker, "splits");
        if rng.gen_bool(0.3) {
            let year = rng.gen_range(1995..2022);
            let month = rng.gen_range(1..=12);
            let numerator = [2.0, 3.0, 4.0][rng.gen_range(0..3)];
            if let Some(day) = NaiveDate::from_ymd_opt(year, month, 1) {
                let date = next_weekday(day);
                if date >= start && date <= end {
                    actions.splits.push(StockSplit {
                        date,
                        numerator,
                        denominator: 1.0,
                    });
                }
            }
        }

        Ok(actions)
    }

    fn get_financials(&self, ticker: &str) -> Result<Financials, DataError> {
        let ticker = Self::ticker(ticker)?;
        let mut rng = Self::rng(&ticker, "financials");
        let annual_revenue: f64 = rng.gen_range(1.0e9..4.0e11);
        let mut statements = Vec::new();

        let year = self.as_of.year();
        for y in (year - 4)..year {
            if let Some(end_date) = NaiveDate::from_ymd_opt(y, 12, 31) {
                statements.extend(Self::statements_for_period(
                    &mut rng,
                    ReportingPeriod::Annual,
                    end_date,
                    annual_revenue,
                ));
            }
        }

        let mut quarter_ends: Vec<NaiveDate> = [year - 1, year]
            .iter()
            .flat_map(|&y| {
                QUARTER_ENDS
                    .iter()
                    .filter_map(move |&(m, d)| NaiveDate::from_ymd_opt(y, m, d))
            })
            .filter(|d| *d < self.as_of)
            .collect();
        let skip = quarter_ends.len().saturating_sub(4);
        quarter_ends.drain(..skip);
        for end_date in quarter_ends {
            statements.extend(Self::statements_for_period(
                &mut rng,
                ReportingPeriod::Quarterly,
                end_date,
                annual_revenue / 4.0,
            ));
        }

        let reported = NaiveDate::from_ymd_opt(year, 1, 1).map(|d| d.min(self.as_of));
        let institutional_holders = HOLDERS
            .iter()
            .map(|organization| {
                let pct_held: f64 = rng.gen_range(0.005..0.09);
                let shares = rng.gen_range(1_000_000..500_000_000u64);
                InstitutionalHolder {
                    organization: organization.to_string(),
                    reported,
                    pct_held: Some(pct_held),
                    shares: Some(shares),
                    value: None,
                }
            })
            .collect();

        Ok(Financials {
            ticker,
            statements,
            institutional_holders,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

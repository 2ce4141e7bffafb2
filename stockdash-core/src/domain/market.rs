//! Provider-facing market records: quotes, headlines, profiles, day snapshots,
//! corporate actions and financial statements.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest traded price for a ticker. Ephemeral; refreshed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub last_price: f64,
}

impl Quote {
    pub fn new(ticker: impl Into<String>, last_price: f64) -> Self {
        Self {
            ticker: ticker.into(),
            last_price,
        }
    }

    /// A quote can only value a holding if its price is finite and positive.
    pub fn is_usable(&self) -> bool {
        self.last_price.is_finite() && self.last_price > 0.0
    }
}

/// A news headline attached to a ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub publisher: String,
    pub link: String,
}

/// Company fundamentals used by the screener and the analysis page.
///
/// Every field except the ticker may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub ticker: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    /// Fractional yield as reported upstream (0.005 = 0.5%).
    pub dividend_yield: Option<f64>,
    pub website: Option<String>,
    pub employees: Option<u64>,
    pub summary: Option<String>,
}

impl CompanyProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("N/A")
    }

    pub fn display_sector(&self) -> &str {
        self.sector.as_deref().unwrap_or("N/A")
    }

    pub fn dividend_yield_pct(&self) -> f64 {
        self.dividend_yield.map(|y| y * 100.0).unwrap_or(0.0)
    }
}

/// The most recent trading session for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub ticker: String,
    pub name: Option<String>,
    pub open: f64,
    pub close: f64,
    pub volume: u64,
}

impl DaySnapshot {
    pub fn change(&self) -> f64 {
        self.close - self.open
    }

    /// Percent change from open; `None` when the open is not positive.
    pub fn pct_change(&self) -> Option<f64> {
        (self.open > 0.0).then(|| (self.close - self.open) / self.open * 100.0)
    }
}

/// Cash dividend paid per share on its ex-date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Share split, e.g. 4-for-1 is `numerator = 4`, `denominator = 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSplit {
    pub date: NaiveDate,
    pub numerator: f64,
    pub denominator: f64,
}

impl StockSplit {
    /// New shares per old share; `None` for a zero denominator.
    pub fn ratio(&self) -> Option<f64> {
        (self.denominator > 0.0).then(|| self.numerator / self.denominator)
    }
}

/// Dividends and splits in a date range, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorporateActions {
    pub dividends: Vec<Dividend>,
    pub splits: Vec<StockSplit>,
}

impl CorporateActions {
    pub fn is_empty(&self) -> bool {
        self.dividends.is_empty() && self.splits.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Income,
    BalanceSheet,
    CashFlow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPeriod {
    Annual,
    Quarterly,
}

/// One reported statement: line item name to value, for a period ending on
/// `end_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub kind: StatementKind,
    pub period: ReportingPeriod,
    pub end_date: NaiveDate,
    pub items: BTreeMap<String, f64>,
}

/// A fund or institution holding the stock as of its last filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalHolder {
    pub organization: String,
    pub reported: Option<NaiveDate>,
    /// Fraction of shares outstanding (0.07 = 7%).
    pub pct_held: Option<f64>,
    pub shares: Option<u64>,
    pub value: Option<f64>,
}

/// Statements and ownership for the company information section.
///
/// Every part may be missing upstream; an empty vector means "not reported".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub ticker: String,
    pub statements: Vec<FinancialStatement>,
    pub institutional_holders: Vec<InstitutionalHolder>,
}

impl Financials {
    /// Statements of one kind and period, newest first.
    pub fn statements_for(
        &self,
        kind: StatementKind,
        period: ReportingPeriod,
    ) -> Vec<&FinancialStatement> {
        let mut out: Vec<&FinancialStatement> = self
            .statements
            .iter()
            .filter(|s| s.kind == kind && s.period == period)
            .collect();
        out.sort_by(|a, b| b.end_date.cmp(&a.end_date));
        out
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.institutional_holders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_usability() {
        assert!(Quote::new("AAPL", 150.0).is_usable());
        assert!(!Quote::new("AAPL", 0.0).is_usable());
        assert!(!Quote::new("AAPL", f64::NAN).is_usable());
    }

    #[test]
    fn snapshot_change() {
        let s = DaySnapshot {
            ticker: "AAPL".into(),
            name: None,
            open: 200.0,
            close: 210.0,
            volume: 1,
        };
        assert_eq!(s.change(), 10.0);
        assert!((s.pct_change().unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn profile_defaults_display_na() {
        let p = CompanyProfile {
            ticker: "X".into(),
            ..Default::default()
        };
        assert_eq!(p.display_name(), "N/A");
        assert_eq!(p.dividend_yield_pct(), 0.0);
    }

    #[test]
    fn split_ratio() {
        let split = StockSplit {
            date: NaiveDate::from_ymd_opt(2020, 8, 31).unwrap(),
            numerator: 4.0,
            denominator: 1.0,
        };
        assert_eq!(split.ratio(), Some(4.0));
        let broken = StockSplit {
            denominator: 0.0,
            ..split
        };
        assert_eq!(broken.ratio(), None);
    }

    #[test]
    fn statements_filtered_newest_first() {
        let stmt = |kind, period, y| FinancialStatement {
            kind,
            period,
            end_date: NaiveDate::from_ymd_opt(y, 12, 31).unwrap(),
            items: BTreeMap::new(),
        };
        let f = Financials {
            ticker: "X".into(),
            statements: vec![
                stmt(StatementKind::Income, ReportingPeriod::Annual, 2022),
                stmt(StatementKind::Income, ReportingPeriod::Annual, 2023),
                stmt(StatementKind::CashFlow, ReportingPeriod::Annual, 2023),
                stmt(StatementKind::Income, ReportingPeriod::Quarterly, 2023),
            ],
            institutional_holders: vec![],
        };
        let annual = f.statements_for(StatementKind::Income, ReportingPeriod::Annual);
        assert_eq!(annual.len(), 2);
        assert_eq!(annual[0].end_date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert!(f
            .statements_for(StatementKind::BalanceSheet, ReportingPeriod::Quarterly)
            .is_empty());
        assert!(!f.is_empty());
        assert!(Financials::default().is_empty());
    }
}

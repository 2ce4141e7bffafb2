//! Domain types for StockDash

pub mod bar;
pub mod holding;
pub mod ids;
pub mod market;
pub mod series;

pub use bar::PriceBar;
pub use holding::{normalize_ticker, Holding};
pub use ids::SessionId;
pub use market::{
    CompanyProfile, CorporateActions, DaySnapshot, Dividend, FinancialStatement, Financials,
    InstitutionalHolder, NewsItem, Quote, ReportingPeriod, StatementKind, StockSplit,
};
pub use series::{series_from_closes, LatestSummary, PriceSeries};

/// Symbol type alias
pub type Symbol = String;

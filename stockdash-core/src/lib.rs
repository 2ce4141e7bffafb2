//! StockDash Core: market data, indicators and page logic for a stock
//! dashboard.
//!
//! - Domain types (bars, series, holdings, quotes, profiles)
//! - Technical indicators (SMA, EMA, Bollinger, RSI, MACD) as pure functions
//! - Portfolio valuation with partial-failure tolerance
//! - Recommendation and sentiment signals
//! - Provider trait with Yahoo, synthetic and memoizing implementations
//! - Session store and page handlers

pub mod config;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod portfolio;
pub mod screener;
pub mod session;
pub mod signals;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use error::DashboardError;

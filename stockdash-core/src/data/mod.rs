//! Market data access: providers, memoization and the ticker directory.

pub mod cached;
pub mod circuit_breaker;
pub mod directory;
pub mod memo;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use cached::CachedProvider;
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use directory::{DirectoryError, TickerDirectory};
pub use memo::MemoCache;
pub use provider::{DataError, DataSource, MarketDataProvider};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;

use crate::config::ProviderConfig;
use std::sync::Arc;

/// Build the provider the configuration asks for.
pub fn provider_from_config(
    cfg: &ProviderConfig,
    as_of: chrono::NaiveDate,
) -> Result<Box<dyn MarketDataProvider>, DataError> {
    if cfg.offline {
        tracing::info!("using synthetic market data");
        return Ok(Box::new(SyntheticProvider::new(as_of)));
    }
    let breaker = Arc::new(CircuitBreaker::from_config(cfg));
    Ok(Box::new(YahooProvider::new(cfg, breaker)?))
}

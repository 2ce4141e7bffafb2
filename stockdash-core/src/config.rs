//! Serializable dashboard configuration.
//!
//! Loaded from a TOML file; every section and field has a default so an
//! empty file (or no file) yields a working configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// First date requested when a page does not ask for a start date.
    pub history_start: NaiveDate,
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub indicators: IndicatorConfig,
    pub lists: ListsConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            history_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            provider: ProviderConfig::default(),
            cache: CacheConfig::default(),
            indicators: IndicatorConfig::default(),
            lists: ListsConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings that would make every page fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        if ind.moving_averages.iter().any(|&w| w == 0) {
            return Err(ConfigError::Invalid("moving average window of 0".into()));
        }
        if ind.bollinger_window == 0 || ind.rsi_window == 0 || ind.macd_signal == 0 {
            return Err(ConfigError::Invalid("indicator windows must be positive".into()));
        }
        if ind.macd_fast == 0 || ind.macd_fast >= ind.macd_slow {
            return Err(ConfigError::Invalid(format!(
                "macd needs 0 < fast < slow, got fast={} slow={}",
                ind.macd_fast, ind.macd_slow
            )));
        }
        if !(ind.bollinger_k.is_finite() && ind.bollinger_k >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "bollinger_k must be finite and non-negative, got {}",
                ind.bollinger_k
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider timeout must be positive".into()));
        }
        if self.provider.max_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "max_retries must be at most {MAX_RETRIES}, got {}",
                self.provider.max_retries
            )));
        }
        Ok(())
    }
}

/// Upper bound on `ProviderConfig::max_retries`.
pub const MAX_RETRIES: u32 = 10;

/// Market data provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Extra attempts after a failed request. 0 = single blocking call.
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub breaker_cooldown_secs: u64,
    pub breaker_failure_threshold: u32,
    /// Use the deterministic synthetic provider instead of the network.
    pub offline: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            max_retries: 0,
            retry_base_delay_ms: 500,
            breaker_cooldown_secs: 30 * 60,
            breaker_failure_threshold: 3,
            offline: false,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }
}

/// Memoization of provider calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime. `None` keeps entries until explicitly invalidated.
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: Some(15 * 60),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

/// Indicator windows for the analysis pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndicatorConfig {
    pub moving_averages: Vec<usize>,
    pub bollinger_window: usize,
    pub bollinger_k: f64,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            moving_averages: vec![20, 50],
            bollinger_window: 20,
            bollinger_k: 2.0,
            rsi_window: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

/// Ticker lists for the multi-symbol pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListsConfig {
    pub trending: Vec<String>,
    pub screener: Vec<String>,
    /// Two-column CSV (`Name,stock`) mapping display names to tickers.
    pub ticker_file: Option<PathBuf>,
}

impl Default for ListsConfig {
    fn default() -> Self {
        let trending = [
            "AAPL", "MSFT", "GOOG", "AMZN", "TSLA", "NVDA", "META", "JPM", "JNJ", "V",
        ];
        let screener_extra = [
            "PG", "UNH", "HD", "MA", "BAC", "DIS", "PFE", "KO", "XOM", "CSCO",
        ];
        Self {
            trending: trending.iter().map(|s| s.to_string()).collect(),
            screener: trending
                .iter()
                .chain(screener_extra.iter())
                .map(|s| s.to_string())
                .collect(),
            ticker_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let cfg = DashboardConfig::from_toml("").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.lists.trending.len(), 10);
        assert_eq!(cfg.lists.screener.len(), 20);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let cfg = DashboardConfig::from_toml(
            r#"
            history_start = "2015-01-01"

            [indicators]
            rsi_window = 7

            [cache]
            ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(cfg.indicators.rsi_window, 7);
        assert_eq!(cfg.indicators.bollinger_window, 20);
        assert_eq!(cfg.cache.ttl(), Some(Duration::from_secs(60)));
        assert_eq!(
            cfg.history_start,
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
        );
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = DashboardConfig::default();
        let text = cfg.to_toml().unwrap();
        assert_eq!(DashboardConfig::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn rejects_inverted_macd() {
        let err = DashboardConfig::from_toml("[indicators]\nmacd_fast = 30\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unbounded_retries() {
        let err = DashboardConfig::from_toml("[provider]\nmax_retries = 40\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let cfg = DashboardConfig::from_toml("[provider]\nmax_retries = 10\n").unwrap();
        assert_eq!(cfg.provider.max_retries, MAX_RETRIES);
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = DashboardConfig::from_toml("[indicators\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DashboardConfig::from_file(Path::new("/nonexistent/stockdash.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/stockdash.toml"));
    }
}

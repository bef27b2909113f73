//! Caller-side configuration for running analyses.
//!
//! The analytics functions take every parameter explicitly; this struct only
//! collects them for callers such as the command-line binary.

use crate::analytics::DEFAULT_HISTORY_DAYS;
use crate::trade::TradingDayFilter;
use std::str::FromStr;
use tracing::warn;

/// Analysis configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Path to SQLite database
    pub database_path: String,
    /// Lookback window in calendar days (default: 30)
    pub history_days: u32,
    /// Trading-day inclusion filters
    pub filter: TradingDayFilter,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            database_path: "futures.db".to_string(),
            history_days: DEFAULT_HISTORY_DAYS,
            filter: TradingDayFilter::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn new(database_path: impl Into<String>, history_days: u32) -> Self {
        AnalysisConfig {
            database_path: database_path.into(),
            history_days,
            filter: TradingDayFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: TradingDayFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Reads the configuration from process environment variables.
    ///
    /// Recognized variables: `DATABASE_PATH`, `HISTORY_DAYS`,
    /// `INCLUDE_ZERO_CONTRACTS`, `CONTRACTS_FROM`, `CONTRACTS_TO`,
    /// `PRICE_FROM`, `PRICE_TO`. Missing or malformed values fall back to the
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AnalysisConfig::default();
        let filter = TradingDayFilter {
            include_zero_contracts: parse_var(&lookup, "INCLUDE_ZERO_CONTRACTS")
                .unwrap_or(defaults.filter.include_zero_contracts),
            contracts_from: parse_var(&lookup, "CONTRACTS_FROM"),
            contracts_to: parse_var(&lookup, "CONTRACTS_TO"),
            price_from: parse_price(&lookup, "PRICE_FROM"),
            price_to: parse_price(&lookup, "PRICE_TO"),
        };

        AnalysisConfig {
            database_path: lookup("DATABASE_PATH")
                .filter(|path| !path.trim().is_empty())
                .unwrap_or(defaults.database_path),
            history_days: parse_var(&lookup, "HISTORY_DAYS").unwrap_or(defaults.history_days),
            filter,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = raw, "ignoring malformed configuration value");
            None
        }
    }
}

/// Price bounds must be comparable; `NaN` parses as `f64` but is rejected.
fn parse_price<F>(lookup: &F, key: &str) -> Option<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_var(lookup, key)?;
    if value.is_nan() {
        warn!(variable = key, "ignoring NaN price bound");
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.history_days, 30);
        assert_eq!(config.database_path, "futures.db");
        assert!(config.filter.include_zero_contracts);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[
            ("DATABASE_PATH", "/tmp/trades.db"),
            ("HISTORY_DAYS", "60"),
            ("INCLUDE_ZERO_CONTRACTS", "false"),
            ("CONTRACTS_FROM", "10"),
            ("CONTRACTS_TO", "500"),
            ("PRICE_FROM", "20.5"),
            ("PRICE_TO", " 30 "),
        ]));

        assert_eq!(config.database_path, "/tmp/trades.db");
        assert_eq!(config.history_days, 60);
        assert_eq!(
            config.filter,
            TradingDayFilter::new()
                .include_zero_contracts(false)
                .contracts_between(Some(10), Some(500))
                .price_between(Some(20.5), Some(30.0))
        );
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[
            ("HISTORY_DAYS", "thirty"),
            ("CONTRACTS_FROM", "-5"),
            ("INCLUDE_ZERO_CONTRACTS", "yes"),
            ("DATABASE_PATH", "  "),
        ]));

        assert_eq!(config.history_days, 30);
        assert_eq!(config.filter.contracts_from, None);
        assert!(config.filter.include_zero_contracts);
        assert_eq!(config.database_path, "futures.db");
    }

    #[test]
    fn test_nan_price_bounds_are_ignored() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[
            ("PRICE_FROM", "NaN"),
            ("PRICE_TO", "nan"),
        ]));

        assert_eq!(config.filter.price_from, None);
        assert_eq!(config.filter.price_to, None);
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_builder() {
        let filter = TradingDayFilter::new().include_zero_contracts(false);
        let config = AnalysisConfig::new("trades.db", 90).with_filter(filter);
        assert_eq!(config.history_days, 90);
        assert_eq!(config.filter, filter);
    }
}

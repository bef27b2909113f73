//! Result and error types produced by the analytics pipeline.

use super::log_returns::LogReturnPoint;
use super::statistics::{Statistics, Trends};
use crate::future_code::FutureCode;
use crate::trade::StoreError;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Minimum number of trading days (and prices) needed for one log return.
pub const MIN_TRADING_DAYS: usize = 3;

/// Outcome of the single-date pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub future_code: FutureCode,
    /// Anchor date
    pub trade_date: NaiveDate,
    /// Lookback window in calendar days
    pub history_days: u32,
    /// Log return on the anchor date, if the anchor is in the series
    pub current_value: Option<f64>,
    pub statistics: Statistics,
    pub trends: Trends,
    pub series: Vec<LogReturnPoint>,
}

impl AnalysisResult {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series.iter().map(|point| point.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.series.iter().map(|point| point.value).collect()
    }
}

/// Outcome of the range aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeAnalysisResult {
    pub future_code: FutureCode,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub history_days: u32,
    /// Last value of the merged series
    pub current_value: Option<f64>,
    /// Statistics over the merged series
    pub statistics: Statistics,
    /// First computed day against last computed day
    pub trends: Trends,
    /// Merged series restricted to `[date_from, date_to]`, one point per date
    pub series: Vec<LogReturnPoint>,
    /// Every successful per-day analysis, in anchor order
    pub daily: Vec<AnalysisResult>,
}

impl RangeAnalysisResult {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series.iter().map(|point| point.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.series.iter().map(|point| point.value).collect()
    }
}

/// Reasons an analysis produced no statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Fewer qualifying trading days than required
    InsufficientTradingDays { found: usize, required: usize },
    /// Not enough resolvable prices, or no log return could be formed
    InsufficientPriceData { found: usize, required: usize },
    /// The trade store failed
    Store(StoreError),
}

impl AnalysisError {
    /// Returns `true` for the data-shortage outcomes, `false` for store failures.
    pub fn is_insufficient_data(&self) -> bool {
        !matches!(self, AnalysisError::Store(_))
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InsufficientTradingDays { found, required } => write!(
                f,
                "Insufficient data: found {} trading days, at least {} required",
                found, required
            ),
            AnalysisError::InsufficientPriceData { found, required } => write!(
                f,
                "Insufficient price data: found {}, at least {} required",
                found, required
            ),
            AnalysisError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        AnalysisError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_is_not_a_store_failure() {
        let days = AnalysisError::InsufficientTradingDays {
            found: 2,
            required: MIN_TRADING_DAYS,
        };
        let store = AnalysisError::from(StoreError::Database("disk I/O error".into()));

        assert!(days.is_insufficient_data());
        assert!(!store.is_insufficient_data());
        assert!(std::error::Error::source(&store).is_some());
    }

    #[test]
    fn error_messages_carry_counts() {
        let err = AnalysisError::InsufficientTradingDays {
            found: 2,
            required: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data: found 2 trading days, at least 3 required"
        );

        let err = AnalysisError::InsufficientPriceData {
            found: 1,
            required: 3,
        };
        assert!(err.to_string().contains("found 1"));
    }
}

//! Descriptive statistics and coarse trend labels over a log-return series.

use super::log_returns::{values, LogReturnPoint};
use super::primitives::{max, mean, median, min, population_std_dev, population_variance};
use super::result::{AnalysisError, MIN_TRADING_DAYS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean trend of a single-date analysis moves beyond +/-5%.
pub const MEAN_TREND_UPPER: f64 = 1.05;
pub const MEAN_TREND_LOWER: f64 = 0.95;

/// Variance trend of a single-date analysis moves beyond +/-10%.
pub const VARIANCE_TREND_UPPER: f64 = 1.10;
pub const VARIANCE_TREND_LOWER: f64 = 0.90;

/// Descriptive statistics of a log-return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl Statistics {
    /// Computes statistics over `values`, or `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        Some(Statistics {
            mean: mean(values),
            std_dev: population_std_dev(values),
            median: median(values),
            min: min(values),
            max: max(values),
            count: values.len(),
        })
    }
}

/// Direction of a statistic between an earlier and a later sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trend labels for the mean and the variance of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trends {
    pub mean: Trend,
    pub variance: Trend,
}

impl Default for Trends {
    fn default() -> Self {
        Trends {
            mean: Trend::Stable,
            variance: Trend::Stable,
        }
    }
}

/// Statistics together with the trend labels of the same series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub statistics: Statistics,
    pub trends: Trends,
}

/// Classifies `after` relative to `before` scaled by the given factors.
///
/// Comparisons are strict. The factors scale `before` as-is, so a negative
/// `before` flips which side each threshold lands on.
pub fn classify_change(before: f64, after: f64, upper: f64, lower: f64) -> Trend {
    if after > before * upper {
        Trend::Increasing
    } else if after < before * lower {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Compares the first `floor(n/2)` values with the rest.
///
/// Both labels are `Stable` when either half is empty.
pub fn half_split_trends(values: &[f64]) -> Trends {
    let (first, second) = values.split_at(values.len() / 2);
    if first.is_empty() || second.is_empty() {
        return Trends::default();
    }

    Trends {
        mean: classify_change(
            mean(first),
            mean(second),
            MEAN_TREND_UPPER,
            MEAN_TREND_LOWER,
        ),
        variance: classify_change(
            population_variance(first),
            population_variance(second),
            VARIANCE_TREND_UPPER,
            VARIANCE_TREND_LOWER,
        ),
    }
}

/// Summarizes a log-return series.
///
/// # Errors
/// Returns `AnalysisError::InsufficientPriceData` when the series is empty.
pub fn summarize(series: &[LogReturnPoint]) -> Result<SeriesSummary, AnalysisError> {
    let values = values(series);
    let statistics =
        Statistics::from_values(&values).ok_or(AnalysisError::InsufficientPriceData {
            found: 0,
            required: MIN_TRADING_DAYS,
        })?;

    Ok(SeriesSummary {
        statistics,
        trends: half_split_trends(&values),
    })
}

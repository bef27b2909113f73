//! Two-trading-day log-return series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of trading days between the two prices of a log return.
pub const LOOKBACK: usize = 2;

/// Log return of one trading day against the trading day two positions earlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl LogReturnPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        LogReturnPoint { date, value }
    }
}

/// Builds `ln(p[i] / p[i-2])` for every point from the third onward.
///
/// `prices` must be sorted by date without duplicates. The lookback counts
/// positions in `prices`, not calendar days. Points where either price is not
/// strictly positive are skipped, so fewer than three points (or no valid
/// pair) yields an empty series.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use futures_analytics::analytics::build_log_returns;
///
/// let day = |d| NaiveDate::from_ymd_opt(1998, 2, d).unwrap();
/// let series = build_log_returns(&[(day(2), 25.0), (day(3), 26.0), (day(5), 27.5)]);
///
/// assert_eq!(series.len(), 1);
/// assert_eq!(series[0].date, day(5));
/// assert!((series[0].value - (27.5_f64 / 25.0).ln()).abs() < 1e-12);
/// ```
pub fn build_log_returns(prices: &[(NaiveDate, f64)]) -> Vec<LogReturnPoint> {
    if prices.len() <= LOOKBACK {
        return Vec::new();
    }

    prices
        .windows(LOOKBACK + 1)
        .filter_map(|window| {
            let (_, lagged) = window[0];
            let (date, current) = window[LOOKBACK];
            (current > 0.0 && lagged > 0.0)
                .then(|| LogReturnPoint::new(date, (current / lagged).ln()))
        })
        .collect()
}

/// Value of the series at `anchor`, if the series has a point on that date.
pub fn current_value(series: &[LogReturnPoint], anchor: NaiveDate) -> Option<f64> {
    series
        .iter()
        .find(|point| point.date == anchor)
        .map(|point| point.value)
}

/// Values of the series in date order.
pub fn values(series: &[LogReturnPoint]) -> Vec<f64> {
    series.iter().map(|point| point.value).collect()
}

//! Range aggregation: one single-date analysis per trading day, merged.

use super::calculate_price_change;
use super::log_returns::{values, LogReturnPoint};
use super::result::{AnalysisError, AnalysisResult, RangeAnalysisResult, MIN_TRADING_DAYS};
use super::statistics::{classify_change, Statistics, Trends};
use crate::future_code::FutureCode;
use crate::trade::{DateRange, TradeStore, TradingDayFilter};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Range trends compare first and last per-day statistics beyond +/-10%.
pub const RANGE_TREND_UPPER: f64 = 1.1;
pub const RANGE_TREND_LOWER: f64 = 0.9;

/// Analyzes every qualifying trading day in `[date_from, date_to]` and merges
/// the per-day series.
///
/// Each trading day is analyzed with its own `history_days` window. Points
/// outside the requested range are dropped; a date produced by several
/// overlapping windows keeps the value from the latest anchor. Per-day runs
/// without enough data are skipped; a store failure aborts the whole range.
///
/// The trend labels compare the mean and standard deviation of the first and
/// last per-day analyses that contributed points, not the halves of the merged
/// series.
///
/// # Errors
/// - `InsufficientTradingDays` if no trading day qualifies or no per-day
///   analysis succeeds
/// - `InsufficientPriceData` if the successful analyses left no point inside
///   the range
/// - `Store` if the trade store fails
pub fn analyze_range(
    store: &dyn TradeStore,
    future_code: &FutureCode,
    date_from: NaiveDate,
    date_to: NaiveDate,
    history_days: u32,
    filter: &TradingDayFilter,
) -> Result<RangeAnalysisResult, AnalysisError> {
    let range = DateRange::new(date_from, date_to);
    let trading_days = store.list_trading_days(future_code, &range, filter)?;

    if trading_days.is_empty() {
        return Err(AnalysisError::InsufficientTradingDays {
            found: 0,
            required: MIN_TRADING_DAYS,
        });
    }

    let mut daily = Vec::with_capacity(trading_days.len());
    for &day in &trading_days {
        match calculate_price_change(store, future_code, day, history_days, filter) {
            Ok(result) => daily.push(result),
            Err(err) if err.is_insufficient_data() => {
                debug!(future = %future_code, %day, reason = %err, "skipping trading day");
            }
            Err(err) => return Err(err),
        }
    }

    debug!(
        future = %future_code,
        %date_from,
        %date_to,
        trading_days = trading_days.len(),
        computed = daily.len(),
        "range analysis"
    );

    if daily.is_empty() {
        return Err(AnalysisError::InsufficientTradingDays {
            found: trading_days.len(),
            required: MIN_TRADING_DAYS,
        });
    }

    let (series, contributing) = merge_daily_series(&daily, &range);
    let statistics =
        Statistics::from_values(&values(&series)).ok_or(AnalysisError::InsufficientPriceData {
            found: 0,
            required: MIN_TRADING_DAYS,
        })?;

    Ok(RangeAnalysisResult {
        future_code: future_code.clone(),
        date_from,
        date_to,
        history_days,
        current_value: series.last().map(|point| point.value),
        statistics,
        trends: first_last_trends(&contributing),
        series,
        daily,
    })
}

/// Merges the in-range points of all per-day series, one point per date in
/// ascending order; later anchors overwrite earlier ones.
///
/// Also returns the statistics of the per-day results that contributed at
/// least one point.
fn merge_daily_series<'a>(
    daily: &'a [AnalysisResult],
    range: &DateRange,
) -> (Vec<LogReturnPoint>, Vec<&'a Statistics>) {
    let mut merged = BTreeMap::new();
    let mut contributing = Vec::new();

    for result in daily {
        let mut contributed = false;
        for point in result.series.iter().filter(|p| range.contains(p.date)) {
            merged.insert(point.date, point.value);
            contributed = true;
        }
        if contributed {
            contributing.push(&result.statistics);
        }
    }

    let series = merged
        .into_iter()
        .map(|(date, value)| LogReturnPoint::new(date, value))
        .collect();
    (series, contributing)
}

fn first_last_trends(statistics: &[&Statistics]) -> Trends {
    match statistics {
        [first, .., last] => Trends {
            mean: classify_change(first.mean, last.mean, RANGE_TREND_UPPER, RANGE_TREND_LOWER),
            variance: classify_change(
                first.std_dev,
                last.std_dev,
                RANGE_TREND_UPPER,
                RANGE_TREND_LOWER,
            ),
        },
        _ => Trends::default(),
    }
}

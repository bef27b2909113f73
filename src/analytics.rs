//! Price-change analytics
//!
//! Computes the two-trading-day log-return indicator for a futures contract
//! together with descriptive statistics and trend labels. The pipeline only
//! reads from a [`TradeStore`]; everything after the two store queries is pure
//! computation over the returned prices.
//!
//! Data shortages are reported as [`AnalysisError`] values so callers must
//! handle them before reading statistics.

pub mod log_returns;
pub mod primitives;
pub mod range;
pub mod result;
pub mod statistics;

pub use log_returns::{build_log_returns, current_value, LogReturnPoint};
pub use range::{analyze_range, RANGE_TREND_LOWER, RANGE_TREND_UPPER};
pub use result::{AnalysisError, AnalysisResult, RangeAnalysisResult, MIN_TRADING_DAYS};
pub use statistics::{classify_change, summarize, SeriesSummary, Statistics, Trend, Trends};

use crate::future_code::FutureCode;
use crate::trade::{DateRange, TradeStore, TradingDayFilter};
use chrono::NaiveDate;
use tracing::{debug, trace};

/// Default lookback window in calendar days.
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

/// Collects `(date, price)` pairs for the given trading days.
///
/// Days without a stored price are dropped.
pub fn load_prices(
    store: &dyn TradeStore,
    future_code: &FutureCode,
    trading_days: &[NaiveDate],
) -> Result<Vec<(NaiveDate, f64)>, AnalysisError> {
    let mut prices = Vec::with_capacity(trading_days.len());
    for &day in trading_days {
        match store.get_price(future_code, day)? {
            Some(price) => prices.push((day, price)),
            None => trace!(future = %future_code, %day, "no price for trading day"),
        }
    }
    Ok(prices)
}

/// Runs the single-date analysis for `future_code` anchored at `trade_date`.
///
/// The history covers the `history_days` calendar days up to and including
/// `trade_date`, restricted to trading days passing `filter`.
///
/// # Errors
/// - `InsufficientTradingDays` if fewer than three trading days qualify
/// - `InsufficientPriceData` if fewer than three prices resolve, or no log
///   return can be formed from them
/// - `Store` if the trade store fails
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use futures_analytics::analytics::calculate_price_change;
/// use futures_analytics::{FutureCode, InMemoryTradeStore, TradeRecord, TradingDayFilter};
///
/// let code = FutureCode::new("FUSD_03_98").unwrap();
/// let day = |d| NaiveDate::from_ymd_opt(1998, 2, d).unwrap();
///
/// let mut store = InMemoryTradeStore::new();
/// for (d, price) in [(2, 25.0), (3, 25.5), (4, 26.0)] {
///     store.add_trade(TradeRecord::new(code.clone(), day(d), price, None));
/// }
///
/// let result =
///     calculate_price_change(&store, &code, day(4), 30, &TradingDayFilter::default()).unwrap();
/// assert_eq!(result.statistics.count, 1);
/// assert!((result.current_value.unwrap() - (26.0_f64 / 25.0).ln()).abs() < 1e-12);
/// ```
pub fn calculate_price_change(
    store: &dyn TradeStore,
    future_code: &FutureCode,
    trade_date: NaiveDate,
    history_days: u32,
    filter: &TradingDayFilter,
) -> Result<AnalysisResult, AnalysisError> {
    let window = DateRange::ending_at(trade_date, history_days);
    let trading_days = store.list_trading_days(future_code, &window, filter)?;

    debug!(
        future = %future_code,
        %trade_date,
        history_days,
        trading_days = trading_days.len(),
        "selected trading days"
    );

    if trading_days.len() < MIN_TRADING_DAYS {
        return Err(AnalysisError::InsufficientTradingDays {
            found: trading_days.len(),
            required: MIN_TRADING_DAYS,
        });
    }

    let prices = load_prices(store, future_code, &trading_days)?;
    if prices.len() < MIN_TRADING_DAYS {
        return Err(AnalysisError::InsufficientPriceData {
            found: prices.len(),
            required: MIN_TRADING_DAYS,
        });
    }

    let series = build_log_returns(&prices);
    let SeriesSummary { statistics, trends } = summarize(&series)?;

    Ok(AnalysisResult {
        future_code: future_code.clone(),
        trade_date,
        history_days,
        current_value: current_value(&series, trade_date),
        statistics,
        trends,
        series,
    })
}

use crate::future_code::FutureCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single daily trade record for one futures contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Contract the trade belongs to
    pub future_code: FutureCode,
    /// Trading date
    pub trade_date: NaiveDate,
    /// Settlement price
    pub price: f64,
    /// Number of contracts traded, if reported
    pub contracts_count: Option<u32>,
}

impl TradeRecord {
    /// Creates a new TradeRecord.
    pub fn new(
        future_code: FutureCode,
        trade_date: NaiveDate,
        price: f64,
        contracts_count: Option<u32>,
    ) -> Self {
        TradeRecord {
            future_code,
            trade_date,
            price,
            contracts_count,
        }
    }
}

/// Date range for querying trade data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Start date (inclusive)
    pub start: NaiveDate,
    /// End date (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new DateRange.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Range of `days` calendar days ending at (and including) `end`.
    ///
    /// A window reaching past the earliest representable date is clamped to
    /// `NaiveDate::MIN`, so it simply covers all history.
    ///
    /// # Arguments
    /// * `end` - Last date of the window (inclusive)
    /// * `days` - Number of calendar days to look back from `end`
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        let start = end
            .checked_sub_signed(chrono::Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        DateRange { start, end }
    }

    /// Returns `true` if `date` lies inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Inclusion filters applied when selecting trading days.
///
/// A missing contract count always passes the contract filters. Price bounds
/// are never waived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradingDayFilter {
    /// Keep days whose contract count is zero
    pub include_zero_contracts: bool,
    /// Minimum contract count (inclusive)
    pub contracts_from: Option<u32>,
    /// Maximum contract count (inclusive)
    pub contracts_to: Option<u32>,
    /// Minimum price (inclusive)
    pub price_from: Option<f64>,
    /// Maximum price (inclusive)
    pub price_to: Option<f64>,
}

impl Default for TradingDayFilter {
    fn default() -> Self {
        TradingDayFilter {
            include_zero_contracts: true,
            contracts_from: None,
            contracts_to: None,
            price_from: None,
            price_to: None,
        }
    }
}

impl TradingDayFilter {
    /// Filter that accepts every trading day.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_zero_contracts(mut self, include: bool) -> Self {
        self.include_zero_contracts = include;
        self
    }

    pub fn contracts_between(mut self, from: Option<u32>, to: Option<u32>) -> Self {
        self.contracts_from = from;
        self.contracts_to = to;
        self
    }

    pub fn price_between(mut self, from: Option<f64>, to: Option<f64>) -> Self {
        self.price_from = from;
        self.price_to = to;
        self
    }

    /// Effective price bounds; a NaN bound is treated as absent.
    pub fn price_bounds(&self) -> (Option<f64>, Option<f64>) {
        let usable = |bound: Option<f64>| bound.filter(|value| !value.is_nan());
        (usable(self.price_from), usable(self.price_to))
    }

    /// Returns `true` if a record with this price and contract count qualifies.
    pub fn matches(&self, price: f64, contracts_count: Option<u32>) -> bool {
        if !self.include_zero_contracts && contracts_count == Some(0) {
            return false;
        }

        if let (Some(from), Some(count)) = (self.contracts_from, contracts_count) {
            if count < from {
                return false;
            }
        }

        if let (Some(to), Some(count)) = (self.contracts_to, contracts_count) {
            if count > to {
                return false;
            }
        }

        let (price_from, price_to) = self.price_bounds();
        if let Some(from) = price_from {
            if price.is_nan() || price < from {
                return false;
            }
        }

        if let Some(to) = price_to {
            if price.is_nan() || price > to {
                return false;
            }
        }

        true
    }
}

/// Read access to stored trade records.
///
/// This is the only surface the analytics pipeline needs from storage, so the
/// pipeline can run against SQLite, an in-memory map, or anything else.
pub trait TradeStore {
    /// Lists the dates in `date_range` (inclusive) on which `future_code` has a
    /// trade record passing `filter`, in strictly ascending order.
    ///
    /// An inverted range yields no dates.
    ///
    /// # Arguments
    /// * `future_code` - Contract to query
    /// * `date_range` - Calendar window (inclusive on both ends)
    /// * `filter` - Contract-count and price inclusion rules
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be read. An unknown
    /// contract is not an error; it yields no dates.
    fn list_trading_days(
        &self,
        future_code: &FutureCode,
        date_range: &DateRange,
        filter: &TradingDayFilter,
    ) -> Result<Vec<NaiveDate>, StoreError>;

    /// Returns the recorded price for `future_code` on `trade_date`, or `None`
    /// if there is no record for that day.
    ///
    /// # Returns
    /// Returns `Ok(None)` for a missing record; only storage failures are errors.
    fn get_price(
        &self,
        future_code: &FutureCode,
        trade_date: NaiveDate,
    ) -> Result<Option<f64>, StoreError>;
}

/// Errors raised by a trade store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying database failure
    Database(String),
    /// A record violates the data model (e.g. non-positive price)
    InvalidRecord(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(msg) => write!(f, "Database error: {}", msg),
            StoreError::InvalidRecord(msg) => write!(f, "Invalid trade record: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StoredTrade {
    price: f64,
    contracts_count: Option<u32>,
}

/// In-memory trade store.
///
/// Unlike the SQLite store it accepts any price, which makes it useful for
/// exercising the non-positive price guards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTradeStore {
    trades: HashMap<FutureCode, BTreeMap<NaiveDate, StoredTrade>>,
}

impl InMemoryTradeStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trade, replacing any record for the same contract and date.
    pub fn add_trade(&mut self, record: TradeRecord) {
        self.trades.entry(record.future_code).or_default().insert(
            record.trade_date,
            StoredTrade {
                price: record.price,
                contracts_count: record.contracts_count,
            },
        );
    }

    pub fn add_trades(&mut self, records: impl IntoIterator<Item = TradeRecord>) {
        for record in records {
            self.add_trade(record);
        }
    }

    /// Clears all data from the store.
    pub fn clear(&mut self) {
        self.trades.clear();
    }
}

impl TradeStore for InMemoryTradeStore {
    fn list_trading_days(
        &self,
        future_code: &FutureCode,
        date_range: &DateRange,
        filter: &TradingDayFilter,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        if date_range.start > date_range.end {
            return Ok(Vec::new());
        }

        let Some(trades) = self.trades.get(future_code) else {
            return Ok(Vec::new());
        };

        Ok(trades
            .range(date_range.start..=date_range.end)
            .filter(|(_, trade)| filter.matches(trade.price, trade.contracts_count))
            .map(|(date, _)| *date)
            .collect())
    }

    fn get_price(
        &self,
        future_code: &FutureCode,
        trade_date: NaiveDate,
    ) -> Result<Option<f64>, StoreError> {
        Ok(self
            .trades
            .get(future_code)
            .and_then(|trades| trades.get(&trade_date))
            .map(|trade| trade.price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> FutureCode {
        FutureCode::new(s).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(1998, 2, d).unwrap()
    }

    fn sample_store() -> InMemoryTradeStore {
        let mut store = InMemoryTradeStore::new();
        let fc = code("FUSD_03_98");
        store.add_trades(vec![
            TradeRecord::new(fc.clone(), date(2), 25.5, Some(100)),
            TradeRecord::new(fc.clone(), date(3), 25.7, Some(0)),
            TradeRecord::new(fc.clone(), date(4), 25.9, None),
            TradeRecord::new(fc.clone(), date(5), 26.4, Some(500)),
            TradeRecord::new(fc, date(6), 26.1, Some(20)),
        ]);
        store
    }

    #[test]
    fn test_date_range_ending_at() {
        let range = DateRange::ending_at(date(28), 30);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(1998, 1, 29).unwrap());
        assert_eq!(range.end, date(28));
        assert!(range.contains(date(1)));
        assert!(!range.contains(NaiveDate::from_ymd_opt(1998, 3, 1).unwrap()));
    }

    #[test]
    fn test_date_range_ending_at_clamps_to_earliest_date() {
        let range = DateRange::ending_at(date(28), u32::MAX);
        assert_eq!(range.start, NaiveDate::MIN);
        assert_eq!(range.end, date(28));

        let range = DateRange::ending_at(NaiveDate::MIN, 30);
        assert_eq!(range.start, NaiveDate::MIN);
        assert!(range.contains(NaiveDate::MIN));
    }

    #[test]
    fn test_nan_price_bound_is_ignored() {
        let filter = TradingDayFilter::new().price_between(Some(f64::NAN), Some(26.0));
        assert_eq!(filter.price_bounds(), (None, Some(26.0)));
        assert!(filter.matches(25.0, None));
        assert!(!filter.matches(27.0, None));
    }

    #[test]
    fn test_default_filter_accepts_everything() {
        let filter = TradingDayFilter::default();
        assert!(filter.matches(25.0, Some(0)));
        assert!(filter.matches(25.0, None));
        assert!(filter.matches(-1.0, Some(10)));
    }

    #[test]
    fn test_filter_zero_contracts() {
        let filter = TradingDayFilter::new().include_zero_contracts(false);
        assert!(!filter.matches(25.0, Some(0)));
        assert!(filter.matches(25.0, Some(1)));
        assert!(filter.matches(25.0, None));
    }

    #[test]
    fn test_filter_contract_bounds_waive_missing_count() {
        let filter = TradingDayFilter::new().contracts_between(Some(10), Some(100));
        assert!(filter.matches(25.0, None));
        assert!(filter.matches(25.0, Some(10)));
        assert!(filter.matches(25.0, Some(100)));
        assert!(!filter.matches(25.0, Some(9)));
        assert!(!filter.matches(25.0, Some(101)));
    }

    #[test]
    fn test_filter_price_bounds_inclusive() {
        let filter = TradingDayFilter::new().price_between(Some(25.0), Some(26.0));
        assert!(filter.matches(25.0, None));
        assert!(filter.matches(26.0, None));
        assert!(!filter.matches(24.99, None));
        assert!(!filter.matches(26.01, None));
        assert!(!filter.matches(f64::NAN, None));
    }

    #[test]
    fn test_in_memory_list_trading_days_in_range() {
        let store = sample_store();
        let days = store
            .list_trading_days(
                &code("FUSD_03_98"),
                &DateRange::new(date(3), date(5)),
                &TradingDayFilter::default(),
            )
            .unwrap();
        assert_eq!(days, vec![date(3), date(4), date(5)]);
    }

    #[test]
    fn test_in_memory_list_trading_days_with_filters() {
        let store = sample_store();
        let filter = TradingDayFilter::new()
            .include_zero_contracts(false)
            .contracts_between(Some(50), None)
            .price_between(None, Some(26.2));
        let days = store
            .list_trading_days(
                &code("FUSD_03_98"),
                &DateRange::new(date(1), date(28)),
                &filter,
            )
            .unwrap();
        // 3rd has zero contracts, 5th is above the price cap, 6th is below 50 contracts
        assert_eq!(days, vec![date(2), date(4)]);
    }

    #[test]
    fn test_in_memory_inverted_range_is_empty() {
        let store = sample_store();
        let days = store
            .list_trading_days(
                &code("FUSD_03_98"),
                &DateRange::new(date(6), date(2)),
                &TradingDayFilter::default(),
            )
            .unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn test_in_memory_unknown_future_is_empty() {
        let store = sample_store();
        let days = store
            .list_trading_days(
                &code("FUSD_06_98"),
                &DateRange::new(date(1), date(28)),
                &TradingDayFilter::default(),
            )
            .unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn test_in_memory_get_price() {
        let store = sample_store();
        let fc = code("FUSD_03_98");
        assert_eq!(store.get_price(&fc, date(2)).unwrap(), Some(25.5));
        assert_eq!(store.get_price(&fc, date(7)).unwrap(), None);
        assert_eq!(store.get_price(&code("FUSD_06_98"), date(2)).unwrap(), None);
    }

    #[test]
    fn test_add_trade_replaces_same_day() {
        let mut store = sample_store();
        let fc = code("FUSD_03_98");
        store.add_trade(TradeRecord::new(fc.clone(), date(2), 30.0, None));
        assert_eq!(store.get_price(&fc, date(2)).unwrap(), Some(30.0));

        store.clear();
        assert_eq!(store.get_price(&fc, date(2)).unwrap(), None);
    }
}

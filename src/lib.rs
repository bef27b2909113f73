pub mod future_code;
pub mod future;
pub mod trade;
pub mod sqlite_store;
pub mod analytics;
pub mod config;

pub use future_code::{FutureCode, FutureCodeError};
pub use future::{ExpiryStatus, Future};
pub use trade::{
    DateRange, InMemoryTradeStore, StoreError, TradeRecord, TradeStore, TradingDayFilter,
};
pub use sqlite_store::{ImportMode, SqliteTradeStore};
pub use analytics::{
    analyze_range,
    build_log_returns,
    calculate_price_change,
    summarize,
    AnalysisError,
    AnalysisResult,
    LogReturnPoint,
    RangeAnalysisResult,
    Statistics,
    Trend,
    Trends,
};
pub use config::AnalysisConfig;

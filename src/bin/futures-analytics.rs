//! Price-change analysis from the command line
//!
//! Usage: `futures-analytics <FUTURE_CODE> <DATE> [DATE_TO]`
//!
//! With one date the single-date analysis is printed; with two dates the
//! range aggregation. Contracts with a stored record also get their expiry
//! status as of the last analyzed date. Dates are `YYYY-MM-DD`. Configuration comes from the
//! environment (see `AnalysisConfig::from_env`):
//!   DATABASE_PATH=futures.db HISTORY_DAYS=60 cargo run --bin futures-analytics -- FUSD_03_98 1998-02-27
//!   RUST_LOG=futures_analytics=debug cargo run --bin futures-analytics -- FUSD_03_98 1998-02-02 1998-02-27

use chrono::NaiveDate;
use futures_analytics::analytics::{analyze_range, calculate_price_change, AnalysisError};
use futures_analytics::{AnalysisConfig, FutureCode, SqliteTradeStore};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn parse_date(value: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {}", value, e).into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: futures-analytics <FUTURE_CODE> <DATE> [DATE_TO]");
        std::process::exit(2);
    }

    let future_code: FutureCode = args[0].parse()?;
    let date_from = parse_date(&args[1])?;
    let date_to = args.get(2).map(|value| parse_date(value)).transpose()?;

    let config = AnalysisConfig::from_env();
    tracing::info!(
        database = %config.database_path,
        history_days = config.history_days,
        "opening trade store"
    );
    let store = SqliteTradeStore::new(&config.database_path)?;

    let outcome = match date_to {
        Some(date_to) => analyze_range(
            &store,
            &future_code,
            date_from,
            date_to,
            config.history_days,
            &config.filter,
        )
        .map(serde_json::to_value),
        None => calculate_price_change(
            &store,
            &future_code,
            date_from,
            config.history_days,
            &config.filter,
        )
        .map(serde_json::to_value),
    };

    match outcome {
        Ok(value) => {
            let mut value = value?;
            let as_of = date_to.unwrap_or(date_from);
            if let (Some(future), Some(fields)) =
                (store.get_future(&future_code)?, value.as_object_mut())
            {
                fields.insert(
                    "contract".to_string(),
                    serde_json::to_value(future.expiry_status(as_of))?,
                );
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(AnalysisError::Store(err)) => Err(err.into()),
        Err(err) => {
            let body = json!({
                "future_code": future_code,
                "error": err.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
    }
}

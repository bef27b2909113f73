use crate::future::Future;
use crate::future_code::FutureCode;
use crate::trade::{DateRange, StoreError, TradeRecord, TradeStore, TradingDayFilter};
use chrono::NaiveDate;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use tracing::debug;

/// How `insert_trades` treats records that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Keep the stored record untouched
    Insert,
    /// Overwrite price and contract count
    Upsert,
}

/// SQLite-based trade store.
///
/// Holds futures, their expiration dates and daily trade records.
/// Automatically creates schema on first use.
#[derive(Debug)]
pub struct SqliteTradeStore {
    conn: Connection,
}

impl SqliteTradeStore {
    /// Opens (or creates) a file-based trade database.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file, created if missing
    ///
    /// # Returns
    /// Returns `Ok(SqliteTradeStore)` with the schema in place.
    ///
    /// # Errors
    /// Returns an error if the database connection cannot be established.
    pub fn new<P: AsRef<Path>>(db_path: P) -> SqliteResult<Self> {
        let conn = Connection::open(db_path)?;
        let store = SqliteTradeStore { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Creates a trade store backed by an in-memory database.
    ///
    /// Useful for testing.
    ///
    /// # Returns
    /// Returns `Ok(SqliteTradeStore)` if successful, or an error if connection fails.
    pub fn new_in_memory() -> SqliteResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteTradeStore { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> SqliteResult<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS futures (
                code TEXT PRIMARY KEY,
                name TEXT
            );

            CREATE TABLE IF NOT EXISTS expirations (
                future_code TEXT PRIMARY KEY
                    REFERENCES futures(code) ON DELETE CASCADE,
                expiry_date TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS trades (
                trade_date TEXT NOT NULL,
                future_code TEXT NOT NULL
                    REFERENCES futures(code) ON DELETE CASCADE,
                price REAL NOT NULL CHECK (price > 0),
                contracts_count INTEGER
                    CHECK (contracts_count IS NULL OR contracts_count >= 0),
                PRIMARY KEY (trade_date, future_code)
            );

            CREATE INDEX IF NOT EXISTS idx_trades_future_date
                ON trades(future_code, trade_date);",
        )
    }

    #[cfg(test)]
    fn table_exists(&self, table_name: &str) -> SqliteResult<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
        stmt.exists([table_name])
    }

    /// Returns a reference to the underlying SQLite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Stores a futures contract and its expiry date, replacing existing values.
    pub fn store_future(&self, future: &Future) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO futures (code, name) VALUES (?1, ?2)
             ON CONFLICT(code) DO UPDATE SET name = excluded.name",
            params![future.code().as_str(), future.name()],
        )?;
        match future.expiry_date() {
            Some(expiry) => {
                tx.execute(
                    "INSERT INTO expirations (future_code, expiry_date) VALUES (?1, ?2)
                     ON CONFLICT(future_code) DO UPDATE SET expiry_date = excluded.expiry_date",
                    params![future.code().as_str(), expiry],
                )?;
            }
            None => {
                tx.execute(
                    "DELETE FROM expirations WHERE future_code = ?1",
                    params![future.code().as_str()],
                )?;
            }
        }
        tx.commit()?;
        debug!(future = %future.code(), "stored future");
        Ok(())
    }

    /// Looks up a futures contract together with its expiry date.
    pub fn get_future(&self, code: &FutureCode) -> Result<Option<Future>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT f.name, e.expiry_date FROM futures f
                 LEFT JOIN expirations e ON e.future_code = f.code
                 WHERE f.code = ?1",
                params![code.as_str()],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<NaiveDate>>(1)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(name, expiry)| build_future(code.clone(), name, expiry)))
    }

    /// Lists all stored futures ordered by code.
    pub fn list_futures(&self) -> Result<Vec<Future>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT f.code, f.name, e.expiry_date FROM futures f
             LEFT JOIN expirations e ON e.future_code = f.code
             ORDER BY f.code",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<NaiveDate>>(2)?,
            ))
        })?;

        let mut futures = Vec::new();
        for row in rows {
            let (code, name, expiry) = row?;
            let code = FutureCode::new(code)
                .map_err(|e| StoreError::InvalidRecord(format!("stored code: {}", e)))?;
            futures.push(build_future(code, name, expiry));
        }
        Ok(futures)
    }

    /// Writes a batch of trade records atomically.
    ///
    /// Futures referenced by the records are created if missing. Returns the
    /// number of rows inserted or updated.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidRecord` if a record has a non-positive
    /// price; nothing is written in that case.
    pub fn insert_trades(
        &self,
        records: &[TradeRecord],
        mode: ImportMode,
    ) -> Result<usize, StoreError> {
        if let Some(bad) = records.iter().find(|r| r.price.is_nan() || r.price <= 0.0) {
            return Err(StoreError::InvalidRecord(format!(
                "price must be > 0 ({} on {}: {})",
                bad.future_code, bad.trade_date, bad.price
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut written = 0;
        {
            let mut ensure_future =
                tx.prepare("INSERT OR IGNORE INTO futures (code) VALUES (?1)")?;
            let mut write_trade = tx.prepare(match mode {
                ImportMode::Insert => {
                    "INSERT OR IGNORE INTO trades
                     (trade_date, future_code, price, contracts_count)
                     VALUES (?1, ?2, ?3, ?4)"
                }
                ImportMode::Upsert => {
                    "INSERT INTO trades (trade_date, future_code, price, contracts_count)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(trade_date, future_code) DO UPDATE SET
                        price = excluded.price,
                        contracts_count = excluded.contracts_count"
                }
            })?;

            for record in records {
                ensure_future.execute(params![record.future_code.as_str()])?;
                written += write_trade.execute(params![
                    record.trade_date,
                    record.future_code.as_str(),
                    record.price,
                    record.contracts_count,
                ])?;
            }
        }
        tx.commit()?;

        debug!(records = records.len(), written, ?mode, "stored trades");
        Ok(written)
    }

    /// Deletes all trades on `trade_date`, optionally restricted to some futures.
    ///
    /// Returns the number of deleted records.
    pub fn delete_trades_by_date(
        &self,
        trade_date: NaiveDate,
        futures: Option<&[FutureCode]>,
    ) -> Result<usize, StoreError> {
        let mut sql = String::from("DELETE FROM trades WHERE trade_date = ?1");
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(trade_date)];

        if let Some(codes) = futures.filter(|codes| !codes.is_empty()) {
            let placeholders: Vec<String> = codes
                .iter()
                .map(|code| {
                    values.push(Box::new(code.as_str().to_string()));
                    format!("?{}", values.len())
                })
                .collect();
            sql.push_str(&format!(" AND future_code IN ({})", placeholders.join(", ")));
        }

        let deleted = self
            .conn
            .execute(&sql, rusqlite::params_from_iter(values.iter()))?;
        debug!(%trade_date, deleted, "deleted trades");
        Ok(deleted)
    }
}

fn build_future(code: FutureCode, name: Option<String>, expiry: Option<NaiveDate>) -> Future {
    let mut future = Future::from_code(code);
    if let Some(name) = name {
        future = future.with_name(name);
    }
    if let Some(expiry) = expiry {
        future = future.with_expiry(expiry);
    }
    future
}

impl TradeStore for SqliteTradeStore {
    fn list_trading_days(
        &self,
        future_code: &FutureCode,
        date_range: &DateRange,
        filter: &TradingDayFilter,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        let mut sql = String::from(
            "SELECT trade_date FROM trades
             WHERE future_code = ?1 AND trade_date >= ?2 AND trade_date <= ?3",
        );
        let mut values: Vec<Box<dyn ToSql>> = vec![
            Box::new(future_code.as_str().to_string()),
            Box::new(date_range.start),
            Box::new(date_range.end),
        ];

        if !filter.include_zero_contracts {
            sql.push_str(" AND (contracts_count IS NULL OR contracts_count != 0)");
        }
        if let Some(from) = filter.contracts_from {
            values.push(Box::new(from));
            sql.push_str(&format!(
                " AND (contracts_count IS NULL OR contracts_count >= ?{})",
                values.len()
            ));
        }
        if let Some(to) = filter.contracts_to {
            values.push(Box::new(to));
            sql.push_str(&format!(
                " AND (contracts_count IS NULL OR contracts_count <= ?{})",
                values.len()
            ));
        }
        let (price_from, price_to) = filter.price_bounds();
        if let Some(from) = price_from {
            values.push(Box::new(from));
            sql.push_str(&format!(" AND price >= ?{}", values.len()));
        }
        if let Some(to) = price_to {
            values.push(Box::new(to));
            sql.push_str(&format!(" AND price <= ?{}", values.len()));
        }
        sql.push_str(" ORDER BY trade_date");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), |row| {
            row.get::<_, NaiveDate>(0)
        })?;

        let mut days = Vec::new();
        for row in rows {
            days.push(row?);
        }
        Ok(days)
    }

    fn get_price(
        &self,
        future_code: &FutureCode,
        trade_date: NaiveDate,
    ) -> Result<Option<f64>, StoreError> {
        let price = self
            .conn
            .query_row(
                "SELECT price FROM trades WHERE future_code = ?1 AND trade_date = ?2",
                params![future_code.as_str(), trade_date],
                |row| row.get::<_, f64>(0),
            )
            .optional()?;
        Ok(price)
    }
}

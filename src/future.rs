use crate::future_code::{FutureCode, FutureCodeError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Futures contract as stored alongside its trades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Future {
    /// Contract code
    code: FutureCode,
    /// Optional description (e.g. "USD/RUB March 1998")
    name: Option<String>,
    /// Contract execution date, when known
    expiry_date: Option<NaiveDate>,
}

impl Future {
    /// Creates a new futures contract without name or expiry.
    ///
    /// # Errors
    /// Returns an error if the code is invalid.
    pub fn new(code: impl Into<String>) -> Result<Self, FutureCodeError> {
        Ok(Future {
            code: FutureCode::new(code)?,
            name: None,
            expiry_date: None,
        })
    }

    /// Builds a contract from an already validated code.
    pub fn from_code(code: FutureCode) -> Self {
        Future {
            code,
            name: None,
            expiry_date: None,
        }
    }

    /// Sets the contract description.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the contract execution date.
    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    pub fn code(&self) -> &FutureCode {
        &self.code
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    /// Calendar days remaining until expiry as of `date`.
    ///
    /// Negative once the contract has expired, `None` if the expiry is unknown.
    pub fn days_to_expiry(&self, date: NaiveDate) -> Option<i64> {
        self.expiry_date
            .map(|expiry| expiry.signed_duration_since(date).num_days())
    }

    /// Returns `true` if the contract can still trade on `date`.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.expiry_date.map_or(true, |expiry| date <= expiry)
    }

    /// Snapshot of the contract's expiry as seen on `as_of`.
    pub fn expiry_status(&self, as_of: NaiveDate) -> ExpiryStatus {
        ExpiryStatus {
            future_code: self.code.clone(),
            name: self.name.clone(),
            expiry_date: self.expiry_date,
            as_of,
            days_to_expiry: self.days_to_expiry(as_of),
            active: self.is_active_on(as_of),
        }
    }
}

/// Expiry information reported next to an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryStatus {
    pub future_code: FutureCode,
    pub name: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    /// Date the status was evaluated for
    pub as_of: NaiveDate,
    pub days_to_expiry: Option<i64>,
    pub active: bool,
}

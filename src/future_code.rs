use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single futures contract series (e.g. "FUSD_03_98").
///
/// The exchange-specific naming scheme is not enforced here; only empty codes
/// and characters outside `[A-Za-z0-9._-]` are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FutureCode(String);

impl FutureCode {
    /// Creates a new futures code.
    ///
    /// # Errors
    /// Returns an error if the code is empty or contains invalid characters.
    pub fn new(code: impl Into<String>) -> Result<Self, FutureCodeError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(FutureCode(code))
    }

    fn validate(code: &str) -> Result<(), FutureCodeError> {
        if code.is_empty() {
            return Err(FutureCodeError::EmptyCode);
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
        {
            return Err(FutureCodeError::InvalidCharacters);
        }

        Ok(())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FutureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for FutureCode {
    type Error = FutureCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FutureCode::new(value)
    }
}

impl From<FutureCode> for String {
    fn from(code: FutureCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for FutureCode {
    type Err = FutureCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FutureCode::new(s.trim())
    }
}

/// Errors that can occur when creating or validating a futures code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FutureCodeError {
    /// The code is empty
    EmptyCode,
    /// The code contains invalid characters
    InvalidCharacters,
}

impl fmt::Display for FutureCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FutureCodeError::EmptyCode => write!(f, "Futures code cannot be empty"),
            FutureCodeError::InvalidCharacters => {
                write!(f, "Futures code contains invalid characters")
            }
        }
    }
}

impl std::error::Error for FutureCodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_creation_valid() {
        let code = FutureCode::new("FUSD_03_98").unwrap();
        assert_eq!(code.as_str(), "FUSD_03_98");
    }

    #[test]
    fn test_code_creation_empty_string() {
        let result = FutureCode::new("");
        assert_eq!(result.unwrap_err(), FutureCodeError::EmptyCode);
    }

    #[test]
    fn test_code_invalid_characters() {
        assert_eq!(
            FutureCode::new("FUSD 03").unwrap_err(),
            FutureCodeError::InvalidCharacters
        );
        assert_eq!(
            FutureCode::new("FUSD@03").unwrap_err(),
            FutureCodeError::InvalidCharacters
        );
    }

    #[test]
    fn test_code_from_str_trims_whitespace() {
        let code: FutureCode = "  FUSD_06_98 ".parse().unwrap();
        assert_eq!(code.as_str(), "FUSD_06_98");
    }

    #[test]
    fn test_code_display() {
        let code = FutureCode::new("FUSD_09_98").unwrap();
        assert_eq!(format!("{}", code), "FUSD_09_98");
    }

    #[test]
    fn test_code_serde_rejects_invalid() {
        let code = FutureCode::new("FUSD_12_98").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"FUSD_12_98\"");
        assert_eq!(serde_json::from_str::<FutureCode>(&json).unwrap(), code);
        assert!(serde_json::from_str::<FutureCode>("\"\"").is_err());
    }

    #[test]
    fn test_code_ordering_and_hashing() {
        use std::collections::HashMap;

        let a = FutureCode::new("FUSD_03_98").unwrap();
        let b = FutureCode::new("FUSD_06_98").unwrap();
        assert!(a < b);

        let mut map = HashMap::new();
        map.insert(a.clone(), 1);
        assert_eq!(map.get(&FutureCode::new("FUSD_03_98").unwrap()), Some(&1));
        assert_eq!(map.get(&b), None);
    }
}

//! Currency - Type-safe currency codes
//!
//! Instead of raw strings, we use an enum for the currencies the rate
//! table quotes, and a fallback for anything else. Unknown codes still
//! parse; whether they convert is the rate table's decision.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing currencies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Empty currency code")]
    EmptyCode,

    #[error("Currency code too long (max 8 chars): {0}")]
    TooLong(String),

    #[error("Invalid currency code format: {0}")]
    InvalidFormat(String),
}

/// Currency codes
///
/// The common quote currencies are pre-defined for type safety. Any
/// other well-formed code lands in `Other`.
///
/// # Examples
/// ```
/// use tonggwan_core::Currency;
///
/// let usd: Currency = "usd".parse().unwrap();
/// assert_eq!(usd, Currency::Usd);
/// assert_eq!(usd.to_string(), "USD");
///
/// let exotic: Currency = "MXN".parse().unwrap();
/// assert!(matches!(exotic, Currency::Other(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    // === Home ===
    /// Korean Won - the settlement currency for duty and tax
    Krw,

    // === Majors ===
    /// US Dollar - also the unit for duty-free limits
    Usd,
    /// Euro
    Eur,
    /// Japanese Yen
    Jpy,
    /// British Pound
    Gbp,

    // === Asia-Pacific ===
    /// Chinese Yuan
    Cny,
    /// Hong Kong Dollar
    Hkd,
    /// New Taiwan Dollar
    Twd,
    /// Singapore Dollar
    Sgd,
    /// Vietnamese Dong
    Vnd,
    /// Australian Dollar
    Aud,

    // === Others quoted ===
    /// Canadian Dollar
    Cad,
    /// Swiss Franc
    Chf,

    /// Any other currency code
    Other(String),
}

impl Currency {
    /// Returns the currency code as a string slice
    pub fn code(&self) -> &str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Gbp => "GBP",
            Currency::Cny => "CNY",
            Currency::Hkd => "HKD",
            Currency::Twd => "TWD",
            Currency::Sgd => "SGD",
            Currency::Vnd => "VND",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
            Currency::Chf => "CHF",
            Currency::Other(s) => s.as_str(),
        }
    }

    /// Returns true for the home settlement currency (KRW)
    pub fn is_home(&self) -> bool {
        matches!(self, Currency::Krw)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        if s.is_empty() {
            return Err(CurrencyError::EmptyCode);
        }

        if s.len() > 8 {
            return Err(CurrencyError::TooLong(s));
        }

        // Validate: only ASCII letters
        if !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidFormat(s));
        }

        Ok(match s.as_str() {
            "KRW" => Currency::Krw,
            "USD" => Currency::Usd,
            "EUR" => Currency::Eur,
            "JPY" => Currency::Jpy,
            "GBP" => Currency::Gbp,
            "CNY" => Currency::Cny,
            "HKD" => Currency::Hkd,
            "TWD" => Currency::Twd,
            "SGD" => Currency::Sgd,
            "VND" => Currency::Vnd,
            "AUD" => Currency::Aud,
            "CAD" => Currency::Cad,
            "CHF" => Currency::Chf,
            _ => Currency::Other(s),
        })
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.code().to_string()
    }
}

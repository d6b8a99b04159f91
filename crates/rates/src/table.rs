//! RateTable - KRW quotes for supported currencies
//!
//! Each entry is the KRW value of one unit of the keyed currency.
//! Lookups for absent currencies fail; there is no default rate, so a
//! typo in a currency code can never be priced silently.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tonggwan_core::Currency;

/// Rate-related errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateError {
    /// No quote for the requested currency
    #[error("Unknown currency: {code}")]
    UnknownCurrency { code: String },

    /// A configured rate is zero or negative
    #[error("Invalid rate for {code}: {rate}")]
    InvalidRate { code: String, rate: Decimal },

    /// Arithmetic overflow during conversion
    #[error("Conversion overflow: {amount} {code}")]
    Overflow { code: String, amount: Decimal },
}

/// Result alias for rate operations
pub type RateResult<T> = Result<T, RateError>;

/// Conversion table quoting each currency in KRW.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use tonggwan_core::Currency;
/// use tonggwan_rates::RateTable;
///
/// let table = RateTable::with_defaults();
/// let krw = table.to_krw(Decimal::from(100), &Currency::Usd).unwrap();
/// assert_eq!(krw, Decimal::from(135_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: HashMap<Currency, Decimal>,
}

impl RateTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    /// Creates a table seeded with the shipped quote set
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.set_rate(Currency::Krw, Decimal::ONE);
        table.set_rate(Currency::Usd, Decimal::from(1350));
        table.set_rate(Currency::Eur, Decimal::from(1470));
        table.set_rate(Currency::Jpy, Decimal::new(91, 1));
        table.set_rate(Currency::Gbp, Decimal::from(1720));
        table.set_rate(Currency::Cny, Decimal::from(188));
        table.set_rate(Currency::Cad, Decimal::from(980));
        table.set_rate(Currency::Aud, Decimal::from(890));
        table.set_rate(Currency::Chf, Decimal::from(1550));
        table.set_rate(Currency::Vnd, Decimal::new(65, 3));
        table.set_rate(Currency::Hkd, Decimal::from(175));
        table.set_rate(Currency::Twd, Decimal::from(44));
        table.set_rate(Currency::Sgd, Decimal::from(1020));
        table
    }

    /// Sets or replaces the KRW quote for one currency unit
    pub fn set_rate(&mut self, currency: Currency, krw_per_unit: Decimal) {
        self.rates.insert(currency, krw_per_unit);
    }

    /// Returns the KRW quote for the currency
    pub fn rate(&self, currency: &Currency) -> RateResult<Decimal> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| RateError::UnknownCurrency {
                code: currency.code().to_string(),
            })
    }

    /// Converts an amount of `currency` into KRW (full precision)
    pub fn to_krw(&self, amount: Decimal, currency: &Currency) -> RateResult<Decimal> {
        let rate = self.rate(currency)?;
        amount.checked_mul(rate).ok_or(RateError::Overflow {
            code: currency.code().to_string(),
            amount,
        })
    }

    /// Converts between two quoted currencies via the KRW cross rate
    pub fn convert(&self, amount: Decimal, from: &Currency, to: &Currency) -> RateResult<Decimal> {
        let krw = self.to_krw(amount, from)?;
        let to_rate = self.rate(to)?;
        krw.checked_div(to_rate).ok_or(RateError::Overflow {
            code: to.code().to_string(),
            amount,
        })
    }

    /// Rejects zero or negative quotes after a config load
    pub fn validate(&self) -> RateResult<()> {
        for (currency, rate) in &self.rates {
            if *rate <= Decimal::ZERO {
                return Err(RateError::InvalidRate {
                    code: currency.code().to_string(),
                    rate: *rate,
                });
            }
        }
        Ok(())
    }

    /// Iterates over (currency, KRW quote) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&Currency, &Decimal)> {
        self.rates.iter()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_quotes_present() {
        let table = RateTable::with_defaults();
        assert_eq!(table.rate(&Currency::Usd).unwrap(), dec!(1350));
        assert_eq!(table.rate(&Currency::Krw).unwrap(), Decimal::ONE);
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn test_unknown_currency_fails() {
        let table = RateTable::with_defaults();
        let missing = Currency::Other("MXN".to_string());
        let result = table.rate(&missing);
        assert!(matches!(result, Err(RateError::UnknownCurrency { code }) if code == "MXN"));
    }

    #[test]
    fn test_to_krw() {
        let table = RateTable::with_defaults();
        assert_eq!(
            table.to_krw(dec!(220), &Currency::Usd).unwrap(),
            dec!(297000)
        );
        assert_eq!(
            table.to_krw(dec!(10000), &Currency::Jpy).unwrap(),
            dec!(91000)
        );
    }

    #[test]
    fn test_cross_conversion_via_krw() {
        let table = RateTable::with_defaults();
        // 135 USD -> KRW 182250 -> JPY 20027.47...
        let jpy = table
            .convert(dec!(135), &Currency::Usd, &Currency::Jpy)
            .unwrap();
        assert_eq!(jpy.round_dp(2), dec!(20027.47));
    }

    #[test]
    fn test_convert_reports_missing_target() {
        let table = RateTable::with_defaults();
        let missing = Currency::Other("THB".to_string());
        let result = table.convert(dec!(10), &Currency::Usd, &missing);
        assert!(matches!(result, Err(RateError::UnknownCurrency { code }) if code == "THB"));
    }

    #[test]
    fn test_validate_rejects_non_positive_rate() {
        let mut table = RateTable::new();
        table.set_rate(Currency::Usd, Decimal::ZERO);
        assert!(matches!(
            table.validate(),
            Err(RateError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let table = RateTable::with_defaults();
        let json = serde_json::to_string(&table).unwrap();
        let parsed: RateTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.rate(&Currency::Usd).unwrap(), dec!(1350));
        assert_eq!(parsed.len(), table.len());
    }
}

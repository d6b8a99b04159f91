//! TariffSchedule - Duty-free limits and the VAT rate
//!
//! Limits live in config data, not code. Each (shipping method,
//! recipient type) pair gets a row; a row can carry origin-specific
//! overrides like the expanded US express threshold.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tonggwan_core::{RecipientType, ShippingMethod};

use crate::error::{EngineError, EngineResult};

/// Origin-specific replacement for a row's default limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginOverride {
    /// Country codes this override applies to
    pub countries: Vec<String>,
    /// Replacement limit in USD
    pub limit_usd: Decimal,
}

/// Duty-free limit for one (method, recipient) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitRule {
    pub shipping_method: ShippingMethod,
    pub recipient_type: RecipientType,
    /// Default limit in USD
    pub limit_usd: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub origin_overrides: Vec<OriginOverride>,
}

/// The duty-free limit table.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use tonggwan_core::{RecipientType, ShippingMethod};
/// use tonggwan_engine::DutyFreeLimits;
///
/// let limits = DutyFreeLimits::with_defaults();
/// let us_express = limits
///     .resolve(ShippingMethod::Express, RecipientType::Personal, "US")
///     .unwrap();
/// assert_eq!(us_express, Decimal::from(200));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DutyFreeLimits {
    rows: Vec<LimitRule>,
}

impl DutyFreeLimits {
    pub fn new(rows: Vec<LimitRule>) -> Self {
        Self { rows }
    }

    /// The shipped limit table: 150 USD across the board, except
    /// postal/business at 100 and a 200 USD override for US express.
    pub fn with_defaults() -> Self {
        let us = vec!["US".to_string(), "USA".to_string(), "UNITED STATES".to_string()];
        let default_limit = Decimal::from(150);
        let us_express_limit = Decimal::from(200);

        let mut rows = Vec::new();
        for method in [
            ShippingMethod::Express,
            ShippingMethod::Postal,
            ShippingMethod::Freight,
        ] {
            for recipient in [RecipientType::Personal, RecipientType::Business] {
                let mut row = LimitRule {
                    shipping_method: method,
                    recipient_type: recipient,
                    limit_usd: default_limit,
                    origin_overrides: Vec::new(),
                };
                if method == ShippingMethod::Express {
                    row.origin_overrides.push(OriginOverride {
                        countries: us.clone(),
                        limit_usd: us_express_limit,
                    });
                }
                if method == ShippingMethod::Postal && recipient == RecipientType::Business {
                    row.limit_usd = Decimal::from(100);
                }
                rows.push(row);
            }
        }
        Self { rows }
    }

    /// Resolves the limit for a declaration. Origin overrides win over
    /// the row default; `None` means the pair has no row at all.
    pub fn resolve(
        &self,
        method: ShippingMethod,
        recipient: RecipientType,
        origin_country: &str,
    ) -> Option<Decimal> {
        let row = self
            .rows
            .iter()
            .find(|r| r.shipping_method == method && r.recipient_type == recipient)?;

        for over in &row.origin_overrides {
            if over
                .countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(origin_country))
            {
                return Some(over.limit_usd);
            }
        }
        Some(row.limit_usd)
    }

    pub fn rows(&self) -> &[LimitRule] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rejects negative limits and duplicate (method, recipient) rows
    pub fn validate(&self) -> EngineResult<()> {
        let mut seen = std::collections::HashSet::new();
        for row in &self.rows {
            if row.limit_usd < Decimal::ZERO {
                return Err(EngineError::InvalidSnapshot(format!(
                    "negative duty-free limit for {}/{}",
                    row.shipping_method, row.recipient_type
                )));
            }
            if !seen.insert((row.shipping_method, row.recipient_type)) {
                return Err(EngineError::InvalidSnapshot(format!(
                    "duplicate limit row for {}/{}",
                    row.shipping_method, row.recipient_type
                )));
            }
            for over in &row.origin_overrides {
                if over.limit_usd < Decimal::ZERO {
                    return Err(EngineError::InvalidSnapshot(format!(
                        "negative override limit for {}/{}",
                        row.shipping_method, row.recipient_type
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for DutyFreeLimits {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Tax parameters shared by every evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffSchedule {
    /// Value-added tax rate as a fraction (0.1 = 10%)
    #[serde(default = "default_vat_rate")]
    pub vat_rate: Decimal,
    #[serde(default)]
    pub limits: DutyFreeLimits,
}

fn default_vat_rate() -> Decimal {
    Decimal::new(1, 1)
}

impl TariffSchedule {
    pub fn validate(&self) -> EngineResult<()> {
        if self.vat_rate < Decimal::ZERO || self.vat_rate >= Decimal::ONE {
            return Err(EngineError::InvalidSnapshot(format!(
                "VAT rate out of range: {}",
                self.vat_rate
            )));
        }
        self.limits.validate()
    }
}

impl Default for TariffSchedule {
    fn default() -> Self {
        Self {
            vat_rate: default_vat_rate(),
            limits: DutyFreeLimits::default(),
        }
    }
}

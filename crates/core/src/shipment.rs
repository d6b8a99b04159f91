//! ShipmentDeclaration - What the importer tells us about a parcel
//!
//! The declaration is the single input to duty evaluation. Construction
//! normalizes the origin code and rejects values customs would bounce.

use crate::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// How the parcel enters the country
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Express courier (특송)
    Express,
    /// International post (우편)
    Postal,
    /// General cargo / freight (일반화물)
    Freight,
}

/// Who receives the parcel
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    /// Personal-use import (자가사용)
    Personal,
    /// Business import (사업자)
    Business,
}

/// Errors for declarations customs would reject outright
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("Declared value must be positive, got {0}")]
    NonPositiveValue(Decimal),

    #[error("Origin country code too short: {0:?}")]
    OriginTooShort(String),
}

/// A declared cross-border shipment.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use tonggwan_core::{Currency, RecipientType, ShipmentDeclaration, ShippingMethod};
///
/// let decl = ShipmentDeclaration::new(
///     Decimal::from(120),
///     Currency::Usd,
///     "us",
///     ShippingMethod::Express,
///     RecipientType::Personal,
///     "general_goods",
///     false,
/// )
/// .unwrap();
/// assert_eq!(decl.origin_country, "US");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDeclaration {
    /// Declared value in `currency` units
    pub declared_value: Decimal,
    /// Currency the value is declared in
    pub currency: Currency,
    /// Origin country code, uppercased (e.g. `US`, `CN`)
    pub origin_country: String,
    pub shipping_method: ShippingMethod,
    pub recipient_type: RecipientType,
    /// Category id resolved against the category store
    pub product_category: String,
    /// Multiple parcels from the same day combined for taxation
    #[serde(default)]
    pub same_day_combined: bool,
}

impl ShipmentDeclaration {
    /// Creates a validated declaration. Origin is trimmed and uppercased.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        declared_value: Decimal,
        currency: Currency,
        origin_country: impl Into<String>,
        shipping_method: ShippingMethod,
        recipient_type: RecipientType,
        product_category: impl Into<String>,
        same_day_combined: bool,
    ) -> Result<Self, DeclarationError> {
        let declaration = ShipmentDeclaration {
            declared_value,
            currency,
            origin_country: origin_country.into().trim().to_uppercase(),
            shipping_method,
            recipient_type,
            product_category: product_category.into(),
            same_day_combined,
        };
        declaration.validate()?;
        Ok(declaration)
    }

    /// Re-checks the invariants `new` enforces.
    ///
    /// Deserialized declarations have not been through `new`, so the
    /// evaluation pipeline calls this before doing any work.
    pub fn validate(&self) -> Result<(), DeclarationError> {
        if self.declared_value <= Decimal::ZERO {
            return Err(DeclarationError::NonPositiveValue(self.declared_value));
        }
        if self.origin_country.trim().len() < 2 {
            return Err(DeclarationError::OriginTooShort(self.origin_country.clone()));
        }
        Ok(())
    }
}

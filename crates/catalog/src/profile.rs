//! CategoryProfile - Customs metadata per product category

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tonggwan_core::RiskLevel;

/// Customs profile for one product category.
///
/// `duty_free_eligible` mirrors the 목록통관 list: categories excluded
/// from it (health food, medicine) are dutiable regardless of value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfile {
    /// Stable id referenced by declarations and rules
    pub id: String,
    /// Korean display title
    pub title: String,
    /// Risk floor for shipments in this category
    #[serde(default)]
    pub base_risk: RiskLevel,
    /// Duty rate applied to the dutiable value, in percent
    pub duty_rate_percent: Decimal,
    /// False for categories excluded from list clearance
    #[serde(default = "default_duty_free_eligible")]
    pub duty_free_eligible: bool,
    /// Individual consumption tax or similar surcharge, in percent
    #[serde(default)]
    pub special_tax_rate_percent: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_urls: Vec<String>,
}

fn default_duty_free_eligible() -> bool {
    true
}

impl CategoryProfile {
    /// Minimal profile with everything else at defaults
    pub fn new(id: impl Into<String>, title: impl Into<String>, duty_rate_percent: Decimal) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            base_risk: RiskLevel::Low,
            duty_rate_percent,
            duty_free_eligible: true,
            special_tax_rate_percent: Decimal::ZERO,
            notes: None,
            reference_urls: Vec::new(),
        }
    }

    pub fn with_base_risk(mut self, risk: RiskLevel) -> Self {
        self.base_risk = risk;
        self
    }

    pub fn with_duty_free_eligible(mut self, eligible: bool) -> Self {
        self.duty_free_eligible = eligible;
        self
    }

    pub fn with_special_tax(mut self, rate_percent: Decimal) -> Self {
        self.special_tax_rate_percent = rate_percent;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_reference_url(mut self, url: impl Into<String>) -> Self {
        self.reference_urls.push(url.into());
        self
    }
}

//! Evaluation results

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tonggwan_core::{Currency, RiskLevel};
use tonggwan_rules::RuleDefinition;

/// Itemized expected taxes, all in whole KRW.
///
/// `estimated_total_tax` is always the sum of the three components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Taxable base. Zero when the shipment is duty-free.
    pub dutiable_value_krw: i64,
    pub duty: i64,
    pub vat: i64,
    pub special_tax: i64,
    pub estimated_total_tax: i64,
}

impl TaxBreakdown {
    /// Duty-free shipment: every component is zero
    pub fn zero() -> Self {
        Self {
            dutiable_value_krw: 0,
            duty: 0,
            vat: 0,
            special_tax: 0,
            estimated_total_tax: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.estimated_total_tax == 0 && self.dutiable_value_krw == 0
    }
}

/// A rule that matched this declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleHit {
    pub id: String,
    pub title: String,
    pub risk_level: RiskLevel,
    pub risk_label: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implication: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_urls: Vec<String>,
}

impl From<&RuleDefinition> for RuleHit {
    fn from(rule: &RuleDefinition) -> Self {
        Self {
            id: rule.id.clone(),
            title: rule.title.clone(),
            risk_level: rule.risk_level,
            risk_label: rule.risk_label.clone(),
            summary: rule.summary.clone(),
            implication: rule.implication.clone(),
            reference_urls: rule.reference_urls.clone(),
        }
    }
}

/// Full outcome of evaluating one declaration against a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Declaration echo
    pub currency: Currency,
    pub declared_value: Decimal,

    /// Aggregated risk: max of the category floor and every match
    pub risk_level: RiskLevel,
    pub risk_label: String,

    pub converted_value_krw: i64,
    pub converted_value_usd: Decimal,
    pub duty_free_limit_usd: Decimal,
    pub dutiable: bool,

    pub tax: TaxBreakdown,
    pub matched: Vec<RuleHit>,
    pub advisory: String,
    /// Deduplicated reference links from matched rules, first-seen order
    pub basis_links: Vec<String>,
}

impl Evaluation {
    /// Convenience mirror of `tax.estimated_total_tax`
    pub fn expected_tax_krw(&self) -> i64 {
        self.tax.estimated_total_tax
    }
}

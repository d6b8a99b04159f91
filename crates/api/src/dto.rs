//! Wire DTOs consumed by the presentation layer
//!
//! The evaluation request mirrors the declaration field for field, so a
//! JSON body and the CLI flags build the same input. Responses rename
//! the engine's internal fields to the published wire names; USD values
//! leave the boundary as plain JSON numbers.

use anyhow::Context;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tonggwan_catalog::CategoryProfile;
use tonggwan_core::{Currency, RecipientType, RiskLevel, ShipmentDeclaration, ShippingMethod};
use tonggwan_engine::{EngineSnapshot, Evaluation, RuleHit, TaxBreakdown};

/// Declaration as posted by clients, all fields still in wire form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub declared_value: f64,
    pub currency: String,
    pub origin_country: String,
    pub shipping_method: String,
    pub recipient_type: String,
    pub product_category: String,
    #[serde(default)]
    pub same_day_combined: bool,
}

impl EvaluateRequest {
    /// Parses and validates the request into a declaration the engine
    /// accepts. Every bad field fails here with its own message, before
    /// any evaluation work starts.
    pub fn into_declaration(self) -> anyhow::Result<ShipmentDeclaration> {
        let declared_value = Decimal::try_from(self.declared_value).with_context(|| {
            format!("declared_value {} is not a valid amount", self.declared_value)
        })?;
        let currency: Currency = self.currency.parse()?;
        let shipping_method: ShippingMethod = self
            .shipping_method
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown shipping_method: {}", self.shipping_method))?;
        let recipient_type: RecipientType = self
            .recipient_type
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown recipient_type: {}", self.recipient_type))?;

        Ok(ShipmentDeclaration::new(
            declared_value,
            currency,
            self.origin_country,
            shipping_method,
            recipient_type,
            self.product_category,
            self.same_day_combined,
        )?)
    }
}

/// Evaluation outcome with the published field names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub risk_level: RiskLevel,
    pub risk_label: String,
    pub currency: Currency,
    #[serde(with = "rust_decimal::serde::float")]
    pub declared_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub converted_value_usd: Decimal,
    pub converted_value_krw: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub duty_free_limit_usd: Decimal,
    pub dutiable: bool,
    pub expected_tax_krw: i64,
    pub expected_tax_breakdown: TaxBreakdown,
    pub applied_rules: Vec<RuleHit>,
    pub advisory: String,
    pub basis_links: Vec<String>,
}

impl From<Evaluation> for EvaluateResponse {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            risk_level: evaluation.risk_level,
            risk_label: evaluation.risk_label,
            currency: evaluation.currency,
            declared_value: evaluation.declared_value,
            converted_value_usd: evaluation.converted_value_usd,
            converted_value_krw: evaluation.converted_value_krw,
            duty_free_limit_usd: evaluation.duty_free_limit_usd,
            dutiable: evaluation.dutiable,
            expected_tax_krw: evaluation.tax.estimated_total_tax,
            expected_tax_breakdown: evaluation.tax,
            applied_rules: evaluation.matched,
            advisory: evaluation.advisory,
            basis_links: evaluation.basis_links,
        }
    }
}

/// One rule as published in the catalog, without its condition body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub risk_level: RiskLevel,
    pub risk_label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_urls: Vec<String>,
}

/// Reference data the presentation layer renders: category profiles,
/// the rule catalog and the quoted exchange rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleLibraryResponse {
    pub category_profiles: Vec<CategoryProfile>,
    pub rule_entries: Vec<RuleEntry>,
    pub currency_rates: BTreeMap<String, f64>,
}

impl RuleLibraryResponse {
    /// Snapshot view with rule predicates stripped
    pub fn from_snapshot(snapshot: &EngineSnapshot) -> Self {
        let category_profiles = snapshot.categories.list().into_iter().cloned().collect();

        let rule_entries = snapshot
            .rules
            .ordered()
            .into_iter()
            .map(|rule| RuleEntry {
                id: rule.id.clone(),
                title: rule.title.clone(),
                summary: rule.summary.clone(),
                risk_level: rule.risk_level,
                risk_label: rule.risk_label.clone(),
                reference_urls: rule.reference_urls.clone(),
            })
            .collect();

        let currency_rates = snapshot
            .rates
            .iter()
            .map(|(currency, rate)| (currency.code().to_string(), rate.to_f64().unwrap_or(0.0)))
            .collect();

        Self {
            category_profiles,
            rule_entries,
            currency_rates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(value: f64) -> EvaluateRequest {
        EvaluateRequest {
            declared_value: value,
            currency: "USD".into(),
            origin_country: "US".into(),
            shipping_method: "express".into(),
            recipient_type: "personal".into(),
            product_category: "general_goods".into(),
            same_day_combined: false,
        }
    }

    #[test]
    fn test_request_parses_wire_json() {
        let json = r#"{
            "declared_value": 220.5,
            "currency": "usd",
            "origin_country": "us",
            "shipping_method": "express",
            "recipient_type": "personal",
            "product_category": "general_goods"
        }"#;
        let request: EvaluateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.declared_value, 220.5);
        assert!(!request.same_day_combined);

        let declaration = request.into_declaration().unwrap();
        assert_eq!(declaration.declared_value, dec!(220.5));
        assert_eq!(declaration.currency, Currency::Usd);
        assert_eq!(declaration.origin_country, "US");
    }

    #[test]
    fn test_request_rejects_zero_value() {
        let result = request(0.0).into_declaration();
        assert!(result.is_err());
    }

    #[test]
    fn test_request_rejects_unknown_method() {
        let mut bad = request(100.0);
        bad.shipping_method = "teleport".into();
        let err = bad.into_declaration().unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn test_request_rejects_malformed_currency() {
        let mut bad = request(100.0);
        bad.currency = "US-DOLLAR".into();
        assert!(bad.into_declaration().is_err());
    }

    #[test]
    fn test_response_wire_field_names() {
        let snapshot = EngineSnapshot::with_defaults();
        let declaration = request(220.0).into_declaration().unwrap();
        let response = EvaluateResponse::from(snapshot.evaluate(&declaration).unwrap());

        assert_eq!(response.expected_tax_krw, 55836);
        assert_eq!(response.expected_tax_breakdown.estimated_total_tax, 55836);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["risk_level"], "MEDIUM");
        assert_eq!(value["risk_label"], "과세 대상");
        assert_eq!(value["converted_value_krw"], 297000);
        assert_eq!(value["declared_value"], 220.0);
        assert_eq!(value["duty_free_limit_usd"], 200.0);
        assert_eq!(value["expected_tax_breakdown"]["duty"], 23760);
        assert_eq!(value["expected_tax_breakdown"]["vat"], 32076);
        assert_eq!(value["applied_rules"][0]["id"], "over-duty-free-limit");
        assert!(value["basis_links"].as_array().is_some());
    }

    #[test]
    fn test_library_response_strips_conditions() {
        let snapshot = EngineSnapshot::with_defaults();
        let response = RuleLibraryResponse::from_snapshot(&snapshot);

        assert_eq!(response.rule_entries.len(), 7);
        assert!(!response.category_profiles.is_empty());
        assert_eq!(response.currency_rates["USD"], 1350.0);

        let value = serde_json::to_value(&response).unwrap();
        for entry in value["rule_entries"].as_array().unwrap() {
            assert!(entry.get("condition").is_none());
            assert!(entry.get("id").is_some());
        }
    }

    #[test]
    fn test_library_rules_in_priority_order() {
        let snapshot = EngineSnapshot::with_defaults();
        let response = RuleLibraryResponse::from_snapshot(&snapshot);
        assert_eq!(response.rule_entries[0].id, "same-day-combined");
        assert_eq!(
            response.rule_entries.last().unwrap().id,
            "business-recipient-review"
        );
    }
}

//! The evaluation pipeline
//!
//! Pure core: validate, convert, resolve the duty-free limit, decide
//! dutiability, compute taxes, match rules, aggregate risk. No I/O and
//! no clock; the same snapshot and declaration always produce the same
//! result.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use tonggwan_catalog::CategoryProfile;
use tonggwan_core::{Currency, RiskLevel, ShipmentDeclaration};
use tonggwan_rules::{RuleContext, RuleEvaluator};

use crate::error::{EngineError, EngineResult};
use crate::result::{Evaluation, RuleHit, TaxBreakdown};
use crate::snapshot::EngineSnapshot;

/// Advisory used when no rule matched
const DEFAULT_ADVISORY: &str = "정상 통관 예상 · 면세 한도 내 자가사용 물품";

/// Evaluates one declaration against an immutable snapshot.
pub fn evaluate(
    snapshot: &EngineSnapshot,
    declaration: &ShipmentDeclaration,
) -> EngineResult<Evaluation> {
    declaration.validate()?;

    let category = snapshot.categories.get(&declaration.product_category)?;

    // Convert once, in full precision. The KRW figure is rounded for
    // display and tax math; the limit comparison stays exact.
    let krw_exact = snapshot
        .rates
        .to_krw(declaration.declared_value, &declaration.currency)?;
    let converted_usd =
        snapshot
            .rates
            .convert(declaration.declared_value, &declaration.currency, &Currency::Usd)?;
    let converted_krw = round_krw(krw_exact)?;

    let limit_usd = snapshot
        .tariff
        .limits
        .resolve(
            declaration.shipping_method,
            declaration.recipient_type,
            &declaration.origin_country,
        )
        .ok_or(EngineError::UnknownShippingProfile {
            shipping_method: declaration.shipping_method,
            recipient_type: declaration.recipient_type,
        })?;
    let limit_krw = snapshot.rates.to_krw(limit_usd, &Currency::Usd)?;

    let over_limit = krw_exact > limit_krw;
    let dutiable = over_limit || !category.duty_free_eligible || declaration.same_day_combined;

    let tax = if dutiable {
        compute_tax(converted_krw, category, snapshot.tariff.vat_rate)?
    } else {
        TaxBreakdown::zero()
    };

    let ctx = RuleContext {
        declaration,
        category,
        converted_usd,
        converted_krw,
        limit_usd,
        dutiable,
    };
    let matched = RuleEvaluator::matches(&snapshot.rules, &ctx);

    let risk_level = matched
        .iter()
        .map(|rule| rule.risk_level)
        .fold(category.base_risk, RiskLevel::escalate);

    // First matched rule at the aggregated level drives label and
    // advisory. When the category floor alone set the level, there is
    // no such rule and the defaults apply.
    let top_rule = matched.iter().find(|rule| rule.risk_level == risk_level);

    let risk_label = top_rule
        .map(|rule| rule.risk_label.clone())
        .unwrap_or_else(|| risk_level.default_label().to_string());

    let advisory = match top_rule {
        Some(rule) => match &rule.implication {
            Some(implication) => format!("{} · {}", rule.summary, implication),
            None => rule.summary.clone(),
        },
        None => DEFAULT_ADVISORY.to_string(),
    };

    let mut basis_links: Vec<String> = Vec::new();
    for rule in &matched {
        for url in &rule.reference_urls {
            if !basis_links.contains(url) {
                basis_links.push(url.clone());
            }
        }
    }

    Ok(Evaluation {
        currency: declaration.currency.clone(),
        declared_value: declaration.declared_value,
        risk_level,
        risk_label,
        converted_value_krw: converted_krw,
        converted_value_usd: converted_usd,
        duty_free_limit_usd: limit_usd,
        dutiable,
        tax,
        matched: matched.into_iter().map(RuleHit::from).collect(),
        advisory,
        basis_links,
    })
}

/// All-or-nothing taxation: once dutiable, the whole converted value
/// is the base. Special tax never enters the VAT base.
fn compute_tax(
    converted_krw: i64,
    category: &CategoryProfile,
    vat_rate: Decimal,
) -> EngineResult<TaxBreakdown> {
    let base = Decimal::from(converted_krw);
    let duty = round_krw(base * category.duty_rate_percent / Decimal::ONE_HUNDRED)?;
    let vat = round_krw((base + Decimal::from(duty)) * vat_rate)?;
    let special_tax = round_krw(base * category.special_tax_rate_percent / Decimal::ONE_HUNDRED)?;

    Ok(TaxBreakdown {
        dutiable_value_krw: converted_krw,
        duty,
        vat,
        special_tax,
        estimated_total_tax: duty + vat + special_tax,
    })
}

fn round_krw(amount: Decimal) -> EngineResult<i64> {
    amount
        .round()
        .to_i64()
        .ok_or_else(|| EngineError::Conversion(format!("KRW amount out of range: {amount}")))
}

// =============================================================================
// Tests
// =============================================================================

//! Rule evaluator - matches conditions against a shipment context
//!
//! Pure and total: no I/O, no clock, no state. The same context always
//! produces the same matches.

use rust_decimal::Decimal;

use tonggwan_catalog::CategoryProfile;
use tonggwan_core::ShipmentDeclaration;

use crate::types::{Condition, RuleDefinition, RuleLibrary};

/// Everything a condition is allowed to read.
///
/// Built by the engine after conversion and the dutiable decision, so
/// predicates can reference derived facts (`OverDutyFreeLimit`,
/// `Dutiable`) as well as raw declaration fields.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub declaration: &'a ShipmentDeclaration,
    pub category: &'a CategoryProfile,
    /// Declared value converted to USD (full precision)
    pub converted_usd: Decimal,
    /// Declared value converted to KRW, rounded to whole won
    pub converted_krw: i64,
    /// Duty-free limit resolved for this declaration, in USD
    pub limit_usd: Decimal,
    /// Outcome of the dutiable decision
    pub dutiable: bool,
}

/// Rule evaluator
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// Evaluate a single condition against a context
    pub fn eval_condition(condition: &Condition, ctx: &RuleContext) -> bool {
        match condition {
            Condition::MinValueUsd { usd } => ctx.converted_usd >= *usd,
            Condition::MaxValueUsd { usd } => ctx.converted_usd <= *usd,
            Condition::OriginIn { countries } => countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&ctx.declaration.origin_country)),
            Condition::ShippingMethodIn { methods } => {
                methods.contains(&ctx.declaration.shipping_method)
            }
            Condition::RecipientIn { recipients } => {
                recipients.contains(&ctx.declaration.recipient_type)
            }
            Condition::CategoryIn { categories } => {
                categories.iter().any(|c| c == &ctx.category.id)
            }
            Condition::SameDayCombined => ctx.declaration.same_day_combined,
            Condition::DutyFreeExcluded => !ctx.category.duty_free_eligible,
            Condition::OverDutyFreeLimit => ctx.converted_usd > ctx.limit_usd,
            Condition::Dutiable => ctx.dutiable,
            Condition::All { conditions } => {
                conditions.iter().all(|c| Self::eval_condition(c, ctx))
            }
            Condition::Any { conditions } => {
                conditions.iter().any(|c| Self::eval_condition(c, ctx))
            }
            Condition::Not { condition } => !Self::eval_condition(condition, ctx),
        }
    }

    /// Evaluate a single rule. Disabled rules never match.
    pub fn eval_rule(rule: &RuleDefinition, ctx: &RuleContext) -> bool {
        rule.enabled && Self::eval_condition(&rule.condition, ctx)
    }

    /// All matching rules in priority order. No short-circuit: every
    /// enabled rule is checked so the report is complete.
    pub fn matches<'a>(library: &'a RuleLibrary, ctx: &RuleContext) -> Vec<&'a RuleDefinition> {
        library
            .enabled()
            .into_iter()
            .filter(|rule| Self::eval_condition(&rule.condition, ctx))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

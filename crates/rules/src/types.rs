//! Rule types for the regulation library
//!
//! Rules are data: each one pairs a serializable condition tree with
//! the risk outcome and explanation shown when it matches. Editing the
//! library JSON changes behavior without a recompile.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tonggwan_core::{RecipientType, RiskLevel, ShippingMethod};

/// Condition operators for rule matching
///
/// Leaves read the evaluation context; `All`/`Any`/`Not` compose them.
/// The `op` tag keeps the JSON form explicit:
/// `{"op": "min_value_usd", "usd": "1000"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Converted value in USD >= usd
    MinValueUsd { usd: Decimal },
    /// Converted value in USD <= usd
    MaxValueUsd { usd: Decimal },
    /// Origin country is one of the listed codes
    OriginIn { countries: Vec<String> },
    /// Shipping method is one of the listed methods
    ShippingMethodIn { methods: Vec<ShippingMethod> },
    /// Recipient type is one of the listed types
    RecipientIn { recipients: Vec<RecipientType> },
    /// Resolved category id is one of the listed ids
    CategoryIn { categories: Vec<String> },
    /// Declaration is flagged as same-day combined
    SameDayCombined,
    /// Category is excluded from list clearance
    DutyFreeExcluded,
    /// Converted value exceeds the resolved duty-free limit
    OverDutyFreeLimit,
    /// The shipment ended up dutiable, whatever the trigger
    Dutiable,
    /// All conditions must match (AND)
    All { conditions: Vec<Condition> },
    /// Any condition must match (OR)
    Any { conditions: Vec<Condition> },
    /// Inverts the inner condition
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn min_value_usd(usd: Decimal) -> Self {
        Condition::MinValueUsd { usd }
    }

    pub fn max_value_usd(usd: Decimal) -> Self {
        Condition::MaxValueUsd { usd }
    }

    pub fn origin_in<I, S>(countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::OriginIn {
            countries: countries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn shipping_method_in(methods: Vec<ShippingMethod>) -> Self {
        Condition::ShippingMethodIn { methods }
    }

    pub fn recipient_in(recipients: Vec<RecipientType>) -> Self {
        Condition::RecipientIn { recipients }
    }

    pub fn category_in<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::CategoryIn {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn same_day_combined() -> Self {
        Condition::SameDayCombined
    }

    pub fn duty_free_excluded() -> Self {
        Condition::DutyFreeExcluded
    }

    pub fn over_duty_free_limit() -> Self {
        Condition::OverDutyFreeLimit
    }

    pub fn dutiable() -> Self {
        Condition::Dutiable
    }

    /// All conditions (AND)
    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::All { conditions }
    }

    /// Any condition (OR)
    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Any { conditions }
    }

    pub fn not(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }
}

/// A single regulation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Unique rule ID
    pub id: String,
    /// Korean display title
    pub title: String,
    /// Explanation shown when the rule matches
    pub summary: String,
    /// Optional practical consequence, appended to advisories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implication: Option<String>,
    /// Risk level the match contributes to aggregation
    pub risk_level: RiskLevel,
    /// Short outcome label (e.g. "과세 대상")
    pub risk_label: String,
    /// Statute or guidance links backing the rule
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_urls: Vec<String>,
    /// Priority (lower = evaluated and reported first)
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Whether this rule participates in evaluation
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Condition that triggers this rule
    pub condition: Condition,
}

fn default_priority() -> u32 {
    100
}

fn default_enabled() -> bool {
    true
}

impl RuleDefinition {
    /// Create a new rule definition builder
    pub fn builder(id: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(id)
    }
}

/// Builder for RuleDefinition
pub struct RuleBuilder {
    id: String,
    title: Option<String>,
    summary: String,
    implication: Option<String>,
    risk_level: RiskLevel,
    risk_label: Option<String>,
    reference_urls: Vec<String>,
    priority: u32,
    enabled: bool,
    condition: Option<Condition>,
}

impl RuleBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            summary: String::new(),
            implication: None,
            risk_level: RiskLevel::Low,
            risk_label: None,
            reference_urls: Vec::new(),
            priority: default_priority(),
            enabled: true,
            condition: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn implication(mut self, implication: impl Into<String>) -> Self {
        self.implication = Some(implication.into());
        self
    }

    /// Sets the outcome: risk level plus its display label
    pub fn risk(mut self, level: RiskLevel, label: impl Into<String>) -> Self {
        self.risk_level = level;
        self.risk_label = Some(label.into());
        self
    }

    pub fn reference_url(mut self, url: impl Into<String>) -> Self {
        self.reference_urls.push(url.into());
        self
    }

    /// Set the condition
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Build the rule definition
    pub fn build(self) -> RuleDefinition {
        RuleDefinition {
            id: self.id.clone(),
            title: self.title.unwrap_or_else(|| self.id.clone()),
            summary: self.summary,
            implication: self.implication,
            risk_level: self.risk_level,
            risk_label: self
                .risk_label
                .unwrap_or_else(|| self.risk_level.default_label().to_string()),
            reference_urls: self.reference_urls,
            priority: self.priority,
            enabled: self.enabled,
            condition: self.condition.expect("condition is required"),
        }
    }
}

/// Errors raised while loading a rule library
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to parse rule library: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate rule id: {id}")]
    DuplicateId { id: String },
}

/// An ordered set of regulation rules
///
/// Evaluation and reporting follow `ordered()`: stable sort by
/// priority, insertion order breaking ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleLibrary {
    /// Name of this library
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Rules in this library
    pub rules: Vec<RuleDefinition>,
}

impl RuleLibrary {
    /// Create a new empty rule library
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            rules: Vec::new(),
        }
    }

    /// Add a description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Add a rule
    pub fn add_rule(mut self, rule: RuleDefinition) -> Self {
        self.rules.push(rule);
        self
    }

    /// All rules in priority order (stable on ties)
    pub fn ordered(&self) -> Vec<&RuleDefinition> {
        let mut rules: Vec<&RuleDefinition> = self.rules.iter().collect();
        rules.sort_by_key(|r| r.priority);
        rules
    }

    /// Enabled rules in priority order
    pub fn enabled(&self) -> Vec<&RuleDefinition> {
        self.ordered().into_iter().filter(|r| r.enabled).collect()
    }

    /// Get rule by ID
    pub fn get_rule(&self, id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parses a library from JSON and checks id uniqueness
    pub fn from_json(json: &str) -> Result<Self, LibraryError> {
        let library: RuleLibrary = serde_json::from_str(json)?;
        library.validate()?;
        Ok(library)
    }

    pub fn to_json(&self) -> Result<String, LibraryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects duplicate rule ids
    pub fn validate(&self) -> Result<(), LibraryError> {
        let mut seen = std::collections::HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(LibraryError::DuplicateId {
                    id: rule.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// The shipped regulation rule set
    pub fn with_defaults() -> Self {
        RuleLibrary::new("kr-customs-default")
            .with_description("해외직구 통관 기본 규정 세트")
            .add_rule(
                RuleDefinition::builder("same-day-combined")
                    .title("합산과세 주의")
                    .summary("같은 날 같은 국가에서 입항하는 물품은 합산하여 과세 여부를 판단합니다.")
                    .implication("분리 배송한 주문이라도 동일 입항일이면 합산 대상이 될 수 있습니다.")
                    .risk(RiskLevel::High, "합산과세 대상")
                    .reference_url(
                        "https://www.customs.go.kr/kcs/cm/cntnts/cntntsView.do?mi=2793&cntntsId=821",
                    )
                    .priority(10)
                    .when(Condition::same_day_combined())
                    .build(),
            )
            .add_rule(
                RuleDefinition::builder("us-express-expanded-limit")
                    .title("미국발 특송 면세 한도")
                    .summary("미국에서 특송으로 반입하는 자가사용 물품은 미화 200달러까지 면세됩니다.")
                    .risk(RiskLevel::Low, "정상 면세")
                    .reference_url(
                        "https://www.customs.go.kr/kcs/cm/cntnts/cntntsView.do?mi=2793&cntntsId=821",
                    )
                    .priority(20)
                    .when(Condition::all(vec![
                        Condition::origin_in(["US", "USA", "UNITED STATES"]),
                        Condition::shipping_method_in(vec![ShippingMethod::Express]),
                        Condition::max_value_usd(Decimal::from(200)),
                    ]))
                    .build(),
            )
            .add_rule(
                RuleDefinition::builder("over-duty-free-limit")
                    .title("면세 한도 초과")
                    .summary("면세 한도를 초과하여 관세와 부가가치세가 부과됩니다.")
                    .implication("한도 초과 시 물품 가격 전체가 과세가격이 됩니다.")
                    .risk(RiskLevel::Medium, "과세 대상")
                    .reference_url("https://unipass.customs.go.kr/clip/index.do")
                    .priority(30)
                    .when(Condition::over_duty_free_limit())
                    .build(),
            )
            .add_rule(
                RuleDefinition::builder("list-clearance-excluded")
                    .title("목록통관 배제 품목")
                    .summary("건강기능식품 등 목록통관 배제 품목은 금액과 관계없이 수입신고가 필요합니다.")
                    .risk(RiskLevel::Medium, "수입신고 필요")
                    .reference_url(
                        "https://www.customs.go.kr/kcs/cm/cntnts/cntntsView.do?mi=2793&cntntsId=821",
                    )
                    .priority(40)
                    .when(Condition::duty_free_excluded())
                    .build(),
            )
            .add_rule(
                RuleDefinition::builder("restricted-review-category")
                    .title("의약품 수입요건")
                    .summary("의약품은 수입요건 확인 대상으로 통관이 보류될 수 있습니다.")
                    .implication("요건 서류가 없으면 반송 또는 폐기될 수 있습니다.")
                    .risk(RiskLevel::High, "통관 보류 가능")
                    .reference_url("https://unipass.customs.go.kr/clip/index.do")
                    .priority(50)
                    .when(Condition::category_in(["medicine"]))
                    .build(),
            )
            .add_rule(
                RuleDefinition::builder("high-value-formal-entry")
                    .title("고액 물품 정식통관")
                    .summary("미화 1,000달러 이상 물품은 정식 수입신고 대상입니다.")
                    .risk(RiskLevel::High, "정식통관 대상")
                    .priority(60)
                    .when(Condition::min_value_usd(Decimal::from(1000)))
                    .build(),
            )
            .add_rule(
                RuleDefinition::builder("business-recipient-review")
                    .title("사업자 수입 신고")
                    .summary("사업자 수취 물품은 자가사용 면세 대상이 아니며 사업자 통관 절차를 따릅니다.")
                    .risk(RiskLevel::Medium, "사업자 통관")
                    .priority(70)
                    .when(Condition::recipient_in(vec![RecipientType::Business]))
                    .build(),
            )
    }
}

// =============================================================================
// Tests
// =============================================================================

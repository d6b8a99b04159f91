//! RiskLevel - Customs inspection risk grading
//!
//! Three ordered levels. Aggregation across rule matches takes the
//! maximum, so a result can never be milder than any single trigger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Customs risk level for a declared shipment.
///
/// Ordering matters: `Low < Medium < High`. Risk aggregation relies on
/// `Ord` to pick the most severe level.
///
/// # Examples
/// ```
/// use tonggwan_core::RiskLevel;
///
/// assert!(RiskLevel::Low < RiskLevel::High);
/// let worst = RiskLevel::aggregate([RiskLevel::Low, RiskLevel::Medium]);
/// assert_eq!(worst, RiskLevel::Medium);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Routine clearance expected
    Low,
    /// Customs may hold the shipment for review
    Medium,
    /// Formal inspection or declaration likely
    High,
}

impl RiskLevel {
    /// Combines many levels into the most severe one.
    ///
    /// Empty input aggregates to `Low`.
    pub fn aggregate<I>(levels: I) -> RiskLevel
    where
        I: IntoIterator<Item = RiskLevel>,
    {
        levels
            .into_iter()
            .max()
            .unwrap_or(RiskLevel::Low)
    }

    /// Escalates `self` by another level, keeping the worse of the two.
    pub fn escalate(self, other: RiskLevel) -> RiskLevel {
        self.max(other)
    }

    /// Display label used when no matched rule supplies its own.
    pub fn default_label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "정상 면세",
            RiskLevel::Medium => "세관 확인 필요",
            RiskLevel::High => "정밀 검사 대상",
        }
    }

    /// Wire / log form: `LOW`, `MEDIUM`, `HIGH`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

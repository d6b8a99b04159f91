//! Notice model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Severity of a regulation notice, ordered for highlight ranking
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NoticeRisk {
    /// Informational, no action expected
    #[default]
    Info,
    /// Worth checking before the next shipment
    Watch,
    /// Likely to affect clearance right now
    Alert,
}

impl NoticeRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeRisk::Info => "info",
            NoticeRisk::Watch => "watch",
            NoticeRisk::Alert => "alert",
        }
    }
}

impl std::fmt::Display for NoticeRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One regulation notice after classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationNotice {
    /// Deterministic content hash, see [`notice_id`]
    pub id: String,
    /// Source identifier (e.g. "kcs_public_notice")
    pub source: String,
    /// Human-readable source name
    pub source_name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    /// Publication time when the feed carried a parseable one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Article link, repaired where the feed truncated it
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_url: Option<String>,
    /// Classified topic label (e.g. "합산과세")
    pub category: String,
    #[serde(default)]
    pub risk: NoticeRisk,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// True for seeded placeholder notices served when no feed answered
    #[serde(default)]
    pub is_fallback: bool,
}

/// Deterministic identifier for a feed entry: the first 16 hex
/// characters of `sha256(source|title|link)`. Stable across refreshes
/// so re-fetched entries merge instead of duplicating.
pub fn notice_id(source: &str, title: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"|");
    hasher.update(title.as_bytes());
    hasher.update(b"|");
    hasher.update(link.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_ordering() {
        assert!(NoticeRisk::Info < NoticeRisk::Watch);
        assert!(NoticeRisk::Watch < NoticeRisk::Alert);
        assert_eq!(NoticeRisk::Info.max(NoticeRisk::Alert), NoticeRisk::Alert);
    }

    #[test]
    fn test_risk_wire_form() {
        let json = serde_json::to_string(&NoticeRisk::Alert).unwrap();
        assert_eq!(json, "\"alert\"");
        let parsed: NoticeRisk = serde_json::from_str("\"watch\"").unwrap();
        assert_eq!(parsed, NoticeRisk::Watch);
    }

    #[test]
    fn test_notice_id_is_stable_and_short() {
        let a = notice_id("kcs_press", "합산과세 안내", "https://example.com/1");
        let b = notice_id("kcs_press", "합산과세 안내", "https://example.com/1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_notice_id_distinguishes_fields() {
        let base = notice_id("a", "b", "c");
        assert_ne!(base, notice_id("a", "b", "d"));
        assert_ne!(base, notice_id("a", "x", "c"));
        assert_ne!(base, notice_id("x", "b", "c"));
        // The separator keeps field boundaries unambiguous
        assert_ne!(notice_id("ab", "c", ""), notice_id("a", "bc", ""));
    }

    #[test]
    fn test_notice_round_trips_without_optional_fields() {
        let notice = RegulationNotice {
            id: "deadbeefdeadbeef".to_string(),
            source: "kcs_press".to_string(),
            source_name: "관세청 보도자료".to_string(),
            title: "테스트".to_string(),
            summary: String::new(),
            published_at: None,
            url: "https://example.com".to_string(),
            official_url: None,
            category: "일반".to_string(),
            risk: NoticeRisk::Info,
            tags: vec![],
            is_fallback: false,
        };

        let json = serde_json::to_string(&notice).unwrap();
        assert!(!json.contains("summary"));
        assert!(!json.contains("published_at"));
        let parsed: RegulationNotice = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, notice);
    }
}

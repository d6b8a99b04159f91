//! Aggregator configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SourceResult;

/// One configured feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub id: String,
    pub name: String,
    /// Feed address
    pub url: String,
    /// Board id re-attached to article links that lost it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    /// Landing page used when a feed entry has no usable link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_url: Option<String>,
}

impl SourceEntry {
    fn new(id: &str, name: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            board_id: None,
            official_url: None,
        }
    }

    fn with_board(mut self, board_id: &str, official_url: &str) -> Self {
        self.board_id = Some(board_id.to_string());
        self.official_url = Some(official_url.to_string());
        self
    }

    fn with_official_url(mut self, official_url: &str) -> Self {
        self.official_url = Some(official_url.to_string());
        self
    }
}

/// Notice aggregator settings. Every field has a default, so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticesConfig {
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    /// Per-source fetch deadline in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Sleep between periodic refresh passes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Maximum notices kept in memory and on disk
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "builtin_sources")]
    pub sources: Vec<SourceEntry>,
}

impl NoticesConfig {
    /// Loads a config file, falling back to the defaults when the file
    /// does not exist. A present but unreadable file is an error.
    pub fn from_file(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/notice_cache.jsonl")
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_refresh_interval_secs() -> u64 {
    900
}

fn default_capacity() -> usize {
    200
}

/// The official Korean customs and legislation feeds
pub fn builtin_sources() -> Vec<SourceEntry> {
    vec![
        SourceEntry::new(
            "kcs_public_notice",
            "관세청 공고",
            "https://www.customs.go.kr/kcs/selectBoardRss.do?mi=2895&bbsId=1364",
        )
        .with_board(
            "1364",
            "https://www.customs.go.kr/kcs/selectBoardList.do?mi=2895&bbsId=1364",
        ),
        SourceEntry::new(
            "kcs_admin_rule",
            "행정규칙 행정예고",
            "https://www.customs.go.kr/kcs/selectBoardRss.do?mi=2897&bbsId=1366",
        )
        .with_board(
            "1366",
            "https://www.customs.go.kr/kcs/selectBoardList.do?mi=2897&bbsId=1366",
        ),
        SourceEntry::new(
            "kcs_customs_news",
            "세관소식",
            "https://www.customs.go.kr/kcs/selectBoardRss.do?mi=6949&bbsId=1361",
        )
        .with_board(
            "1361",
            "https://www.customs.go.kr/kcs/selectBoardList.do?mi=6949&bbsId=1361",
        ),
        SourceEntry::new(
            "kcs_press",
            "관세청 보도자료",
            "https://www.customs.go.kr/kcs/selectBoardRss.do?mi=2891&bbsId=1362",
        )
        .with_board(
            "1362",
            "https://www.customs.go.kr/kcs/selectBoardList.do?mi=2891&bbsId=1362",
        ),
        SourceEntry::new(
            "korea_kr_customs",
            "정책브리핑(관세청)",
            "https://www.korea.kr/rss/dept_customs.xml",
        )
        .with_official_url("https://www.korea.kr"),
        SourceEntry::new(
            "moleg_law",
            "법제처 최신법령",
            "https://www.law.go.kr/DRF/lawSearch.do?target=law&OC=public&type=XML",
        )
        .with_official_url("https://www.law.go.kr"),
        SourceEntry::new(
            "easylaw_notice",
            "생활법령 공지",
            "https://www.easylaw.go.kr/CSP/RssNtcRetrieve.laf?topMenu=serviceUl7",
        )
        .with_official_url("https://www.easylaw.go.kr"),
    ]
}

impl Default for NoticesConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            capacity: default_capacity(),
            sources: builtin_sources(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NoticesConfig::default();
        assert_eq!(config.fetch_timeout_secs, 15);
        assert_eq!(config.refresh_interval_secs, 900);
        assert_eq!(config.capacity, 200);
        assert_eq!(config.sources.len(), 7);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: NoticesConfig =
            serde_json::from_str(r#"{"fetch_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.capacity, 200);
        assert_eq!(config.sources.len(), 7);
    }

    #[test]
    fn test_customs_boards_carry_board_ids() {
        let sources = builtin_sources();
        let board_ids: Vec<Option<&str>> = sources
            .iter()
            .filter(|s| s.url.contains("customs.go.kr"))
            .map(|s| s.board_id.as_deref())
            .collect();
        assert_eq!(
            board_ids,
            vec![Some("1364"), Some("1366"), Some("1361"), Some("1362")]
        );
    }

    #[test]
    fn test_source_ids_unique() {
        let sources = builtin_sources();
        let mut ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), sources.len());
    }

    #[test]
    fn test_from_file_missing_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NoticesConfig::from_file(dir.path().join("notices.json")).unwrap();
        assert_eq!(config.sources.len(), 7);
    }

    #[test]
    fn test_from_file_reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notices.json");
        std::fs::write(&path, r#"{"capacity": 10, "sources": []}"#).unwrap();

        let config = NoticesConfig::from_file(&path).unwrap();
        assert_eq!(config.capacity, 10);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_from_file_broken_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notices.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(NoticesConfig::from_file(&path).is_err());
    }
}

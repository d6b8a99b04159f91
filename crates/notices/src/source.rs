//! Notice source abstraction

use async_trait::async_trait;

use crate::error::{SourceFetchError, SourceResult};

/// A raw feed entry before classification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// Raw date text exactly as the feed published it
    pub published: String,
}

/// One upstream regulation feed
///
/// Implementations:
/// - `RssSource`: HTTP fetch of a government board feed
/// - `StaticSource`: fixed items for tests and offline seeding
#[async_trait]
pub trait NoticeSource: Send + Sync {
    /// Stable source identifier (e.g. "kcs_public_notice")
    fn id(&self) -> &str;

    /// Human-readable source name
    fn name(&self) -> &str;

    /// Fetch the current feed entries
    async fn fetch(&self) -> SourceResult<Vec<FetchedItem>>;

    /// Link used for entries that carry none of their own
    fn fallback_url(&self) -> &str {
        ""
    }
}

/// Fixed in-memory source
pub struct StaticSource {
    id: String,
    name: String,
    items: Vec<FetchedItem>,
    fail: bool,
}

impl StaticSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, items: Vec<FetchedItem>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items,
            fail: false,
        }
    }

    /// A source whose fetch always errors
    pub fn failing(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl NoticeSource for StaticSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> SourceResult<Vec<FetchedItem>> {
        if self.fail {
            return Err(SourceFetchError::Http {
                source_id: self.id.clone(),
                message: "static source configured to fail".to_string(),
            });
        }
        Ok(self.items.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_returns_items() {
        let item = FetchedItem {
            title: "공지".to_string(),
            link: "https://example.com/1".to_string(),
            ..Default::default()
        };
        let source = StaticSource::new("test", "테스트", vec![item.clone()]);

        assert_eq!(source.id(), "test");
        assert_eq!(source.fetch().await.unwrap(), vec![item]);
    }

    #[tokio::test]
    async fn test_failing_source_errors() {
        let source = StaticSource::failing("down", "죽은 피드");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SourceFetchError::Http { source_id, .. } if source_id == "down"));
    }
}

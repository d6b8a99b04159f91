//! Notice aggregator
//!
//! Owns the sources, the cache and the in-memory notice list. Refresh
//! is tolerant: every source gets its own deadline, a failed source is
//! recorded and skipped, and the merged result is truncated to capacity
//! and written back to the cache. When neither the cache nor any source
//! has anything to offer, a small seeded set keeps the service
//! answering, flagged as fallback rather than reported as an error.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::NoticeCache;
use crate::classify::classify;
use crate::config::NoticesConfig;
use crate::error::{SourceFetchError, SourceResult};
use crate::notice::{notice_id, RegulationNotice};
use crate::rss::{parse_flexible_date, RssSource};
use crate::source::{FetchedItem, NoticeSource};

const DEFAULT_LIST_LIMIT: usize = 20;
const MAX_LIST_LIMIT: usize = 100;
const DEFAULT_HIGHLIGHT_LIMIT: usize = 3;
const MAX_HIGHLIGHT_LIMIT: usize = 5;
const SUMMARY_MAX_CHARS: usize = 400;

/// Outcome of one refresh pass
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    /// Notices seen for the first time in this pass
    pub fetched: usize,
    /// Sources that answered
    pub updated_sources: Vec<String>,
    /// Sources that failed, with the reason
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source_id: String,
    pub message: String,
}

/// Listing filter. A category filter matches the classified category or
/// any tag.
#[derive(Debug, Clone, Default)]
pub struct NoticeQuery {
    pub category: Option<String>,
    pub source: Option<String>,
    pub limit: Option<usize>,
}

pub struct NoticeAggregator {
    config: NoticesConfig,
    sources: Vec<Box<dyn NoticeSource>>,
    cache: NoticeCache,
    /// Invariant: always sorted newest-first
    notices: RwLock<Vec<RegulationNotice>>,
}

impl NoticeAggregator {
    /// Builds the aggregator with RSS sources from the config and loads
    /// the cache.
    pub fn from_config(config: NoticesConfig) -> SourceResult<Self> {
        let timeout = Duration::from_secs(config.fetch_timeout_secs);
        let mut sources: Vec<Box<dyn NoticeSource>> = Vec::new();
        for entry in &config.sources {
            sources.push(Box::new(RssSource::new(entry.clone(), timeout)?));
        }
        Self::with_sources(config, sources)
    }

    /// Builds the aggregator with explicit sources
    pub fn with_sources(
        config: NoticesConfig,
        sources: Vec<Box<dyn NoticeSource>>,
    ) -> SourceResult<Self> {
        let cache = NoticeCache::new(&config.cache_path);
        let mut notices = cache.load()?;
        notices.retain(|n| !n.is_fallback);
        if notices.is_empty() {
            notices = fallback_notices(Utc::now());
            info!(count = notices.len(), "cache empty, serving fallback notices");
        }
        sort_newest_first(&mut notices);

        Ok(Self {
            config,
            sources,
            cache,
            notices: RwLock::new(notices),
        })
    }

    pub fn config(&self) -> &NoticesConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.notices.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.read().unwrap().is_empty()
    }

    /// True while the list contains seeded fallback notices
    pub fn serving_fallback(&self) -> bool {
        self.notices.read().unwrap().iter().any(|n| n.is_fallback)
    }

    /// Fetches every source under its deadline and merges the results.
    ///
    /// Failures never abort the pass: each one is recorded in the
    /// report and the previously cached notices from that source stay
    /// in place.
    pub async fn refresh(&self) -> RefreshReport {
        let deadline = Duration::from_secs(self.config.fetch_timeout_secs);

        // Fetch phase: no lock held while awaiting
        let mut outcomes = Vec::new();
        for source in &self.sources {
            let outcome = match tokio::time::timeout(deadline, source.fetch()).await {
                Ok(result) => result,
                Err(_) => Err(SourceFetchError::Timeout {
                    source_id: source.id().to_string(),
                    secs: deadline.as_secs(),
                }),
            };
            outcomes.push((
                source.id().to_string(),
                source.name().to_string(),
                source.fallback_url().to_string(),
                outcome,
            ));
        }

        let mut report = RefreshReport {
            fetched: 0,
            updated_sources: Vec::new(),
            failures: Vec::new(),
        };

        let mut guard = self.notices.write().unwrap();
        let mut merged: HashMap<String, RegulationNotice> = guard
            .iter()
            .filter(|n| !n.is_fallback)
            .map(|n| (n.id.clone(), n.clone()))
            .collect();

        for (source_id, source_name, fallback_url, outcome) in outcomes {
            match outcome {
                Ok(items) => {
                    report.updated_sources.push(source_id.clone());
                    for item in items {
                        let notice = build_notice(&source_id, &source_name, &fallback_url, item);
                        if merged.insert(notice.id.clone(), notice).is_none() {
                            report.fetched += 1;
                        }
                    }
                }
                Err(err) => {
                    warn!(source = %source_id, error = %err, "source fetch failed");
                    report.failures.push(SourceFailure {
                        source_id,
                        message: err.to_string(),
                    });
                }
            }
        }

        let mut next: Vec<RegulationNotice> = merged.into_values().collect();
        if next.is_empty() {
            next = fallback_notices(Utc::now());
        }
        sort_newest_first(&mut next);
        next.truncate(self.config.capacity);

        if let Err(err) = self.cache.save(&next) {
            warn!(error = %err, "failed to write notice cache");
        }
        *guard = next;
        drop(guard);

        info!(
            fetched = report.fetched,
            sources = report.updated_sources.len(),
            failures = report.failures.len(),
            "notice refresh complete"
        );
        report
    }

    /// Notices newest-first, filtered and limited
    pub fn list(&self, query: &NoticeQuery) -> Vec<RegulationNotice> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);

        let guard = self.notices.read().unwrap();
        guard
            .iter()
            .filter(|n| match &query.category {
                Some(category) => {
                    n.category == *category || n.tags.iter().any(|t| t == category)
                }
                None => true,
            })
            .filter(|n| match &query.source {
                Some(source) => n.source == *source,
                None => true,
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// The most pressing notices: highest risk first, newest within the
    /// same risk
    pub fn highlights(&self, limit: Option<usize>) -> Vec<RegulationNotice> {
        let limit = limit
            .unwrap_or(DEFAULT_HIGHLIGHT_LIMIT)
            .clamp(1, MAX_HIGHLIGHT_LIMIT);

        let guard = self.notices.read().unwrap();
        let mut ranked: Vec<RegulationNotice> = guard.clone();
        ranked.sort_by(|a, b| {
            b.risk
                .cmp(&a.risk)
                .then(b.published_at.cmp(&a.published_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Refresh loop for the watch command. Runs until the task is
    /// cancelled.
    pub async fn run_periodic(&self, interval: Duration) {
        loop {
            self.refresh().await;
            tokio::time::sleep(interval).await;
        }
    }
}

fn build_notice(
    source_id: &str,
    source_name: &str,
    fallback_url: &str,
    item: FetchedItem,
) -> RegulationNotice {
    let id = notice_id(source_id, &item.title, &item.link);
    let published_at = parse_flexible_date(&item.published);
    let classification = classify(&item.title, &item.summary);
    let summary: String = item.summary.chars().take(SUMMARY_MAX_CHARS).collect();
    let url = if item.link.is_empty() {
        fallback_url.to_string()
    } else {
        item.link
    };

    RegulationNotice {
        id,
        source: source_id.to_string(),
        source_name: source_name.to_string(),
        title: item.title,
        summary,
        published_at,
        official_url: if url.is_empty() { None } else { Some(url.clone()) },
        url,
        category: classification.category,
        risk: classification.risk,
        tags: classification.tags,
        is_fallback: false,
    }
}

/// Newest first; undated notices sort last. Ties break on id so the
/// order is reproducible.
fn sort_newest_first(notices: &mut [RegulationNotice]) {
    notices.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Seeded notices served when both the cache and every source came up
/// empty. Dates are staggered so ordering stays meaningful.
fn fallback_notices(reference: DateTime<Utc>) -> Vec<RegulationNotice> {
    let seeds: [(&str, &str, &str, &str, &str); 4] = [
        (
            "kcs_admin_rule",
            "행정규칙 행정예고",
            "합산과세 운영기준 행정예고",
            "동일 입항일 분리 반입 물품의 합산과세 기준 정비안입니다.",
            "https://www.customs.go.kr/kcs/selectBoardList.do?mi=2897&bbsId=1366",
        ),
        (
            "kcs_public_notice",
            "관세청 공고",
            "소액면세 기준 안내",
            "목록통관 면세 기준과 자가사용 인정 요건을 재안내합니다.",
            "https://www.customs.go.kr/kcs/selectBoardList.do?mi=2895&bbsId=1364",
        ),
        (
            "kcs_customs_news",
            "세관소식",
            "특송 통관 시스템 정기 점검",
            "특송 수입신고 시스템 정기 점검이 예정되어 있습니다. 점검 시간대에는 신고 접수가 일시 중단됩니다.",
            "https://www.customs.go.kr/kcs/selectBoardList.do?mi=6949&bbsId=1361",
        ),
        (
            "kcs_press",
            "관세청 보도자료",
            "성수기 특송 물량 증가에 따른 통관 지연 안내",
            "연말 성수기 물량 증가로 전자상거래 화물 통관이 지연되고 있습니다.",
            "https://www.customs.go.kr/kcs/selectBoardList.do?mi=2891&bbsId=1362",
        ),
    ];

    seeds
        .iter()
        .enumerate()
        .map(|(idx, (source, source_name, title, summary, url))| {
            let classification = classify(title, summary);
            RegulationNotice {
                id: notice_id(source, title, url),
                source: (*source).to_string(),
                source_name: (*source_name).to_string(),
                title: (*title).to_string(),
                summary: (*summary).to_string(),
                published_at: Some(reference - ChronoDuration::hours(6 * idx as i64)),
                url: (*url).to_string(),
                official_url: Some((*url).to_string()),
                category: classification.category,
                risk: classification.risk,
                tags: classification.tags,
                is_fallback: true,
            }
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeRisk;
    use crate::source::StaticSource;
    use async_trait::async_trait;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir, capacity: usize) -> NoticesConfig {
        NoticesConfig {
            cache_path: dir.path().join("cache.jsonl"),
            fetch_timeout_secs: 1,
            refresh_interval_secs: 900,
            capacity,
            sources: vec![],
        }
    }

    fn item(title: &str, link: &str, published: &str) -> FetchedItem {
        FetchedItem {
            title: title.to_string(),
            link: link.to_string(),
            summary: String::new(),
            published: published.to_string(),
        }
    }

    fn boxed(source: StaticSource) -> Box<dyn NoticeSource> {
        Box::new(source)
    }

    #[tokio::test]
    async fn test_refresh_merges_sources_newest_first() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            boxed(StaticSource::new(
                "a",
                "소스 A",
                vec![item("통관 공지", "https://a.example/1", "2024-03-14 10:00:00")],
            )),
            boxed(StaticSource::new(
                "b",
                "소스 B",
                vec![item("관세 공지", "https://b.example/1", "2024-03-15 10:00:00")],
            )),
        ];
        let agg = NoticeAggregator::with_sources(test_config(&dir, 200), sources).unwrap();

        let report = agg.refresh().await;

        assert_eq!(report.fetched, 2);
        assert_eq!(report.updated_sources, vec!["a".to_string(), "b".to_string()]);
        assert!(report.failures.is_empty());

        let listed = agg.list(&NoticeQuery::default());
        let titles: Vec<&str> = listed.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["관세 공지", "통관 공지"]);
        assert!(!agg.serving_fallback());
    }

    #[tokio::test]
    async fn test_failed_source_keeps_cached_notices() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, 200);

        {
            let sources = vec![
                boxed(StaticSource::new(
                    "a",
                    "소스 A",
                    vec![item("통관 공지 A", "https://a.example/1", "2024-03-15 10:00:00")],
                )),
                boxed(StaticSource::new(
                    "b",
                    "소스 B",
                    vec![item("관세 공지 B", "https://b.example/1", "2024-03-14 10:00:00")],
                )),
            ];
            let agg = NoticeAggregator::with_sources(config.clone(), sources).unwrap();
            assert_eq!(agg.refresh().await.fetched, 2);
        }

        // B is down now; its cached notice must survive the refresh
        let sources = vec![
            boxed(StaticSource::new(
                "a",
                "소스 A",
                vec![item("통관 공지 A", "https://a.example/1", "2024-03-15 10:00:00")],
            )),
            boxed(StaticSource::failing("b", "소스 B")),
        ];
        let agg = NoticeAggregator::with_sources(config, sources).unwrap();
        let report = agg.refresh().await;

        assert_eq!(report.fetched, 0);
        assert_eq!(report.updated_sources, vec!["a".to_string()]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source_id, "b");

        let listed = agg.list(&NoticeQuery::default());
        let by_source: Vec<&str> = listed.iter().map(|n| n.source.as_str()).collect();
        assert_eq!(by_source, vec!["a", "b"]);
        assert!(listed.iter().all(|n| !n.is_fallback));
    }

    #[tokio::test]
    async fn test_fallbacks_when_nothing_available() {
        let dir = TempDir::new().unwrap();
        let sources = vec![boxed(StaticSource::failing("a", "소스 A"))];
        let agg = NoticeAggregator::with_sources(test_config(&dir, 200), sources).unwrap();

        // Empty cache already serves the seeded set
        assert!(agg.serving_fallback());
        let listed = agg.list(&NoticeQuery::default());
        assert_eq!(listed.len(), 4);
        assert!(listed.iter().all(|n| n.is_fallback));

        // A fully failed refresh keeps serving it
        let report = agg.refresh().await;
        assert_eq!(report.fetched, 0);
        assert_eq!(report.failures.len(), 1);
        assert!(agg.serving_fallback());
        assert_eq!(agg.len(), 4);
    }

    #[tokio::test]
    async fn test_real_notices_replace_fallbacks() {
        let dir = TempDir::new().unwrap();
        let sources = vec![boxed(StaticSource::new(
            "a",
            "소스 A",
            vec![item("통관 공지", "https://a.example/1", "2024-03-15 10:00:00")],
        ))];
        let agg = NoticeAggregator::with_sources(test_config(&dir, 200), sources).unwrap();
        assert!(agg.serving_fallback());

        agg.refresh().await;

        assert!(!agg.serving_fallback());
        let listed = agg.list(&NoticeQuery::default());
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "통관 공지");
    }

    #[tokio::test]
    async fn test_capacity_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let sources = vec![boxed(StaticSource::new(
            "a",
            "소스 A",
            vec![
                item("공지 하나", "https://a.example/1", "2024-03-13 10:00:00"),
                item("공지 둘", "https://a.example/2", "2024-03-15 10:00:00"),
                item("공지 셋", "https://a.example/3", "2024-03-14 10:00:00"),
            ],
        ))];
        let agg = NoticeAggregator::with_sources(test_config(&dir, 2), sources).unwrap();

        let report = agg.refresh().await;

        assert_eq!(report.fetched, 3);
        let listed = agg.list(&NoticeQuery::default());
        let titles: Vec<&str> = listed.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["공지 둘", "공지 셋"]);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            boxed(StaticSource::new(
                "a",
                "소스 A",
                vec![
                    item("합산과세 안내", "https://a.example/1", "2024-03-15 10:00:00"),
                    item("기타 공지", "https://a.example/2", "2024-03-14 10:00:00"),
                ],
            )),
            boxed(StaticSource::new(
                "b",
                "소스 B",
                vec![item("면세 기준", "https://b.example/1", "2024-03-13 10:00:00")],
            )),
        ];
        let agg = NoticeAggregator::with_sources(test_config(&dir, 200), sources).unwrap();
        agg.refresh().await;

        let by_category = agg.list(&NoticeQuery {
            category: Some("합산과세".to_string()),
            ..Default::default()
        });
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].title, "합산과세 안내");

        let by_source = agg.list(&NoticeQuery {
            source: Some("b".to_string()),
            ..Default::default()
        });
        assert_eq!(by_source.len(), 1);
        assert_eq!(by_source[0].category, "소액면세");

        let both = agg.list(&NoticeQuery {
            category: Some("합산과세".to_string()),
            source: Some("b".to_string()),
            ..Default::default()
        });
        assert!(both.is_empty());
    }

    #[tokio::test]
    async fn test_list_limit_clamped() {
        let dir = TempDir::new().unwrap();
        let items: Vec<FetchedItem> = (0..120)
            .map(|i| {
                item(
                    &format!("공지 {i}"),
                    &format!("https://a.example/{i}"),
                    &format!("2024-03-01 10:{:02}:00", i % 60),
                )
            })
            .collect();
        let sources = vec![boxed(StaticSource::new("a", "소스 A", items))];
        let agg = NoticeAggregator::with_sources(test_config(&dir, 200), sources).unwrap();
        agg.refresh().await;

        assert_eq!(agg.list(&NoticeQuery::default()).len(), 20);
        let one = agg.list(&NoticeQuery {
            limit: Some(0),
            ..Default::default()
        });
        assert_eq!(one.len(), 1);
        let capped = agg.list(&NoticeQuery {
            limit: Some(1000),
            ..Default::default()
        });
        assert_eq!(capped.len(), 100);
    }

    #[tokio::test]
    async fn test_highlights_rank_by_risk_then_date() {
        let dir = TempDir::new().unwrap();
        let sources = vec![boxed(StaticSource::new(
            "a",
            "소스 A",
            vec![
                item("통관 일반 안내", "https://a.example/1", "2024-03-15 10:00:00"),
                item("합산과세 시행", "https://a.example/2", "2024-03-10 10:00:00"),
                item("면세 한도 조정", "https://a.example/3", "2024-03-12 10:00:00"),
            ],
        ))];
        let agg = NoticeAggregator::with_sources(test_config(&dir, 200), sources).unwrap();
        agg.refresh().await;

        let top = agg.highlights(None);
        let risks: Vec<NoticeRisk> = top.iter().map(|n| n.risk).collect();
        assert_eq!(
            risks,
            vec![NoticeRisk::Alert, NoticeRisk::Watch, NoticeRisk::Info]
        );
        assert_eq!(top[0].title, "합산과세 시행");

        let one = agg.highlights(Some(1));
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].title, "합산과세 시행");
    }

    #[tokio::test]
    async fn test_highlights_limit_clamped() {
        let dir = TempDir::new().unwrap();
        let items: Vec<FetchedItem> = (0..8)
            .map(|i| {
                item(
                    &format!("공지 {i}"),
                    &format!("https://a.example/{i}"),
                    &format!("2024-03-01 10:{:02}:00", i),
                )
            })
            .collect();
        let sources = vec![boxed(StaticSource::new("a", "소스 A", items))];
        let agg = NoticeAggregator::with_sources(test_config(&dir, 200), sources).unwrap();
        agg.refresh().await;

        assert_eq!(agg.highlights(None).len(), 3);
        let one = agg.highlights(Some(0));
        assert_eq!(one.len(), 1);
        let capped = agg.highlights(Some(50));
        assert_eq!(capped.len(), 5);
    }

    struct SlowSource;

    #[async_trait]
    impl NoticeSource for SlowSource {
        fn id(&self) -> &str {
            "slow"
        }

        fn name(&self) -> &str {
            "느린 피드"
        }

        async fn fetch(&self) -> SourceResult<Vec<FetchedItem>> {
            tokio::time::sleep(Duration::from_secs(300)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        let dir = TempDir::new().unwrap();
        let agg =
            NoticeAggregator::with_sources(test_config(&dir, 200), vec![Box::new(SlowSource)])
                .unwrap();

        let report = agg.refresh().await;

        assert!(report.updated_sources.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source_id, "slow");
        assert!(report.failures[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn test_empty_link_without_fallback_stays_empty() {
        let dir = TempDir::new().unwrap();
        let sources = vec![boxed(StaticSource::new(
            "a",
            "소스 A",
            vec![item("공지", "", "2024-03-15 10:00:00")],
        ))];
        let agg = NoticeAggregator::with_sources(test_config(&dir, 200), sources).unwrap();
        agg.refresh().await;

        // StaticSource has no fallback URL, so the link stays empty and
        // official_url is omitted
        let listed = agg.list(&NoticeQuery::default());
        assert_eq!(listed[0].url, "");
        assert_eq!(listed[0].official_url, None);
    }

    #[test]
    fn test_fallback_seed_contents() {
        let now = Utc::now();
        let seeds = fallback_notices(now);

        assert_eq!(seeds.len(), 4);
        assert!(seeds.iter().all(|n| n.is_fallback));
        assert_eq!(seeds[0].category, "합산과세");
        assert_eq!(seeds[0].risk, NoticeRisk::Alert);
        assert_eq!(seeds[2].category, "시스템");
        assert_eq!(seeds[3].risk, NoticeRisk::Alert);
        // Staggered six hours apart, newest first after sorting
        assert!(seeds[0].published_at > seeds[1].published_at);
    }
}

//! RSS feed source
//!
//! Fetches one board feed over HTTP and extracts its `<item>` entries.
//! The government boards disagree on namespaces, date formats and link
//! shapes, so tag matching is namespace-agnostic, date parsing tries
//! the shapes seen in the wild, and article links are rebuilt when the
//! feed publishes them relative or without their board id.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

use crate::config::SourceEntry;
use crate::error::{SourceFetchError, SourceResult};
use crate::source::{FetchedItem, NoticeSource};

// The customs boards reject requests with a default client agent
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ARTICLE_MARKERS: &[&str] = &[
    "selectBoardArticle",
    "selectBoardNttInfo",
    "selectNttInfo",
];

/// HTTP-backed notice source for one configured feed
pub struct RssSource {
    entry: SourceEntry,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl RssSource {
    pub fn new(entry: SourceEntry, timeout: Duration) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| SourceFetchError::Http {
                source_id: entry.id.clone(),
                message: err.to_string(),
            })?;

        Ok(Self {
            timeout_secs: timeout.as_secs(),
            entry,
            client,
        })
    }

    fn request_error(&self, err: reqwest::Error) -> SourceFetchError {
        if err.is_timeout() {
            SourceFetchError::Timeout {
                source_id: self.entry.id.clone(),
                secs: self.timeout_secs,
            }
        } else {
            SourceFetchError::Http {
                source_id: self.entry.id.clone(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl NoticeSource for RssSource {
    fn id(&self) -> &str {
        &self.entry.id
    }

    fn name(&self) -> &str {
        &self.entry.name
    }

    async fn fetch(&self) -> SourceResult<Vec<FetchedItem>> {
        let response = self
            .client
            .get(&self.entry.url)
            .send()
            .await
            .map_err(|err| self.request_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceFetchError::Http {
                source_id: self.entry.id.clone(),
                message: format!("status {status}"),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.request_error(err))?;

        let mut items = parse_rss(&self.entry.id, &body)?;
        for item in &mut items {
            item.link = repair_link(&item.link, &self.entry);
        }
        Ok(items)
    }

    fn fallback_url(&self) -> &str {
        self.entry.official_url.as_deref().unwrap_or(&self.entry.url)
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Link,
    Summary,
    Published,
}

/// Extracts `<item>` entries from an RSS body.
///
/// Matching is on local tag names, so `dc:date` and plain `date` both
/// count as the publication date. Text outside any `<item>` is ignored.
pub fn parse_rss(source_id: &str, xml: &str) -> SourceResult<Vec<FetchedItem>> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut pending: Option<FetchedItem> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                field = match e.local_name().as_ref() {
                    b"item" => {
                        pending = Some(FetchedItem::default());
                        None
                    }
                    b"title" => Some(Field::Title),
                    b"link" => Some(Field::Link),
                    b"description" | b"summary" => Some(Field::Summary),
                    b"pubDate" | b"date" => Some(Field::Published),
                    _ => None,
                };
            }
            Ok(Event::Text(t)) => {
                if let (Some(item), Some(field)) = (pending.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|err| parse_error(source_id, err))?;
                    push_text(item, field, &text);
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(item), Some(field)) = (pending.as_mut(), field) {
                    let bytes = t.into_inner();
                    let text = String::from_utf8_lossy(&bytes);
                    push_text(item, field, &text);
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"item" {
                    if let Some(item) = pending.take() {
                        let item = trim_item(item);
                        if !item.title.is_empty() {
                            items.push(item);
                        }
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(parse_error(source_id, err)),
        }
    }

    Ok(items)
}

fn push_text(item: &mut FetchedItem, field: Field, text: &str) {
    let slot = match field {
        Field::Title => &mut item.title,
        Field::Link => &mut item.link,
        Field::Summary => &mut item.summary,
        Field::Published => &mut item.published,
    };
    slot.push_str(text);
}

fn trim_item(item: FetchedItem) -> FetchedItem {
    FetchedItem {
        title: item.title.trim().to_string(),
        link: item.link.trim().to_string(),
        summary: item.summary.trim().to_string(),
        published: item.published.trim().to_string(),
    }
}

fn parse_error(source_id: &str, err: impl std::fmt::Display) -> SourceFetchError {
    SourceFetchError::Parse {
        source_id: source_id.to_string(),
        message: err.to_string(),
    }
}

/// Rebuilds a usable article link.
///
/// Relative links resolve against the feed host root. Links into a
/// customs.go.kr article view that lost their `bbsId` query parameter
/// get it re-attached from the source configuration; without it the
/// board serves an error page.
pub fn repair_link(link: &str, entry: &SourceEntry) -> String {
    if link.is_empty() {
        return String::new();
    }

    let mut url = match Url::parse(link) {
        Ok(url) => url,
        Err(_) => {
            let rooted = format!("/{}", link.trim_start_matches('/'));
            match Url::parse(&entry.url).and_then(|base| base.join(&rooted)) {
                Ok(url) => url,
                Err(_) => return link.to_string(),
            }
        }
    };

    if let Some(board_id) = entry.board_id.as_deref() {
        let customs_host = url
            .host_str()
            .map_or(false, |host| host.ends_with("customs.go.kr"));
        let is_article = ARTICLE_MARKERS
            .iter()
            .any(|marker| url.path().contains(marker));
        let has_board = url.query_pairs().any(|(key, _)| key == "bbsId");

        if customs_host && is_article && !has_board {
            url.query_pairs_mut().append_pair("bbsId", board_id);
        }
    }

    url.to_string()
}

/// Parses the date shapes seen across the government feeds. Timestamps
/// without a zone are assumed to be KST. Returns `None` rather than
/// fabricating a time when nothing matches.
pub fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed
        .replace("GMT+0900", "+0900")
        .replace("GMT+09:00", "+0900");
    let normalized = match normalized.strip_suffix("KST") {
        Some(rest) => format!("{} +0900", rest.trim()),
        None => normalized,
    };

    if let Ok(dt) = DateTime::parse_from_rfc2822(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%d %b %Y %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_DATETIME: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y.%m.%d %H:%M:%S",
        "%Y.%m.%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for pattern in NAIVE_DATETIME {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, pattern) {
            return Some(kst_to_utc(dt));
        }
    }

    const NAIVE_DATE: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];
    for pattern in NAIVE_DATE {
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, pattern) {
            return Some(kst_to_utc(date.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

fn kst_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(naive - chrono::Duration::hours(9)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn customs_entry() -> SourceEntry {
        let mut sources = crate::config::builtin_sources();
        sources.remove(0)
    }

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>관세청 공고</title>
    <link>https://www.customs.go.kr</link>
    <item>
      <title>합산과세 안내</title>
      <link>/kcs/selectBoardArticle.do?mi=2895&amp;nttId=100</link>
      <description><![CDATA[동일 입항일 합산 대상 안내]]></description>
      <pubDate>Fri, 15 Mar 2024 10:30:00 +0900</pubDate>
    </item>
    <item>
      <title>  시스템 점검  </title>
      <link>https://www.customs.go.kr/kcs/selectBoardArticle.do?mi=2895&amp;nttId=101&amp;bbsId=1364</link>
      <dc:date>2024-03-14 09:00:00</dc:date>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_extracts_items() {
        let items = parse_rss("kcs_public_notice", SAMPLE_FEED).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "합산과세 안내");
        assert_eq!(items[0].link, "/kcs/selectBoardArticle.do?mi=2895&nttId=100");
        assert_eq!(items[0].summary, "동일 입항일 합산 대상 안내");
        assert_eq!(items[0].published, "Fri, 15 Mar 2024 10:30:00 +0900");

        // Whitespace trimmed, dc:date treated as the publication date
        assert_eq!(items[1].title, "시스템 점검");
        assert_eq!(items[1].published, "2024-03-14 09:00:00");
        assert_eq!(items[1].summary, "");
    }

    #[test]
    fn test_parse_rss_ignores_channel_text() {
        let items = parse_rss("kcs_public_notice", SAMPLE_FEED).unwrap();
        assert!(items.iter().all(|i| i.title != "관세청 공고"));
    }

    #[test]
    fn test_parse_rss_skips_untitled_items() {
        let xml = r#"<rss><channel><item><link>https://x</link></item></channel></rss>"#;
        let items = parse_rss("test", xml).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_rss_rejects_broken_xml() {
        let err = parse_rss("test", "<rss><channel><item></rss>").unwrap_err();
        assert!(matches!(err, SourceFetchError::Parse { source_id, .. } if source_id == "test"));
    }

    #[test]
    fn test_repair_link_resolves_relative() {
        let entry = customs_entry();
        let repaired = repair_link("/kcs/selectBoardArticle.do?mi=2895&nttId=100", &entry);
        assert_eq!(
            repaired,
            "https://www.customs.go.kr/kcs/selectBoardArticle.do?mi=2895&nttId=100&bbsId=1364"
        );
    }

    #[test]
    fn test_repair_link_roots_schemeless_paths() {
        let entry = customs_entry();
        let repaired = repair_link("kcs/selectBoardList.do?mi=2895", &entry);
        assert_eq!(
            repaired,
            "https://www.customs.go.kr/kcs/selectBoardList.do?mi=2895"
        );
    }

    #[test]
    fn test_repair_link_keeps_existing_board_id() {
        let entry = customs_entry();
        let link = "https://www.customs.go.kr/kcs/selectBoardArticle.do?mi=2895&bbsId=1364";
        assert_eq!(repair_link(link, &entry), link);
    }

    #[test]
    fn test_repair_link_leaves_other_hosts_alone() {
        let entry = customs_entry();
        let link = "https://www.korea.kr/news/policyNewsView.do?newsId=1";
        assert_eq!(repair_link(link, &entry), link);
    }

    #[test]
    fn test_repair_link_empty_stays_empty() {
        assert_eq!(repair_link("", &customs_entry()), "");
    }

    #[test]
    fn test_parse_rfc2822_date() {
        let dt = parse_flexible_date("Fri, 15 Mar 2024 10:30:00 +0900").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 15, 1, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_kst_suffix() {
        let dt = parse_flexible_date("Fri, 15 Mar 2024 10:30:00 KST").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 15, 1, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_gmt_offset_variant() {
        let dt = parse_flexible_date("Fri, 15 Mar 2024 10:30:00 GMT+0900").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 15, 1, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_date() {
        let dt = parse_flexible_date("2024-03-15T10:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime_assumes_kst() {
        let dt = parse_flexible_date("2024-03-15 10:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 15, 1, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_dotted_date() {
        let dt = parse_flexible_date("2024.03.15").unwrap();
        // Midnight KST is 15:00 UTC the previous day
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 14, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_unrecognized_date_is_none() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("   "), None);
        assert_eq!(parse_flexible_date("내일쯤"), None);
    }
}

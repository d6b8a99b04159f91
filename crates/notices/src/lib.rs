//! # Tonggwan Notices
//!
//! Aggregates Korean customs and legislation feeds into a classified,
//! cached notice list. Every source gets its own deadline, a failure
//! is recorded per source instead of failing the pass, and a seeded
//! fallback set keeps the service answering when nothing else is
//! available.
//!
//! Independent of the evaluation pipeline: the engine references
//! notices only through links in its output.

pub mod aggregator;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod notice;
pub mod rss;
pub mod source;

pub use aggregator::{NoticeAggregator, NoticeQuery, RefreshReport, SourceFailure};
pub use cache::NoticeCache;
pub use classify::{classify, Classification};
pub use config::{builtin_sources, NoticesConfig, SourceEntry};
pub use error::{SourceFetchError, SourceResult};
pub use notice::{notice_id, NoticeRisk, RegulationNotice};
pub use rss::{parse_flexible_date, parse_rss, repair_link, RssSource};
pub use source::{FetchedItem, NoticeSource, StaticSource};

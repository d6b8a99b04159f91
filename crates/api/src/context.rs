//! Application context - wires everything together

use std::path::{Path, PathBuf};

use anyhow::Context;
use tonggwan_engine::SnapshotStore;
use tonggwan_notices::{NoticeAggregator, NoticesConfig};

/// Rule snapshot file inside the data directory
const SNAPSHOT_FILE: &str = "rule_library.json";
/// Notice cache file inside the data directory
const NOTICE_CACHE_FILE: &str = "notice_cache.jsonl";
/// Optional notices config file inside the data directory
const NOTICES_CONFIG_FILE: &str = "notices.json";

/// Application context - snapshot store plus notice aggregator
pub struct AppContext {
    pub store: SnapshotStore,
    pub notices: NoticeAggregator,
    data_dir: PathBuf,
}

impl AppContext {
    /// Creates the context rooted at `data_dir`.
    ///
    /// First run seeds the rule snapshot file with the shipped defaults.
    /// A `notices.json` in the data directory overrides the builtin feed
    /// list and timings; the cache path always stays inside `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let store = SnapshotStore::open(data_dir.join(SNAPSHOT_FILE))?;

        let config_path = data_dir.join(NOTICES_CONFIG_FILE);
        let mut config = NoticesConfig::from_file(&config_path)
            .with_context(|| format!("loading notices config from {}", config_path.display()))?;
        config.cache_path = data_dir.join(NOTICE_CACHE_FILE);
        let notices = NoticeAggregator::from_config(config)?;

        Ok(Self {
            store,
            notices,
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

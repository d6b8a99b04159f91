//! Notice cache - JSONL file, one notice per line
//!
//! Loading is lenient: a line that fails to parse is logged and
//! skipped, so one corrupt entry cannot take the whole cache down.
//! Saving rewrites the file as a unit.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::SourceResult;
use crate::notice::RegulationNotice;

pub struct NoticeCache {
    path: PathBuf,
}

impl NoticeCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads cached notices. A missing file is an empty cache.
    pub fn load(&self) -> SourceResult<Vec<RegulationNotice>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut notices = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RegulationNotice>(&line) {
                Ok(notice) => notices.push(notice),
                Err(err) => {
                    warn!(line = index + 1, error = %err, "skipping unreadable cache line");
                }
            }
        }

        Ok(notices)
    }

    /// Rewrites the cache with the given notices
    pub fn save(&self, notices: &[RegulationNotice]) -> SourceResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        for notice in notices {
            let json = serde_json::to_string(notice)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeRisk;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn notice(id: &str) -> RegulationNotice {
        RegulationNotice {
            id: id.to_string(),
            source: "kcs_press".to_string(),
            source_name: "관세청 보도자료".to_string(),
            title: format!("공지 {id}"),
            summary: "요약".to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2024, 3, 15, 1, 30, 0).unwrap()),
            url: "https://example.com/1".to_string(),
            official_url: None,
            category: "관세".to_string(),
            risk: NoticeRisk::Info,
            tags: vec!["관세".to_string()],
            is_fallback: false,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = NoticeCache::new(dir.path().join("none.jsonl"));
        assert!(cache.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = NoticeCache::new(dir.path().join("cache.jsonl"));
        let notices = vec![notice("a"), notice("b")];

        cache.save(&notices).unwrap();
        assert_eq!(cache.load().unwrap(), notices);

        // One JSON object per line
        let text = fs::read_to_string(cache.path()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let cache = NoticeCache::new(dir.path().join("deep").join("cache.jsonl"));
        cache.save(&[notice("a")]).unwrap();
        assert_eq!(cache.load().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_line_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.jsonl");
        let cache = NoticeCache::new(&path);
        cache.save(&[notice("a"), notice("b")]).unwrap();

        let mut text = fs::read_to_string(&path).unwrap();
        text = text.replacen('{', "garbage {", 1);
        fs::write(&path, text).unwrap();

        let loaded = cache.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "b");
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let cache = NoticeCache::new(dir.path().join("cache.jsonl"));
        cache.save(&[notice("a"), notice("b")]).unwrap();
        cache.save(&[notice("c")]).unwrap();

        let loaded = cache.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "c");
    }
}

//! Snapshot store
//!
//! All reference data lives in one immutable snapshot behind an atomic
//! pointer. Readers clone the `Arc` and keep evaluating while a reload
//! parses and validates the replacement; the swap happens only after
//! the whole file checked out, so a bad edit never leaves the engine
//! half-updated.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use tonggwan_catalog::CategoryStore;
use tonggwan_core::ShipmentDeclaration;
use tonggwan_rates::RateTable;
use tonggwan_rules::RuleLibrary;

use crate::error::EngineResult;
use crate::result::Evaluation;
use crate::tariff::TariffSchedule;

/// A complete, immutable set of reference data.
///
/// Missing sections in the backing file fall back to the shipped
/// defaults, so a file containing only a rule list still evaluates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    #[serde(default = "RateTable::with_defaults")]
    pub rates: RateTable,
    #[serde(default = "CategoryStore::with_defaults")]
    pub categories: CategoryStore,
    #[serde(default = "RuleLibrary::with_defaults")]
    pub rules: RuleLibrary,
    #[serde(default)]
    pub tariff: TariffSchedule,
    /// When this snapshot was loaded into memory
    #[serde(skip, default = "Utc::now")]
    pub loaded_at: DateTime<Utc>,
    /// Generation counter, assigned by the store on each swap
    #[serde(skip)]
    pub revision: u64,
}

impl EngineSnapshot {
    /// The shipped reference data
    pub fn with_defaults() -> Self {
        Self {
            rates: RateTable::with_defaults(),
            categories: CategoryStore::with_defaults(),
            rules: RuleLibrary::with_defaults(),
            tariff: TariffSchedule::default(),
            loaded_at: Utc::now(),
            revision: 0,
        }
    }

    /// Parses and validates a snapshot from JSON
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let snapshot: EngineSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every section for internal consistency
    pub fn validate(&self) -> EngineResult<()> {
        self.rates.validate()?;
        self.categories.validate()?;
        self.rules.validate()?;
        self.tariff.validate()?;
        Ok(())
    }

    /// Evaluate a declaration against this snapshot
    pub fn evaluate(&self, declaration: &ShipmentDeclaration) -> EngineResult<Evaluation> {
        crate::evaluate::evaluate(self, declaration)
    }
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// File-backed snapshot holder with atomic swap on reload.
pub struct SnapshotStore {
    path: PathBuf,
    current: RwLock<Arc<EngineSnapshot>>,
}

impl SnapshotStore {
    /// Opens the store, seeding the file with the shipped defaults when
    /// it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> EngineResult<Self> {
        let path = path.into();
        let snapshot = if path.exists() {
            let text = fs::read_to_string(&path)?;
            let snapshot = EngineSnapshot::from_json(&text)?;
            info!(
                path = %path.display(),
                rules = snapshot.rules.len(),
                categories = snapshot.categories.len(),
                "loaded reference data"
            );
            snapshot
        } else {
            let snapshot = EngineSnapshot::with_defaults();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, snapshot.to_json()?)?;
            info!(path = %path.display(), "seeded reference data file");
            snapshot
        };

        Ok(Self {
            path,
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current snapshot. Cheap: clones the pointer, not the data.
    pub fn current(&self) -> Arc<EngineSnapshot> {
        Arc::clone(&self.current.read().unwrap())
    }

    /// Re-reads the backing file and swaps the snapshot in one step.
    /// On any error the previous snapshot stays in place.
    pub fn reload(&self) -> EngineResult<Arc<EngineSnapshot>> {
        let text = fs::read_to_string(&self.path)?;
        let mut snapshot = EngineSnapshot::from_json(&text)?;

        let mut guard = self.current.write().unwrap();
        snapshot.revision = guard.revision + 1;
        let next = Arc::new(snapshot);
        *guard = Arc::clone(&next);

        info!(
            revision = next.revision,
            rules = next.rules.len(),
            "reloaded reference data"
        );
        Ok(next)
    }

    /// Evaluate against the current snapshot
    pub fn evaluate(&self, declaration: &ShipmentDeclaration) -> EngineResult<Evaluation> {
        self.current().evaluate(declaration)
    }
}

// =============================================================================
// Tests
// =============================================================================

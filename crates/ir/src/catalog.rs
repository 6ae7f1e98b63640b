//! Model catalogue
//!
//! Summaries of the models and versions a registry offers, plus a
//! caller-owned cache for that summary. The cache has a fixed time-to-live
//! and a single-writer lease: a refresh attempted while another refresh is
//! running is skipped rather than queued.

use chrono::{DateTime, Duration, Utc};
use ddlgen_core::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::sync::{RwLock, TryLockError};

/// Display names for well-known models
const PRETTY_MODELS: &[(&str, &str)] = &[
    ("i2b2", "i2b2"),
    ("i2b2_pedsnet", "i2b2 for PEDSnet"),
    ("omop", "OMOP"),
    ("pcornet", "PCORnet"),
    ("pedsnet", "PEDSnet"),
];

/// Display name for a model, falling back to the raw name
pub fn pretty_model_name(name: &str) -> &str {
    PRETTY_MODELS
        .iter()
        .find(|(raw, _)| *raw == name)
        .map_or(name, |(_, pretty)| pretty)
}

// ============================================================================
// Listing
// ============================================================================

/// Release maturity of a model version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseLevel {
    Alpha,
    Beta,
    #[default]
    Final,
}

impl ReleaseLevel {
    /// Badge text for pre-release versions
    pub fn label(&self) -> Option<&'static str> {
        match self {
            ReleaseLevel::Alpha => Some("alpha"),
            ReleaseLevel::Beta => Some("beta"),
            ReleaseLevel::Final => None,
        }
    }

    /// Terminal color of the badge
    pub fn color(&self) -> &'static str {
        match self {
            ReleaseLevel::Alpha => "red",
            ReleaseLevel::Beta => "yellow",
            ReleaseLevel::Final => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub level: ReleaseLevel,
}

/// One `(model, version)` row of a registry listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub release: Release,
}

impl ListingEntry {
    pub fn new(name: impl Into<String>, version: impl Into<String>, level: ReleaseLevel) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            release: Release { level },
        }
    }
}

// ============================================================================
// ModelIndex
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name: String,
    pub release_level: ReleaseLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub pretty: String,
    /// Sorted by version name
    pub versions: Vec<ModelVersion>,
}

/// All models offered by a registry, with the registry's own version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelIndex {
    /// Sorted by case-insensitive display name
    pub models: Vec<ModelSummary>,
    pub service_version: String,
}

impl ModelIndex {
    /// Group a flat listing into models with sorted versions
    pub fn from_listing(
        entries: impl IntoIterator<Item = ListingEntry>,
        service_version: impl Into<String>,
    ) -> Self {
        let mut models: Vec<ModelSummary> = Vec::new();

        for entry in entries {
            let version = ModelVersion {
                name: entry.version,
                release_level: entry.release.level,
            };
            match models.iter_mut().find(|m| m.name == entry.name) {
                Some(model) => model.versions.push(version),
                None => models.push(ModelSummary {
                    pretty: pretty_model_name(&entry.name).to_string(),
                    name: entry.name,
                    versions: vec![version],
                }),
            }
        }

        for model in &mut models {
            model.versions.sort_by(|a, b| a.name.cmp(&b.name));
        }
        models.sort_by_key(|m| m.pretty.to_lowercase());

        Self {
            models,
            service_version: service_version.into(),
        }
    }

    /// Find a model by raw name
    pub fn model(&self, name: &str) -> Option<&ModelSummary> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn has_version(&self, model: &str, version: &str) -> bool {
        self.model(model)
            .is_some_and(|m| m.versions.iter().any(|v| v.name == version))
    }
}

// ============================================================================
// ModelIndexCache
// ============================================================================

#[derive(Debug, Clone)]
struct CachedIndex {
    index: ModelIndex,
    fetched_at: DateTime<Utc>,
}

/// Time-limited cache for one [`ModelIndex`].
///
/// Owned by the caller (typically one per service process) and shared by
/// reference. Reads never block each other; refreshes take a write lease
/// with `try_write` so at most one fetch runs at a time.
#[derive(Debug)]
pub struct ModelIndexCache {
    ttl: Duration,
    slot: RwLock<Option<CachedIndex>>,
}

impl ModelIndexCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached index if it is still fresh
    pub fn get(&self) -> EngineResult<Option<ModelIndex>> {
        self.get_at(Utc::now())
    }

    /// Freshness check against an explicit clock reading
    pub fn get_at(&self, now: DateTime<Utc>) -> EngineResult<Option<ModelIndex>> {
        let slot = self
            .slot
            .read()
            .map_err(|_| EngineError::internal("model index cache lock poisoned"))?;
        Ok(slot
            .as_ref()
            .filter(|c| now - c.fetched_at < self.ttl)
            .map(|c| c.index.clone()))
    }

    /// Replace the cached index, stamping it with the current time
    pub fn store(&self, index: ModelIndex) -> EngineResult<()> {
        self.store_at(index, Utc::now())
    }

    pub fn store_at(&self, index: ModelIndex, fetched_at: DateTime<Utc>) -> EngineResult<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| EngineError::internal("model index cache lock poisoned"))?;
        *slot = Some(CachedIndex { index, fetched_at });
        Ok(())
    }

    /// Return the fresh index, or fetch and store a new one.
    ///
    /// Returns `Ok(None)` when another caller holds the write lease; that
    /// caller is already refreshing the index.
    pub fn get_or_refresh<F>(&self, fetch: F) -> EngineResult<Option<ModelIndex>>
    where
        F: FnOnce() -> EngineResult<ModelIndex>,
    {
        let now = Utc::now();
        match self.slot.try_read() {
            Ok(slot) => {
                if let Some(cached) = slot.as_ref().filter(|c| now - c.fetched_at < self.ttl) {
                    return Ok(Some(cached.index.clone()));
                }
            }
            Err(TryLockError::WouldBlock) => {
                tracing::debug!("model index refresh already in progress, skipping");
                return Ok(None);
            }
            Err(TryLockError::Poisoned(_)) => {
                return Err(EngineError::internal("model index cache lock poisoned"));
            }
        }

        let mut slot = match self.slot.try_write() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                tracing::debug!("model index refresh already in progress, skipping");
                return Ok(None);
            }
            Err(TryLockError::Poisoned(_)) => {
                return Err(EngineError::internal("model index cache lock poisoned"));
            }
        };

        let index = fetch()?;
        *slot = Some(CachedIndex {
            index: index.clone(),
            fetched_at: Utc::now(),
        });
        tracing::debug!(models = index.models.len(), "model index refreshed");
        Ok(Some(index))
    }

    /// Drop the cached index
    pub fn invalidate(&self) -> EngineResult<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| EngineError::internal("model index cache lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

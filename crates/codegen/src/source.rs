//! Schema sources
//!
//! Where schema documents come from. The generator only sees the
//! [`SchemaSource`] trait; a registry client, a directory of JSON files and
//! an in-memory map are interchangeable behind it.

use ddlgen_core::{EngineError, EngineResult, ResultExt};
use ddlgen_ir::{ListingEntry, ModelIndex, ReleaseLevel, SchemaDocument};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A schema document together with the version of whatever served it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub document: SchemaDocument,
    pub service_version: String,
}

/// Resolves `(model, version)` to a schema document
pub trait SchemaSource {
    /// Fetch one model version
    fn resolve(&self, model: &str, version: &str) -> EngineResult<ResolvedSchema>;

    /// Every `(model, version)` the source can resolve
    fn listing(&self) -> EngineResult<Vec<ListingEntry>>;

    /// Version reported by the source itself
    fn service_version(&self) -> &str;

    /// Listing grouped into a [`ModelIndex`]
    fn model_index(&self) -> EngineResult<ModelIndex> {
        Ok(ModelIndex::from_listing(
            self.listing()?,
            self.service_version(),
        ))
    }
}

// ============================================================================
// FileSource
// ============================================================================

/// Documents stored as `<root>/<model>/<version>.json`
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    service_version: String,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>, service_version: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            service_version: service_version.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a model version is expected at
    pub fn document_path(&self, model: &str, version: &str) -> PathBuf {
        self.root.join(model).join(format!("{}.json", version))
    }
}

impl SchemaSource for FileSource {
    fn resolve(&self, model: &str, version: &str) -> EngineResult<ResolvedSchema> {
        let path = self.document_path(model, version);
        if !path.is_file() {
            return Err(EngineError::ModelNotFound {
                model: model.to_string(),
                version: version.to_string(),
            });
        }

        let json = std::fs::read_to_string(&path).map_err(|e| EngineError::FileRead {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), bytes = json.len(), "read schema document");

        let document = SchemaDocument::from_json(&json)
            .with_context(format!("parsing {}", path.display()))?;

        Ok(ResolvedSchema {
            document,
            service_version: self.service_version.clone(),
        })
    }

    fn listing(&self) -> EngineResult<Vec<ListingEntry>> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| EngineError::FileRead {
                path: self.root.clone(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let model = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str());
            let version = path.file_stem().and_then(|s| s.to_str());
            if let (Some(model), Some(version)) = (model, version) {
                entries.push(ListingEntry::new(model, version, ReleaseLevel::Final));
            }
        }

        Ok(entries)
    }

    fn service_version(&self) -> &str {
        &self.service_version
    }
}

// ============================================================================
// StaticSource
// ============================================================================

/// In-memory documents, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: BTreeMap<(String, String), SchemaDocument>,
    service_version: String,
}

impl StaticSource {
    pub fn new(service_version: impl Into<String>) -> Self {
        Self {
            documents: BTreeMap::new(),
            service_version: service_version.into(),
        }
    }

    /// Register a document (builder style)
    pub fn with_document(
        mut self,
        model: impl Into<String>,
        version: impl Into<String>,
        document: SchemaDocument,
    ) -> Self {
        self.insert(model, version, document);
        self
    }

    pub fn insert(
        &mut self,
        model: impl Into<String>,
        version: impl Into<String>,
        document: SchemaDocument,
    ) {
        self.documents.insert((model.into(), version.into()), document);
    }
}

impl SchemaSource for StaticSource {
    fn resolve(&self, model: &str, version: &str) -> EngineResult<ResolvedSchema> {
        self.documents
            .get(&(model.to_string(), version.to_string()))
            .map(|document| ResolvedSchema {
                document: document.clone(),
                service_version: self.service_version.clone(),
            })
            .ok_or_else(|| EngineError::ModelNotFound {
                model: model.to_string(),
                version: version.to_string(),
            })
    }

    fn listing(&self) -> EngineResult<Vec<ListingEntry>> {
        Ok(self
            .documents
            .keys()
            .map(|(model, version)| ListingEntry::new(model, version, ReleaseLevel::Final))
            .collect())
    }

    fn service_version(&self) -> &str {
        &self.service_version
    }
}

// ============================================================================
// Tests
// ============================================================================

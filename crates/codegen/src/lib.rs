//! # ddlgen Codegen
//!
//! SQL script generation for ddlgen.
//!
//! This crate turns a checked [`ddlgen_ir::Schema`] into executable DDL and
//! DML text for one of the supported dialects, wrapped in an audit trail.
//!
//! ## Features
//!
//! - **Ordering**: stable creation order plus a foreign-key-aware delete order
//! - **Dialect profiles**: native types, deferral, guards and capabilities
//! - **Rendering**: create, drop, delete-data and Oracle logging toggles
//! - **Audit trail**: `version_history` bootstrap and one row per section
//! - **Sources**: schema documents from a directory or from memory
//!

// ============================================================================
// Modules
// ============================================================================

pub mod audit;
pub mod dialect;
pub mod generator;
pub mod order;
pub mod render;
pub mod source;

// ============================================================================
// Re-exports
// ============================================================================

pub use audit::{AuditTrailEmitter, VERSION_HISTORY_TABLE, VersionInfo};
pub use dialect::{BootstrapGuard, DialectProfile};
pub use generator::{Generator, ScriptSummary, generate, summarize};
pub use order::TableOrder;
pub use render::{DdlRenderer, Element, ElementFlags, Operation, RenderedSection};
pub use source::{FileSource, ResolvedSchema, SchemaSource, StaticSource};

use ddlgen_core::{Dialect, EngineError, EngineResult};
use std::path::Path;

/// Statement terminator appended after every trimmed statement
pub const STATEMENT_TERMINATOR: &str = ";\n\n";

// ============================================================================
// GenerateOptions
// ============================================================================

/// Everything a caller chooses for one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub model: String,
    pub model_version: String,
    pub dialect: Dialect,

    /// Element selection for create, drop and logging scripts
    pub elements: ElementFlags,

    /// Drop instead of create
    pub drop: bool,

    /// Delete rows; overrides every other mode and the element flags
    pub delete_data: bool,

    /// Oracle `LOGGING`; overrides `drop`
    pub logging: bool,

    /// Oracle `NOLOGGING`; overrides `drop`
    pub nologging: bool,

    /// Overrides the version reported by the schema source
    pub service_version: Option<String>,

    /// Recorded in every audit row
    pub generator_version: String,
}

impl GenerateOptions {
    /// Create-everything options for a model version
    pub fn new(model: impl Into<String>, model_version: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            model: model.into(),
            model_version: model_version.into(),
            dialect,
            elements: ElementFlags::all(),
            drop: false,
            delete_data: false,
            logging: false,
            nologging: false,
            service_version: None,
            generator_version: VERSION.to_string(),
        }
    }

    /// Select elements; an empty selection means all of them
    pub fn with_elements(mut self, elements: ElementFlags) -> Self {
        self.elements = elements.or_all();
        self
    }

    pub fn with_drop(mut self) -> Self {
        self.drop = true;
        self
    }

    pub fn with_delete_data(mut self) -> Self {
        self.delete_data = true;
        self
    }

    pub fn with_logging(mut self) -> Self {
        self.logging = true;
        self
    }

    pub fn with_nologging(mut self) -> Self {
        self.nologging = true;
        self
    }

    pub fn with_service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn with_generator_version(mut self, version: impl Into<String>) -> Self {
        self.generator_version = version.into();
        self
    }

    /// Resolve the mode flags into one operation.
    ///
    /// Precedence: delete-data, then logging/nologging, then drop, then
    /// create. Asking for both logging and nologging is an error.
    pub fn operation(&self) -> EngineResult<Operation> {
        if self.delete_data {
            return Ok(Operation::DeleteData);
        }
        match (self.logging, self.nologging) {
            (true, true) => Err(EngineError::invalid_config(
                "logging and nologging are mutually exclusive",
            )),
            (true, false) => Ok(Operation::EnableLogging),
            (false, true) => Ok(Operation::DisableLogging),
            (false, false) if self.drop => Ok(Operation::Drop),
            (false, false) => Ok(Operation::Create),
        }
    }
}

// ============================================================================
// GeneratedScript
// ============================================================================

/// A finished script with the sections it was assembled from
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub dialect: Dialect,
    pub operation: Operation,
    pub info: VersionInfo,

    /// Rendered sections, including empty ones
    pub sections: Vec<RenderedSection>,

    /// Final statements: bootstrap, audit rows and section statements
    pub statements: Vec<String>,

    /// Things worth telling the caller that did not stop generation
    pub warnings: Vec<String>,
}

impl GeneratedScript {
    /// Script text: each statement trimmed and terminated
    pub fn text(&self) -> String {
        self.statements
            .iter()
            .map(|s| format!("{}{}", s.trim(), STATEMENT_TERMINATOR))
            .collect()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Section with the given audit label
    pub fn section(&self, label: &str) -> Option<&RenderedSection> {
        self.sections.iter().find(|s| s.label == label)
    }

    /// Number of section statements acting on an element
    pub fn count_for(&self, element: Element) -> usize {
        self.sections
            .iter()
            .filter(|s| s.element == element)
            .map(|s| s.len())
            .sum()
    }

    /// Write the script text, creating parent directories
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        std::fs::write(path, self.text()).map_err(|e| EngineError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Crate version, recorded as the generator version by default
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Tests
// ============================================================================

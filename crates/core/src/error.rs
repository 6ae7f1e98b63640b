//! Error types for ddlgen
//!
//! This module provides unified error handling across the workspace:
//! schema-model errors, dialect capability errors, IO errors, serialization
//! errors and configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ddlgen
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Schema Model Errors
    // ========================================================================
    /// A constraint, index or foreign key names a table or column that does
    /// not exist in the schema
    #[error("Schema reference error in '{table}': {message}")]
    SchemaReference { table: String, message: String },

    /// A field declares a type string outside the supported set
    #[error("Unknown type '{type_name}' for field '{table}.{field}'")]
    UnknownType {
        table: String,
        field: String,
        type_name: String,
    },

    /// Two tables, or two constraints or indexes of the same kind, share a name
    #[error("Duplicate {kind} name: '{name}' already exists")]
    DuplicateName { kind: String, name: String },

    // ========================================================================
    // Dialect Errors
    // ========================================================================
    /// The dialect cannot express the requested operation
    #[error("Operation '{operation}' is not supported on {dialect}")]
    UnsupportedOperation { dialect: String, operation: String },

    /// Dialect identifier is not one of the supported dialects
    #[error("Unknown dialect: '{0}'")]
    UnknownDialect(String),

    // ========================================================================
    // Source Errors
    // ========================================================================
    /// No schema document exists for the requested model and version
    #[error("Model '{model}' version '{version}' not found")]
    ModelNotFound { model: String, version: String },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    /// Create a schema reference error
    pub fn schema_reference(table: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::SchemaReference {
            table: table.into(),
            message: msg.into(),
        }
    }

    /// Create an unknown type error
    pub fn unknown_type(
        table: impl Into<String>,
        field: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        EngineError::UnknownType {
            table: table.into(),
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a duplicate name error
    pub fn duplicate_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        EngineError::DuplicateName {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(dialect: impl Into<String>, operation: impl Into<String>) -> Self {
        EngineError::UnsupportedOperation {
            dialect: dialect.into(),
            operation: operation.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfig(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error comes from building the schema model.
    ///
    /// These errors abort generation before any statement is rendered.
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            EngineError::SchemaReference { .. }
                | EngineError::UnknownType { .. }
                | EngineError::DuplicateName { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::ModelNotFound { .. })
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            EngineError::Io(_) | EngineError::FileRead { .. } | EngineError::FileWrite { .. }
        )
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T> {
        self.map_err(|e| {
            let err: EngineError = e.into();
            EngineError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_reference_error() {
        let err = EngineError::schema_reference("visit", "target table 'person' does not exist");
        assert!(err.is_model_error());
        assert!(!err.is_io());
        assert_eq!(
            err.to_string(),
            "Schema reference error in 'visit': target table 'person' does not exist"
        );
    }

    #[test]
    fn test_unknown_type_error() {
        let err = EngineError::unknown_type("person", "birth", "geometry");
        assert!(err.is_model_error());
        assert_eq!(
            err.to_string(),
            "Unknown type 'geometry' for field 'person.birth'"
        );
    }

    #[test]
    fn test_duplicate_name_error() {
        let err = EngineError::duplicate_name("table", "person");
        assert!(err.is_model_error());
        assert_eq!(
            err.to_string(),
            "Duplicate table name: 'person' already exists"
        );
    }

    #[test]
    fn test_unsupported_is_not_model_error() {
        let err = EngineError::unsupported("SQLite", "add constraint");
        assert!(!err.is_model_error());
        assert_eq!(
            err.to_string(),
            "Operation 'add constraint' is not supported on SQLite"
        );
    }

    #[test]
    fn test_not_found() {
        let err = EngineError::ModelNotFound {
            model: "omop".to_string(),
            version: "v5".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Model 'omop' version 'v5' not found");
    }

    #[test]
    fn test_error_with_context() {
        let err = EngineError::with_context("Loading schema", "Permission denied");
        assert_eq!(err.to_string(), "Loading schema: Permission denied");
    }

    #[test]
    fn test_result_ext_with_context() {
        let res: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = res.with_context("Reading model").unwrap_err();
        assert_eq!(err.to_string(), "Reading model: IO error: missing");
    }

    #[test]
    fn test_io_error_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EngineError = io_err.into();
        assert!(err.is_io());
    }
}

//! # ddlgen IR (Schema Model)
//!
//! This crate provides the intermediate representation for ddlgen: the
//! JSON document a model registry serves, the schema model built from it,
//! and a small catalogue of available models.
//!
//! ## Core Concepts
//!
//! - **SchemaDocument**: the raw input (tables, fields, constraints, indexes)
//! - **Schema**: the checked model of tables, columns, constraints and indexes
//! - **SchemaBuilder**: turns a document into a schema, failing fast on bad
//!   types, duplicate names and dangling references
//! - **ModelIndex**: the models and versions a registry offers
//!

// Module declarations
pub mod builder;
pub mod catalog;
pub mod document;
pub mod schema;
pub mod validation;

// Re-export commonly used types at crate root
pub use builder::{SchemaBuilder, build_schema, build_schema_from_json};
pub use catalog::{
    ListingEntry, ModelIndex, ModelIndexCache, ModelSummary, ModelVersion, ReleaseLevel,
    pretty_model_name,
};
pub use document::{
    ConstraintsDoc, FieldDoc, ForeignKeyDoc, IndexDoc, NotNullDoc, PrimaryKeyDoc, SchemaDocument,
    SchemaSection, TableDoc, UniqueDoc,
};
pub use schema::{
    Column, Constraint, ConstraintKind, DEFAULT_NUMERIC_PRECISION, DEFAULT_NUMERIC_SCALE,
    DEFAULT_STRING_LENGTH, DefaultValue, Index, Schema, Table,
};

// Re-export core types that are commonly used with IR
pub use ddlgen_core::{ColumnType, Dialect, EngineError, EngineResult, Validatable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        Column,
        // Re-exported from core
        ColumnType,
        Constraint,
        ConstraintKind,
        Dialect,
        EngineError,
        EngineResult,
        Index,
        // Model
        Schema,
        SchemaBuilder,
        // Input
        SchemaDocument,
        Table,
        build_schema,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_length_default() {
        assert_eq!(DEFAULT_STRING_LENGTH, 256);
    }

    #[test]
    fn test_numeric_defaults() {
        assert_eq!((DEFAULT_NUMERIC_PRECISION, DEFAULT_NUMERIC_SCALE), (20, 5));
    }
}

//! Core types used throughout ddlgen
//!
//! This module contains the closed set of semantic column types accepted
//! in schema documents and the SQL dialects the renderer targets.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Column Types
// ============================================================================

/// Semantic column types supported in schema documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInteger,
    /// Fixed-point number with precision and scale (`number`, `decimal`)
    Numeric,
    /// Floating point number
    Float,
    /// Variable-length string with a length
    String,
    /// Date without time
    Date,
    /// Date and time (`datetime`, `timestamp`)
    DateTime,
    /// Time without date
    Time,
    /// Long-form text (`text`, `clob`)
    Text,
    /// Boolean true/false
    Boolean,
    /// Binary data
    Blob,
}

impl ColumnType {
    /// Map a document type string onto a column type.
    ///
    /// Matching ignores case and surrounding whitespace. Returns `None` for
    /// anything outside the supported set.
    pub fn from_type_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "integer" => Some(ColumnType::Integer),
            "biginteger" => Some(ColumnType::BigInteger),
            "number" | "decimal" => Some(ColumnType::Numeric),
            "float" => Some(ColumnType::Float),
            "string" => Some(ColumnType::String),
            "date" => Some(ColumnType::Date),
            "datetime" | "timestamp" => Some(ColumnType::DateTime),
            "time" => Some(ColumnType::Time),
            "text" | "clob" => Some(ColumnType::Text),
            "boolean" => Some(ColumnType::Boolean),
            "blob" => Some(ColumnType::Blob),
            _ => None,
        }
    }

    /// Canonical type string, as accepted by [`ColumnType::from_type_str`]
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::BigInteger => "biginteger",
            ColumnType::Numeric => "number",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Time => "time",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Blob => "blob",
        }
    }

    /// Whether the type carries a length parameter
    pub fn has_length(&self) -> bool {
        matches!(self, ColumnType::String)
    }

    /// Whether the type carries precision and scale parameters
    pub fn has_precision(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }

    /// Get all column types
    pub fn all() -> &'static [ColumnType] {
        &[
            ColumnType::Integer,
            ColumnType::BigInteger,
            ColumnType::Numeric,
            ColumnType::Float,
            ColumnType::String,
            ColumnType::Date,
            ColumnType::DateTime,
            ColumnType::Time,
            ColumnType::Text,
            ColumnType::Boolean,
            ColumnType::Blob,
        ]
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Dialects
// ============================================================================

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    PostgreSQL,
    Oracle,
    #[serde(rename = "mssql")]
    MsSql,
    MySQL,
    SQLite,
}

impl Dialect {
    /// Lowercase identifier used on the command line and in documents
    pub fn identifier(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "postgresql",
            Dialect::Oracle => "oracle",
            Dialect::MsSql => "mssql",
            Dialect::MySQL => "mysql",
            Dialect::SQLite => "sqlite",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "PostgreSQL",
            Dialect::Oracle => "Oracle",
            Dialect::MsSql => "MS SQL Server",
            Dialect::MySQL => "MySQL",
            Dialect::SQLite => "SQLite",
        }
    }

    /// Get all dialects
    pub fn all() -> &'static [Dialect] {
        &[
            Dialect::PostgreSQL,
            Dialect::Oracle,
            Dialect::MsSql,
            Dialect::MySQL,
            Dialect::SQLite,
        ]
    }
}

impl FromStr for Dialect {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(Dialect::PostgreSQL),
            "oracle" => Ok(Dialect::Oracle),
            "mssql" | "sqlserver" => Ok(Dialect::MsSql),
            "mysql" => Ok(Dialect::MySQL),
            "sqlite" => Ok(Dialect::SQLite),
            _ => Err(EngineError::UnknownDialect(s.to_string())),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================

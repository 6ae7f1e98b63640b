//! # Dialect Profiles
//!
//! One immutable rule table per supported SQL dialect: native type
//! spellings, constraint deferral, the guard used to create the
//! `version_history` table idempotently, and which optional statement kinds
//! the dialect can express at all.
//!
//! Profiles are plain `static` data looked up with
//! [`DialectProfile::for_dialect`]; nothing here is mutated at runtime.

use ddlgen_core::{ColumnType, Dialect, EngineError, EngineResult};
use ddlgen_ir::{Column, ConstraintKind, DefaultValue};

// ============================================================================
// BootstrapGuard
// ============================================================================

/// How a dialect creates a table only when it does not exist yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapGuard {
    /// `CREATE TABLE IF NOT EXISTS ...`
    IfNotExists,
    /// `IF OBJECT_ID(N'name', N'U') IS NULL CREATE TABLE ...`
    ObjectIdCheck,
    /// PL/SQL block that swallows ORA-00955 ("name is already used")
    IgnoreAlreadyExists,
}

// ============================================================================
// DialectProfile
// ============================================================================

/// Rendering rules for one dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectProfile {
    pub dialect: Dialect,

    /// Length used for strings without an explicit one. `None` falls back
    /// to the model default.
    pub default_string_length: Option<u32>,

    /// Foreign keys and unique constraints get `DEFERRABLE INITIALLY DEFERRED`
    pub defers_constraints: bool,

    /// `ALTER TABLE|INDEX ... [NO]LOGGING` is meaningful
    pub supports_logging: bool,

    /// `ALTER TABLE ... ADD|DROP CONSTRAINT` is available
    pub supports_alter_constraints: bool,

    pub bootstrap_guard: BootstrapGuard,

    /// Expression for the current timestamp in a `DEFAULT` clause
    pub now_expression: &'static str,
}

static POSTGRESQL: DialectProfile = DialectProfile {
    dialect: Dialect::PostgreSQL,
    default_string_length: None,
    defers_constraints: true,
    supports_logging: false,
    supports_alter_constraints: true,
    bootstrap_guard: BootstrapGuard::IfNotExists,
    now_expression: "now()",
};

static ORACLE: DialectProfile = DialectProfile {
    dialect: Dialect::Oracle,
    default_string_length: Some(255),
    defers_constraints: true,
    supports_logging: true,
    supports_alter_constraints: true,
    bootstrap_guard: BootstrapGuard::IgnoreAlreadyExists,
    now_expression: "SYSDATE",
};

static MSSQL: DialectProfile = DialectProfile {
    dialect: Dialect::MsSql,
    default_string_length: None,
    defers_constraints: false,
    supports_logging: false,
    supports_alter_constraints: true,
    bootstrap_guard: BootstrapGuard::ObjectIdCheck,
    now_expression: "GETDATE()",
};

static MYSQL: DialectProfile = DialectProfile {
    dialect: Dialect::MySQL,
    default_string_length: Some(255),
    defers_constraints: false,
    supports_logging: false,
    supports_alter_constraints: true,
    bootstrap_guard: BootstrapGuard::IfNotExists,
    now_expression: "CURRENT_TIMESTAMP",
};

static SQLITE: DialectProfile = DialectProfile {
    dialect: Dialect::SQLite,
    default_string_length: None,
    defers_constraints: false,
    supports_logging: false,
    supports_alter_constraints: false,
    bootstrap_guard: BootstrapGuard::IfNotExists,
    now_expression: "CURRENT_TIMESTAMP",
};

impl DialectProfile {
    /// The rule table for a dialect
    pub fn for_dialect(dialect: Dialect) -> &'static DialectProfile {
        match dialect {
            Dialect::PostgreSQL => &POSTGRESQL,
            Dialect::Oracle => &ORACLE,
            Dialect::MsSql => &MSSQL,
            Dialect::MySQL => &MYSQL,
            Dialect::SQLite => &SQLITE,
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Native type for a column, including its parameters
    pub fn render_type(&self, column: &Column) -> String {
        match column.column_type {
            ColumnType::String => {
                let length = column
                    .length
                    .or(self.default_string_length)
                    .unwrap_or_else(|| column.effective_length());
                self.varchar(length)
            }
            ColumnType::Numeric => match self.dialect {
                Dialect::Oracle => "NUMBER".to_string(),
                _ => format!(
                    "NUMERIC({}, {})",
                    column.effective_precision(),
                    column.effective_scale()
                ),
            },
            other => self.scalar_type(other).to_string(),
        }
    }

    /// Variable-length string of the given length
    pub fn varchar(&self, length: u32) -> String {
        match self.dialect {
            Dialect::Oracle => format!("VARCHAR2({} CHAR)", length),
            _ => format!("VARCHAR({})", length),
        }
    }

    /// Type used for the audit timestamp column
    pub fn timestamp_type(&self) -> &'static str {
        self.scalar_type(ColumnType::DateTime)
    }

    /// Spelling of every parameterless type
    fn scalar_type(&self, column_type: ColumnType) -> &'static str {
        use ColumnType::*;
        use Dialect::*;

        match (column_type, self.dialect) {
            (Integer, Oracle) => "NUMBER(10)",
            (Integer, _) => "INTEGER",

            (BigInteger, Oracle) => "NUMBER(19)",
            (BigInteger, _) => "BIGINT",

            (Float, _) => "FLOAT",
            (Date, _) => "DATE",

            (DateTime, PostgreSQL) => "TIMESTAMP WITHOUT TIME ZONE",
            (DateTime, Oracle) => "DATE",
            (DateTime, _) => "DATETIME",

            (Time, PostgreSQL) => "TIME WITHOUT TIME ZONE",
            (Time, Oracle) => "DATE",
            (Time, _) => "TIME",

            (Text, Oracle) => "CLOB",
            (Text, MsSql) => "VARCHAR(max)",
            (Text, _) => "TEXT",

            (Boolean, Oracle) => "SMALLINT",
            (Boolean, MsSql) => "BIT",
            (Boolean, MySQL) => "BOOL",
            (Boolean, _) => "BOOLEAN",

            (Blob, PostgreSQL) => "BYTEA",
            (Blob, MsSql) => "VARBINARY(max)",
            (Blob, _) => "BLOB",

            // Parameterised types are handled by render_type.
            (String, _) => "VARCHAR",
            (Numeric, Oracle) => "NUMBER",
            (Numeric, _) => "NUMERIC",
        }
    }

    // ========================================================================
    // Column defaults
    // ========================================================================

    /// Literal for a `DEFAULT` clause
    pub fn render_default(&self, default: &DefaultValue) -> String {
        match default {
            DefaultValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            DefaultValue::Number(n) => n.clone(),
            DefaultValue::Bool(b) => self.boolean_literal(*b).to_string(),
        }
    }

    /// PostgreSQL and SQLite have boolean literals; the others store 0/1
    fn boolean_literal(&self, value: bool) -> &'static str {
        match (self.dialect, value) {
            (Dialect::PostgreSQL | Dialect::SQLite, true) => "TRUE",
            (Dialect::PostgreSQL | Dialect::SQLite, false) => "FALSE",
            (_, true) => "1",
            (_, false) => "0",
        }
    }

    // ========================================================================
    // Constraints and indexes
    // ========================================================================

    /// Trailing clause for foreign key and unique constraints
    pub fn deferral_clause(&self) -> Option<&'static str> {
        self.defers_constraints
            .then_some("DEFERRABLE INITIALLY DEFERRED")
    }

    /// Statement removing a named constraint
    pub fn drop_constraint(&self, table: &str, kind: ConstraintKind, name: &str) -> String {
        match (self.dialect, kind) {
            (Dialect::MySQL, ConstraintKind::ForeignKey) => {
                format!("ALTER TABLE {} DROP FOREIGN KEY {}", table, name)
            }
            (Dialect::MySQL, ConstraintKind::Unique) => {
                format!("ALTER TABLE {} DROP INDEX {}", table, name)
            }
            (Dialect::MySQL, ConstraintKind::PrimaryKey) => {
                format!("ALTER TABLE {} DROP PRIMARY KEY", table)
            }
            _ => format!("ALTER TABLE {} DROP CONSTRAINT {}", table, name),
        }
    }

    /// Statement removing a named index
    pub fn drop_index(&self, table: &str, name: &str) -> String {
        match self.dialect {
            Dialect::MySQL => format!("DROP INDEX {} ON {}", name, table),
            Dialect::MsSql => format!("DROP INDEX {}.{}", table, name),
            _ => format!("DROP INDEX {}", name),
        }
    }

    // ========================================================================
    // Capability checks
    // ========================================================================

    /// Fail unless constraints can be added or dropped with `ALTER TABLE`
    pub fn require_alter_constraints(&self) -> EngineResult<()> {
        if self.supports_alter_constraints {
            Ok(())
        } else {
            Err(EngineError::unsupported(
                self.dialect.identifier(),
                "ALTER TABLE ADD/DROP CONSTRAINT",
            ))
        }
    }

    /// Fail unless the dialect has a LOGGING/NOLOGGING toggle
    pub fn require_logging(&self) -> EngineResult<()> {
        if self.supports_logging {
            Ok(())
        } else {
            Err(EngineError::unsupported(
                self.dialect.identifier(),
                "LOGGING/NOLOGGING",
            ))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

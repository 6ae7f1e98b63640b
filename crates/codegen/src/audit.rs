//! # Audit Trail
//!
//! Every script records what it did in a `version_history` table. The table
//! is created first, guarded so that re-running a script is harmless, and
//! each non-empty section is preceded by one `INSERT` naming the operation,
//! the model and all versions involved.
//!
//! ```text
//! bootstrap
//! INSERT 'create tables' (+ COMMIT on Oracle)
//! CREATE TABLE ...
//! INSERT 'create constraints' (+ COMMIT on Oracle)
//! ALTER TABLE ...
//! ```

use crate::dialect::{BootstrapGuard, DialectProfile};
use crate::render::RenderedSection;
use ddlgen_core::Dialect;
use serde::{Deserialize, Serialize};

/// Name of the audit table
pub const VERSION_HISTORY_TABLE: &str = "version_history";

/// Who produced a script and from what
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub model: String,
    pub model_version: String,
    /// Version of the service that supplied the schema document
    pub service_version: String,
    /// Version of this generator
    pub generator_version: String,
}

/// Wraps rendered sections with the bootstrap statement and audit rows
#[derive(Debug, Clone)]
pub struct AuditTrailEmitter<'a> {
    profile: &'static DialectProfile,
    info: &'a VersionInfo,
}

impl<'a> AuditTrailEmitter<'a> {
    pub fn new(dialect: Dialect, info: &'a VersionInfo) -> Self {
        Self {
            profile: DialectProfile::for_dialect(dialect),
            info,
        }
    }

    /// Idempotent creation of the `version_history` table
    pub fn bootstrap(&self) -> String {
        let p = self.profile;
        let columns = [
            format!("datetime {} DEFAULT {}", p.timestamp_type(), p.now_expression),
            format!("operation {} NOT NULL", p.varchar(100)),
            format!("model {} NOT NULL", p.varchar(50)),
            format!("model_version {} NOT NULL", p.varchar(50)),
            format!("service_version {} NOT NULL", p.varchar(50)),
            format!("generator_version {} NOT NULL", p.varchar(50)),
        ];
        let body = format!(
            "{} (\n\t{}\n)",
            VERSION_HISTORY_TABLE,
            columns.join(",\n\t")
        );

        match p.bootstrap_guard {
            BootstrapGuard::IfNotExists => format!("CREATE TABLE IF NOT EXISTS {}", body),
            BootstrapGuard::ObjectIdCheck => format!(
                "IF OBJECT_ID(N'{}', N'U') IS NULL CREATE TABLE {}",
                VERSION_HISTORY_TABLE, body
            ),
            // The terminator appended to every statement closes the block.
            BootstrapGuard::IgnoreAlreadyExists => format!(
                "BEGIN\n\tEXECUTE IMMEDIATE '{}';\nEXCEPTION\n\tWHEN OTHERS THEN\n\t\tIF SQLCODE != -955 THEN\n\t\t\tRAISE;\n\t\tEND IF;\nEND",
                format!("CREATE TABLE {}", body).replace('\'', "''")
            ),
        }
    }

    /// Audit row for one operation label, plus `COMMIT` on Oracle
    pub fn entry(&self, label: &str) -> Vec<String> {
        let values = [
            label,
            self.info.model.as_str(),
            self.info.model_version.as_str(),
            self.info.service_version.as_str(),
            self.info.generator_version.as_str(),
        ]
        .iter()
        .map(|v| quote(v))
        .collect::<Vec<_>>()
        .join(", ");

        let mut statements = vec![format!(
            "INSERT INTO {} (operation, model, model_version, service_version, generator_version) VALUES ({})",
            VERSION_HISTORY_TABLE, values
        )];
        if self.profile.dialect == Dialect::Oracle {
            statements.push("COMMIT".to_string());
        }
        statements
    }

    /// Bootstrap first, then each non-empty section behind its audit row
    pub fn wrap(&self, sections: &[RenderedSection]) -> Vec<String> {
        let mut statements = vec![self.bootstrap()];
        for section in sections.iter().filter(|s| !s.is_empty()) {
            statements.extend(self.entry(section.label));
            statements.extend(section.statements.iter().cloned());
        }
        statements
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// ============================================================================
// Tests
// ============================================================================

//! # Script Generator Orchestrator
//!
//! The `Generator` is the top-level entry point for script generation. It
//! takes [`GenerateOptions`], resolves a schema document through a
//! [`SchemaSource`], builds the schema model, renders the requested
//! sections and wraps them in the audit trail.
//!
//! ## Pipeline
//!
//! ```text
//! GenerateOptions + SchemaSource
//!         │
//!         ▼
//!   SchemaSource::resolve()        → SchemaDocument + service version
//!         │
//!         ▼
//!   ddlgen_ir::build_schema()      → Schema (fails fast, no partial output)
//!         │
//!         ▼
//!   DdlRenderer::render_sections() → Vec<RenderedSection>
//!         │
//!         ▼
//!   AuditTrailEmitter::wrap()      → bootstrap + audit rows + statements
//!         │
//!         ▼
//!   GeneratedScript { sections, statements, warnings }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddlgen_codegen::{FileSource, GenerateOptions, Generator};
//! use ddlgen_core::Dialect;
//!
//! let source = FileSource::new("./schemata", "1.0.0");
//! let options = GenerateOptions::new("omop", "5.0.0", Dialect::PostgreSQL);
//!
//! let script = Generator::new(options).generate(&source)?;
//! print!("{}", script.text());
//! ```

use ddlgen_core::{Dialect, EngineResult};
use ddlgen_ir::{Schema, SchemaDocument, build_schema};

use crate::audit::{AuditTrailEmitter, VersionInfo};
use crate::render::{DdlRenderer, Element, Operation};
use crate::source::SchemaSource;
use crate::{GenerateOptions, GeneratedScript};

// ============================================================================
// Generator
// ============================================================================

/// Top-level script generator.
///
/// Stateless aside from its options; every call builds and discards its own
/// schema model, so one generator can serve any number of calls.
#[derive(Debug, Clone)]
pub struct Generator {
    options: GenerateOptions,
}

impl Generator {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    // ====================================================================
    // Generation
    // ====================================================================

    /// Resolve the configured model version from `source` and render it.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if the source cannot resolve the model,
    /// the document does not build into a valid schema, or the mode flags
    /// conflict. Nothing is rendered in any of these cases.
    pub fn generate(&self, source: &dyn SchemaSource) -> EngineResult<GeneratedScript> {
        let resolved = source.resolve(&self.options.model, &self.options.model_version)?;
        self.generate_from_document(&resolved.document, &resolved.service_version)
    }

    /// Render an already fetched document
    pub fn generate_from_document(
        &self,
        document: &SchemaDocument,
        service_version: &str,
    ) -> EngineResult<GeneratedScript> {
        let schema = build_schema(document)?;
        self.generate_from_schema(&schema, service_version)
    }

    /// Render a built schema model
    pub fn generate_from_schema(
        &self,
        schema: &Schema,
        service_version: &str,
    ) -> EngineResult<GeneratedScript> {
        let opts = &self.options;

        // ── 1. Resolve mode ──────────────────────────────────────────────
        let operation = opts.operation()?;

        // ── 2. Collect warnings ──────────────────────────────────────────
        let mut warnings: Vec<String> = Vec::new();

        for table in schema.tables.iter().filter(|t| t.columns.is_empty()) {
            warnings.push(format!("Table '{}' has no columns.", table.name));
        }

        let renderer = DdlRenderer::new(schema, opts.dialect);
        let profile = renderer.profile();

        if matches!(
            operation,
            Operation::EnableLogging | Operation::DisableLogging
        ) && profile.require_logging().is_err()
        {
            warnings.push(format!(
                "{} has no LOGGING/NOLOGGING toggle; no logging statements were generated.",
                opts.dialect.display_name()
            ));
        }

        if matches!(operation, Operation::Create | Operation::Drop)
            && opts.elements.constraints
            && profile.require_alter_constraints().is_err()
        {
            warnings.push(format!(
                "{} cannot alter table constraints; the constraint section is empty.",
                opts.dialect.display_name()
            ));
        }

        // ── 3. Render sections ───────────────────────────────────────────
        let sections = renderer.render_sections(operation, opts.elements);

        // ── 4. Wrap in audit trail ───────────────────────────────────────
        let info = VersionInfo {
            model: opts.model.clone(),
            model_version: opts.model_version.clone(),
            service_version: opts
                .service_version
                .clone()
                .unwrap_or_else(|| service_version.to_string()),
            generator_version: opts.generator_version.clone(),
        };
        let statements = AuditTrailEmitter::new(opts.dialect, &info).wrap(&sections);

        // ── 5. Assemble output ───────────────────────────────────────────
        let script = GeneratedScript {
            dialect: opts.dialect,
            operation,
            info,
            sections,
            statements,
            warnings,
        };

        tracing::info!(
            model = %opts.model,
            version = %opts.model_version,
            dialect = opts.dialect.identifier(),
            operation = %operation,
            statements = script.statement_count(),
            warnings = script.warnings.len(),
            "script generation complete",
        );

        Ok(script)
    }
}

// ============================================================================
// Standalone convenience function
// ============================================================================

/// Generate a script for `options` from `source`.
///
/// Shorthand for `Generator::new(options).generate(source)`.
pub fn generate(options: GenerateOptions, source: &dyn SchemaSource) -> EngineResult<GeneratedScript> {
    Generator::new(options).generate(source)
}

// ============================================================================
// ScriptSummary
// ============================================================================

/// A human-readable summary of a generated script.
///
/// Use [`summarize`] to produce a `ScriptSummary` from a `GeneratedScript`.
#[derive(Debug, Clone)]
pub struct ScriptSummary {
    pub model: String,
    pub model_version: String,
    pub dialect: Dialect,
    pub operation: Operation,
    /// All statements, audit rows included
    pub total_statements: usize,
    pub table_statements: usize,
    pub constraint_statements: usize,
    pub index_statements: usize,
    /// Bootstrap, audit inserts and commits
    pub audit_statements: usize,
    pub warning_count: usize,
    pub total_bytes: usize,
}

impl ScriptSummary {
    /// Build a summary from a generated script.
    pub fn from_script(script: &GeneratedScript) -> Self {
        let table_statements = script.count_for(Element::Tables);
        let constraint_statements = script.count_for(Element::Constraints);
        let index_statements = script.count_for(Element::Indexes);
        let section_statements = table_statements + constraint_statements + index_statements;

        Self {
            model: script.info.model.clone(),
            model_version: script.info.model_version.clone(),
            dialect: script.dialect,
            operation: script.operation,
            total_statements: script.statement_count(),
            table_statements,
            constraint_statements,
            index_statements,
            audit_statements: script.statement_count().saturating_sub(section_statements),
            warning_count: script.warnings.len(),
            total_bytes: script.text().len(),
        }
    }

    /// Format the summary as a boxed report.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(512);

        out.push_str("╔══════════════════════════════════════════════════╗\n");
        out.push_str("║         Script Generation Complete               ║\n");
        out.push_str("╠══════════════════════════════════════════════════╣\n");
        out.push_str(&format!(
            "║  Model:       {:<35}║\n",
            format!("{} {}", self.model, self.model_version)
        ));
        out.push_str(&format!("║  Dialect:     {:<35}║\n", self.dialect.display_name()));
        out.push_str(&format!("║  Operation:   {:<35}║\n", self.operation.as_str()));
        out.push_str(&format!("║  Statements:  {:<35}║\n", self.total_statements));
        out.push_str(&format!("║    Tables:    {:<35}║\n", self.table_statements));
        out.push_str(&format!("║    Constr.:   {:<35}║\n", self.constraint_statements));
        out.push_str(&format!("║    Indexes:   {:<35}║\n", self.index_statements));
        out.push_str(&format!("║    Audit:     {:<35}║\n", self.audit_statements));
        out.push_str(&format!("║  Warnings:    {:<35}║\n", self.warning_count));

        let size_str = if self.total_bytes < 1024 {
            format!("{} B", self.total_bytes)
        } else {
            format!("{:.1} KB", self.total_bytes as f64 / 1024.0)
        };
        out.push_str(&format!("║  Total Size:  {:<35}║\n", size_str));
        out.push_str("╚══════════════════════════════════════════════════╝\n");

        out
    }
}

impl std::fmt::Display for ScriptSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Produce a [`ScriptSummary`] from a [`GeneratedScript`].
pub fn summarize(script: &GeneratedScript) -> ScriptSummary {
    ScriptSummary::from_script(script)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ElementFlags;
    use crate::source::StaticSource;
    use ddlgen_core::EngineError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Helper: t1(pk id, name not null), t2(id fk → t1.id, unique(id)).
    fn scenario() -> SchemaDocument {
        SchemaDocument::from_value(json!({
            "tables": [
                {"name": "t1", "fields": [
                    {"name": "id", "type": "integer"},
                    {"name": "name", "type": "string"}
                ]},
                {"name": "t2", "fields": [
                    {"name": "id", "type": "integer"}
                ]}
            ],
            "schema": {
                "constraints": {
                    "not_null": [{"table": "t1", "field": "name"}],
                    "primary_keys": [{"table": "t1", "fields": ["id"]}],
                    "foreign_keys": [{
                        "source_table": "t2", "source_field": "id",
                        "target_table": "t1", "target_field": "id"
                    }],
                    "uniques": [{"table": "t2", "fields": ["id"]}]
                },
                "indexes": null
            }
        }))
        .unwrap()
    }

    fn source() -> StaticSource {
        StaticSource::new("1.2.0").with_document("demo", "1.0.0", scenario())
    }

    fn options(dialect: Dialect) -> GenerateOptions {
        GenerateOptions::new("demo", "1.0.0", dialect).with_generator_version("0.1.0")
    }

    // ── End to end ───────────────────────────────────────────────────────

    #[test]
    fn test_postgresql_end_to_end() {
        let script = generate(options(Dialect::PostgreSQL), &source()).unwrap();
        let audit = |label: &str| {
            format!(
                "INSERT INTO version_history (operation, model, model_version, service_version, generator_version) \
                 VALUES ('{}', 'demo', '1.0.0', '1.2.0', '0.1.0');\n\n",
                label
            )
        };

        let expected = [
            "CREATE TABLE IF NOT EXISTS version_history (\n\
             \tdatetime TIMESTAMP WITHOUT TIME ZONE DEFAULT now(),\n\
             \toperation VARCHAR(100) NOT NULL,\n\
             \tmodel VARCHAR(50) NOT NULL,\n\
             \tmodel_version VARCHAR(50) NOT NULL,\n\
             \tservice_version VARCHAR(50) NOT NULL,\n\
             \tgenerator_version VARCHAR(50) NOT NULL\n\
             );\n\n"
                .to_string(),
            audit("create tables"),
            "CREATE TABLE t1 (\n\tid INTEGER NOT NULL,\n\tname VARCHAR(256) NOT NULL,\n\tPRIMARY KEY (id)\n);\n\n".to_string(),
            "CREATE TABLE t2 (\n\tid INTEGER\n);\n\n".to_string(),
            audit("create constraints"),
            "ALTER TABLE t2 ADD CONSTRAINT fk_t2_id_t1 FOREIGN KEY (id) REFERENCES t1 (id) DEFERRABLE INITIALLY DEFERRED;\n\n".to_string(),
            "ALTER TABLE t2 ADD CONSTRAINT uq_t2_id UNIQUE (id) DEFERRABLE INITIALLY DEFERRED;\n\n".to_string(),
        ]
        .concat();

        assert_eq!(script.text(), expected);
        assert!(!script.has_warnings());
    }

    #[test]
    fn test_one_create_table_per_table() {
        let opts = options(Dialect::MySQL).with_elements(ElementFlags::tables_only());
        let script = generate(opts, &source()).unwrap();
        let text = script.text();
        assert_eq!(text.matches("CREATE TABLE t").count(), 2);
        assert_eq!(script.count_for(Element::Tables), 2);
        for statement in text.split_terminator(";\n\n") {
            assert!(!statement.trim().is_empty());
        }
    }

    #[test]
    fn test_output_is_deterministic() {
        let first = generate(options(Dialect::MsSql), &source()).unwrap().text();
        for _ in 0..3 {
            assert_eq!(generate(options(Dialect::MsSql), &source()).unwrap().text(), first);
        }
    }

    #[test]
    fn test_drop_create_symmetry() {
        let create = generate(options(Dialect::Oracle), &source()).unwrap();
        let drop = generate(options(Dialect::Oracle).with_drop(), &source()).unwrap();

        assert_eq!(drop.operation, Operation::Drop);
        for element in [Element::Tables, Element::Constraints, Element::Indexes] {
            assert_eq!(create.count_for(element), drop.count_for(element));
        }
        let text = drop.text();
        assert_eq!(
            text.matches("DROP CONSTRAINT").count(),
            create.text().matches("ADD CONSTRAINT").count()
        );
    }

    // ── Dialect rules ────────────────────────────────────────────────────

    #[test]
    fn test_oracle_script() {
        let script = generate(options(Dialect::Oracle), &source()).unwrap();
        let text = script.text();

        assert!(text.starts_with("BEGIN\n\tEXECUTE IMMEDIATE 'CREATE TABLE version_history"));
        assert!(text.contains("\tid NUMBER(10) NOT NULL"));
        assert!(text.contains("\tname VARCHAR2(255 CHAR) NOT NULL"));
        assert!(text.contains("REFERENCES t1 (id) DEFERRABLE INITIALLY DEFERRED;\n\n"));
        assert!(text.contains("UNIQUE (id) DEFERRABLE INITIALLY DEFERRED;\n\n"));
        // One COMMIT per audit row: tables and constraints.
        assert_eq!(text.matches("COMMIT;\n\n").count(), 2);
    }

    #[test]
    fn test_sqlite_constraints_empty_without_error() {
        let script = generate(options(Dialect::SQLite), &source()).unwrap();
        assert!(script.section("create constraints").unwrap().is_empty());
        assert!(!script.text().contains("'create constraints'"));
        assert!(!script.text().contains("ALTER TABLE"));
        assert!(script.has_warnings());
    }

    #[test]
    fn test_logging_on_postgresql_is_empty() {
        let script = generate(options(Dialect::PostgreSQL).with_logging(), &source()).unwrap();
        assert_eq!(script.operation, Operation::EnableLogging);
        assert_eq!(script.statement_count(), 1, "bootstrap only");
        assert!(script.has_warnings());
    }

    #[test]
    fn test_oracle_nologging_skips_constraints() {
        let script = generate(options(Dialect::Oracle).with_nologging(), &source()).unwrap();
        let text = script.text();
        assert!(text.contains("ALTER TABLE t1 NOLOGGING;\n\n"));
        assert!(text.contains("'table nologging'"));
        assert!(!text.contains("CONSTRAINT"));
    }

    #[test]
    fn test_delete_data_short_circuits() {
        let opts = options(Dialect::PostgreSQL)
            .with_drop()
            .with_logging()
            .with_delete_data();
        let script = generate(opts, &source()).unwrap();
        let deletes: Vec<_> = script
            .statements
            .iter()
            .filter(|s| s.starts_with("DELETE"))
            .collect();
        assert_eq!(deletes, vec!["DELETE FROM t2", "DELETE FROM t1"]);
        assert!(!script.text().contains("DROP"));
    }

    // ── Errors ───────────────────────────────────────────────────────────

    #[test]
    fn test_model_errors_abort() {
        let mut document = scenario();
        document.tables[0].fields[1].type_name = "geometry".into();
        let err = Generator::new(options(Dialect::PostgreSQL))
            .generate_from_document(&document, "1")
            .unwrap_err();
        assert!(err.is_model_error());
    }

    #[test]
    fn test_missing_model() {
        let err = generate(
            GenerateOptions::new("nope", "1", Dialect::SQLite),
            &source(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::ModelNotFound { .. }));
    }

    #[test]
    fn test_conflicting_modes() {
        let opts = options(Dialect::Oracle).with_logging().with_nologging();
        assert!(matches!(
            generate(opts, &source()).unwrap_err(),
            EngineError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_service_version_override() {
        let opts = options(Dialect::SQLite).with_service_version("9.9.9");
        let script = generate(opts, &source()).unwrap();
        assert_eq!(script.info.service_version, "9.9.9");
    }

    // ── Summary ──────────────────────────────────────────────────────────

    #[test]
    fn test_summary() {
        let script = generate(options(Dialect::PostgreSQL), &source()).unwrap();
        let summary = summarize(&script);

        assert_eq!(summary.table_statements, 2);
        assert_eq!(summary.constraint_statements, 2);
        assert_eq!(summary.index_statements, 0);
        // Bootstrap plus two audit rows.
        assert_eq!(summary.audit_statements, 3);
        assert_eq!(summary.total_statements, 7);
        assert!(summary.display().contains("PostgreSQL"));
    }
}

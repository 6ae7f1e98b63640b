//! # DDL Renderer
//!
//! Turns a [`Schema`] into ordered statement text for one operation on one
//! dialect. Statements are returned without terminators; the script
//! assembler trims each one and appends `;\n\n`.
//!
//! Output is grouped into [`RenderedSection`]s, one per logical operation
//! ("create tables", "drop indexes", ...), so an audit row can be placed in
//! front of each. Every section honours its own element flag; a section the
//! dialect cannot express comes back empty rather than as an error.

use crate::dialect::DialectProfile;
use crate::order::TableOrder;
use ddlgen_core::Dialect;
use ddlgen_ir::{Constraint, Index, Schema, Table};
use serde::{Deserialize, Serialize};

// ============================================================================
// Operation / ElementFlags
// ============================================================================

/// What a script does to the selected elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    #[default]
    Create,
    Drop,
    DeleteData,
    EnableLogging,
    DisableLogging,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Drop => "drop",
            Operation::DeleteData => "delete-data",
            Operation::EnableLogging => "logging",
            Operation::DisableLogging => "nologging",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which kinds of schema element a script covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFlags {
    pub tables: bool,
    pub constraints: bool,
    pub indexes: bool,
}

impl ElementFlags {
    /// Tables, constraints and indexes
    pub fn all() -> Self {
        Self {
            tables: true,
            constraints: true,
            indexes: true,
        }
    }

    pub fn none() -> Self {
        Self {
            tables: false,
            constraints: false,
            indexes: false,
        }
    }

    pub fn tables_only() -> Self {
        Self {
            tables: true,
            ..Self::none()
        }
    }

    /// No flag set means "everything"
    pub fn or_all(self) -> Self {
        if self.is_empty() { Self::all() } else { self }
    }

    pub fn is_empty(&self) -> bool {
        !(self.tables || self.constraints || self.indexes)
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::all()
    }
}

// ============================================================================
// RenderedSection
// ============================================================================

/// Schema element a section's statements act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Tables,
    Constraints,
    Indexes,
}

/// Statements of one logical operation, in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSection {
    /// Audit label, e.g. `create tables`
    pub label: &'static str,
    pub element: Element,
    pub statements: Vec<String>,
}

impl RenderedSection {
    fn new(label: &'static str, element: Element, statements: Vec<String>) -> Self {
        Self {
            label,
            element,
            statements,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }
}

// ============================================================================
// Naming
// ============================================================================

/// Explicit constraint name, or `fk_<table>_<cols>_<target>` /
/// `uq_<table>_<cols>` / `pk_<table>_<cols>`
pub fn constraint_name(table: &Table, constraint: &Constraint) -> String {
    constraint.resolved_name(&table.name)
}

/// Explicit index name, or `idx_<table>_<cols>`
pub fn index_name(table: &Table, index: &Index) -> String {
    index.resolved_name(&table.name)
}

// ============================================================================
// DdlRenderer
// ============================================================================

/// Renders one schema for one dialect
#[derive(Debug)]
pub struct DdlRenderer<'a> {
    schema: &'a Schema,
    profile: &'static DialectProfile,
    order: TableOrder,
}

impl<'a> DdlRenderer<'a> {
    pub fn new(schema: &'a Schema, dialect: Dialect) -> Self {
        Self {
            schema,
            profile: DialectProfile::for_dialect(dialect),
            order: TableOrder::new(schema),
        }
    }

    pub fn profile(&self) -> &'static DialectProfile {
        self.profile
    }

    pub fn order(&self) -> &TableOrder {
        &self.order
    }

    /// All statements for an operation, flattened in section order
    pub fn render(&self, operation: Operation, flags: ElementFlags) -> Vec<String> {
        self.render_sections(operation, flags)
            .into_iter()
            .flat_map(|s| s.statements)
            .collect()
    }

    /// Statements for an operation, grouped per logical operation.
    ///
    /// Only sections selected by `flags` are returned; they may be empty.
    /// `DeleteData` ignores the flags.
    pub fn render_sections(&self, operation: Operation, flags: ElementFlags) -> Vec<RenderedSection> {
        let mut sections = Vec::new();

        match operation {
            Operation::Create => {
                if flags.tables {
                    sections.push(RenderedSection::new(
                        "create tables",
                        Element::Tables,
                        self.create_tables(),
                    ));
                }
                if flags.constraints {
                    sections.push(RenderedSection::new(
                        "create constraints",
                        Element::Constraints,
                        self.create_constraints(),
                    ));
                }
                if flags.indexes {
                    sections.push(RenderedSection::new(
                        "create indexes",
                        Element::Indexes,
                        self.create_indexes(),
                    ));
                }
            }
            Operation::Drop => {
                if flags.indexes {
                    sections.push(RenderedSection::new(
                        "drop indexes",
                        Element::Indexes,
                        self.drop_indexes(),
                    ));
                }
                if flags.constraints {
                    sections.push(RenderedSection::new(
                        "drop constraints",
                        Element::Constraints,
                        self.drop_constraints(),
                    ));
                }
                if flags.tables {
                    sections.push(RenderedSection::new(
                        "drop tables",
                        Element::Tables,
                        self.drop_tables(),
                    ));
                }
            }
            Operation::DeleteData => {
                sections.push(RenderedSection::new(
                    "delete data",
                    Element::Tables,
                    self.delete_data(),
                ));
            }
            Operation::EnableLogging | Operation::DisableLogging => {
                let enable = operation == Operation::EnableLogging;
                if flags.tables {
                    sections.push(RenderedSection::new(
                        if enable { "table logging" } else { "table nologging" },
                        Element::Tables,
                        self.table_logging(enable),
                    ));
                }
                if flags.indexes {
                    sections.push(RenderedSection::new(
                        if enable { "index logging" } else { "index nologging" },
                        Element::Indexes,
                        self.index_logging(enable),
                    ));
                }
            }
        }

        for section in &sections {
            tracing::debug!(
                section = section.label,
                statements = section.len(),
                dialect = %self.profile.dialect.identifier(),
                "rendered section"
            );
        }

        sections
    }

    // ========================================================================
    // Iteration helpers
    // ========================================================================

    fn tables_in<'n>(&'n self, names: &'n [String]) -> impl Iterator<Item = &'a Table> + 'n {
        names.iter().filter_map(|name| self.schema.table(name))
    }

    /// `(name, constraint)` pairs for one table's ALTER-style constraints,
    /// ascending by name
    fn sorted_constraints(table: &'a Table) -> Vec<(String, &'a Constraint)> {
        let mut named: Vec<_> = table
            .alter_constraints()
            .map(|c| (constraint_name(table, c), c))
            .collect();
        named.sort_by(|a, b| a.0.cmp(&b.0));
        named
    }

    /// `(name, index)` pairs for one table's indexes, ascending by name
    fn sorted_indexes(table: &'a Table) -> Vec<(String, &'a Index)> {
        let mut named: Vec<_> = table
            .indexes
            .iter()
            .filter(|i| !i.columns.is_empty())
            .map(|i| (index_name(table, i), i))
            .collect();
        named.sort_by(|a, b| a.0.cmp(&b.0));
        named
    }

    // ========================================================================
    // Create
    // ========================================================================

    fn create_tables(&self) -> Vec<String> {
        self.tables_in(self.order.creation_order())
            .map(|t| self.create_table(t))
            .collect()
    }

    /// `CREATE TABLE` with columns and the inline primary key
    pub fn create_table(&self, table: &Table) -> String {
        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                let mut line = format!("{} {}", column.name, self.profile.render_type(column));
                if let Some(default) = &column.default {
                    line.push_str(" DEFAULT ");
                    line.push_str(&self.profile.render_default(default));
                }
                if !column.nullable || table.is_primary_key_column(&column.name) {
                    line.push_str(" NOT NULL");
                }
                line
            })
            .collect();

        if let Some(pk) = table.primary_key() {
            let mut line = String::new();
            if let Some(name) = pk.name() {
                line.push_str(&format!("CONSTRAINT {} ", name));
            }
            line.push_str(&format!("PRIMARY KEY ({})", pk.columns().join(", ")));
            lines.push(line);
        }

        if lines.is_empty() {
            return format!("CREATE TABLE {} (\n)", table.name);
        }

        format!("CREATE TABLE {} (\n\t{}\n)", table.name, lines.join(",\n\t"))
    }

    fn create_constraints(&self) -> Vec<String> {
        if !self.profile.supports_alter_constraints {
            tracing::debug!(
                dialect = self.profile.dialect.identifier(),
                "dialect cannot alter constraints, skipping"
            );
            return Vec::new();
        }

        let mut statements = Vec::new();
        for table in self.tables_in(self.order.creation_order()) {
            for (name, constraint) in Self::sorted_constraints(table) {
                statements.push(self.add_constraint(table, &name, constraint));
            }
        }
        statements
    }

    fn add_constraint(&self, table: &Table, name: &str, constraint: &Constraint) -> String {
        let mut statement = format!("ALTER TABLE {} ADD CONSTRAINT {} ", table.name, name);
        let deferred = match constraint {
            Constraint::ForeignKey {
                source_columns,
                target_table,
                target_columns,
                deferred,
                ..
            } => {
                statement.push_str(&format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    source_columns.join(", "),
                    target_table,
                    target_columns.join(", ")
                ));
                *deferred
            }
            Constraint::Unique { columns, .. } => {
                statement.push_str(&format!("UNIQUE ({})", columns.join(", ")));
                true
            }
            Constraint::PrimaryKey { columns, .. } => {
                statement.push_str(&format!("PRIMARY KEY ({})", columns.join(", ")));
                false
            }
        };

        if let Some(clause) = self.profile.deferral_clause().filter(|_| deferred) {
            statement.push(' ');
            statement.push_str(clause);
        }
        statement
    }

    fn create_indexes(&self) -> Vec<String> {
        let mut statements = Vec::new();
        for table in self.tables_in(self.order.creation_order()) {
            for (name, index) in Self::sorted_indexes(table) {
                statements.push(format!(
                    "CREATE INDEX {} ON {} ({})",
                    name,
                    table.name,
                    index.columns.join(", ")
                ));
            }
        }
        statements
    }

    // ========================================================================
    // Drop
    // ========================================================================

    fn drop_tables(&self) -> Vec<String> {
        let order = self.order.drop_order();
        self.tables_in(&order)
            .map(|t| format!("DROP TABLE {}", t.name))
            .collect()
    }

    fn drop_constraints(&self) -> Vec<String> {
        if !self.profile.supports_alter_constraints {
            tracing::debug!(
                dialect = self.profile.dialect.identifier(),
                "dialect cannot alter constraints, skipping"
            );
            return Vec::new();
        }

        let order = self.order.drop_order();
        let mut statements = Vec::new();
        for table in self.tables_in(&order) {
            for (name, constraint) in Self::sorted_constraints(table).into_iter().rev() {
                statements.push(self.profile.drop_constraint(&table.name, constraint.kind(), &name));
            }
        }
        statements
    }

    fn drop_indexes(&self) -> Vec<String> {
        let order = self.order.drop_order();
        let mut statements = Vec::new();
        for table in self.tables_in(&order) {
            for (name, _) in Self::sorted_indexes(table).into_iter().rev() {
                statements.push(self.profile.drop_index(&table.name, &name));
            }
        }
        statements
    }

    // ========================================================================
    // Data and logging
    // ========================================================================

    fn delete_data(&self) -> Vec<String> {
        let order = self.order.delete_order();
        self.tables_in(&order)
            .map(|t| format!("DELETE FROM {}", t.name))
            .collect()
    }

    fn logging_keyword(enable: bool) -> &'static str {
        if enable { "LOGGING" } else { "NOLOGGING" }
    }

    fn table_logging(&self, enable: bool) -> Vec<String> {
        if !self.profile.supports_logging {
            return Vec::new();
        }
        self.tables_in(self.order.creation_order())
            .map(|t| format!("ALTER TABLE {} {}", t.name, Self::logging_keyword(enable)))
            .collect()
    }

    fn index_logging(&self, enable: bool) -> Vec<String> {
        if !self.profile.supports_logging {
            return Vec::new();
        }
        let mut statements = Vec::new();
        for table in self.tables_in(self.order.creation_order()) {
            for (name, _) in Self::sorted_indexes(table) {
                statements.push(format!("ALTER INDEX {} {}", name, Self::logging_keyword(enable)));
            }
        }
        statements
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ddlgen_ir::{Column, ColumnType, DefaultValue};
    use pretty_assertions::assert_eq;

    fn sample() -> Schema {
        let t1 = Table::new("t1")
            .with_column(Column::new("id", ColumnType::Integer))
            .with_column(Column::new("name", ColumnType::String).not_null())
            .with_constraint(Constraint::primary_key(None, vec!["id".into()]))
            .with_index(Index::new(None, vec!["name".into()]));
        let t2 = Table::new("t2")
            .with_column(Column::new("id", ColumnType::Integer))
            .with_constraint(Constraint::foreign_key(
                None,
                vec!["id".into()],
                "t1",
                vec!["id".into()],
            ))
            .with_constraint(Constraint::unique(None, vec!["id".into()]));
        Schema {
            tables: vec![t2, t1],
        }
    }

    #[test]
    fn test_create_table_text() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::PostgreSQL);
        let statements = renderer.render(Operation::Create, ElementFlags::tables_only());
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE t1 (\n\tid INTEGER NOT NULL,\n\tname VARCHAR(256) NOT NULL,\n\tPRIMARY KEY (id)\n)",
                "CREATE TABLE t2 (\n\tid INTEGER\n)",
            ]
        );
    }

    #[test]
    fn test_named_primary_key_and_default() {
        let table = Table::new("person")
            .with_column(
                Column::new("kind", ColumnType::String)
                    .with_length(10)
                    .with_default(DefaultValue::Text("adult".into())),
            )
            .with_constraint(Constraint::primary_key(
                Some("person_pk".into()),
                vec!["kind".into()],
            ));
        let schema = Schema {
            tables: vec![table],
        };
        let renderer = DdlRenderer::new(&schema, Dialect::Oracle);
        assert_eq!(
            renderer.create_table(&schema.tables[0]),
            "CREATE TABLE person (\n\tkind VARCHAR2(10 CHAR) DEFAULT 'adult' NOT NULL,\n\tCONSTRAINT person_pk PRIMARY KEY (kind)\n)"
        );
    }

    #[test]
    fn test_create_constraints_postgresql() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::PostgreSQL);
        let flags = ElementFlags {
            constraints: true,
            ..ElementFlags::none()
        };
        assert_eq!(
            renderer.render(Operation::Create, flags),
            vec![
                "ALTER TABLE t2 ADD CONSTRAINT fk_t2_id_t1 FOREIGN KEY (id) REFERENCES t1 (id) DEFERRABLE INITIALLY DEFERRED",
                "ALTER TABLE t2 ADD CONSTRAINT uq_t2_id UNIQUE (id) DEFERRABLE INITIALLY DEFERRED",
            ]
        );
    }

    #[test]
    fn test_constraints_not_deferred_on_mysql() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::MySQL);
        let flags = ElementFlags {
            constraints: true,
            ..ElementFlags::none()
        };
        let statements = renderer.render(Operation::Create, flags);
        assert_eq!(statements.len(), 2);
        assert!(statements.iter().all(|s| !s.contains("DEFERRABLE")));
    }

    #[test]
    fn test_sqlite_constraints_empty() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::SQLite);
        let sections = renderer.render_sections(Operation::Create, ElementFlags::all());
        let constraints = sections
            .iter()
            .find(|s| s.element == Element::Constraints)
            .unwrap();
        assert!(constraints.is_empty());
        assert!(renderer.render(Operation::Drop, ElementFlags { constraints: true, ..ElementFlags::none() }).is_empty());
    }

    #[test]
    fn test_create_indexes() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::PostgreSQL);
        let flags = ElementFlags {
            indexes: true,
            ..ElementFlags::none()
        };
        assert_eq!(
            renderer.render(Operation::Create, flags),
            vec!["CREATE INDEX idx_t1_name ON t1 (name)"]
        );
    }

    #[test]
    fn test_drop_section_order_and_symmetry() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::PostgreSQL);

        let drop = renderer.render_sections(Operation::Drop, ElementFlags::all());
        let labels: Vec<_> = drop.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["drop indexes", "drop constraints", "drop tables"]);

        let create = renderer.render_sections(Operation::Create, ElementFlags::all());
        for element in [Element::Tables, Element::Constraints, Element::Indexes] {
            let count = |sections: &[RenderedSection]| {
                sections
                    .iter()
                    .filter(|s| s.element == element)
                    .map(|s| s.len())
                    .sum::<usize>()
            };
            assert_eq!(count(&drop), count(&create), "{:?}", element);
        }

        assert_eq!(
            renderer.render(Operation::Drop, ElementFlags::all()),
            vec![
                "DROP INDEX idx_t1_name",
                "ALTER TABLE t2 DROP CONSTRAINT uq_t2_id",
                "ALTER TABLE t2 DROP CONSTRAINT fk_t2_id_t1",
                "DROP TABLE t2",
                "DROP TABLE t1",
            ]
        );
    }

    #[test]
    fn test_delete_data_children_first() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::PostgreSQL);
        assert_eq!(
            renderer.render(Operation::DeleteData, ElementFlags::none()),
            vec!["DELETE FROM t2", "DELETE FROM t1"]
        );
    }

    #[test]
    fn test_oracle_logging() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::Oracle);
        let sections = renderer.render_sections(Operation::DisableLogging, ElementFlags::all());
        let labels: Vec<_> = sections.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["table nologging", "index nologging"]);
        assert_eq!(
            renderer.render(Operation::DisableLogging, ElementFlags::all()),
            vec![
                "ALTER TABLE t1 NOLOGGING",
                "ALTER TABLE t2 NOLOGGING",
                "ALTER INDEX idx_t1_name NOLOGGING",
            ]
        );
    }

    #[test]
    fn test_oracle_enable_logging() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::Oracle);
        let sections = renderer.render_sections(Operation::EnableLogging, ElementFlags::all());
        let labels: Vec<_> = sections.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["table logging", "index logging"]);
        assert_eq!(
            renderer.render(Operation::EnableLogging, ElementFlags::all()),
            vec![
                "ALTER TABLE t1 LOGGING",
                "ALTER TABLE t2 LOGGING",
                "ALTER INDEX idx_t1_name LOGGING",
            ]
        );
    }

    #[test]
    fn test_boolean_default_per_dialect() {
        let schema = Schema {
            tables: vec![Table::new("t").with_column(
                Column::new("flag", ColumnType::Boolean).with_default(DefaultValue::Bool(true)),
            )],
        };
        assert_eq!(
            DdlRenderer::new(&schema, Dialect::PostgreSQL).create_table(&schema.tables[0]),
            "CREATE TABLE t (\n\tflag BOOLEAN DEFAULT TRUE\n)"
        );
        assert_eq!(
            DdlRenderer::new(&schema, Dialect::MsSql).create_table(&schema.tables[0]),
            "CREATE TABLE t (\n\tflag BIT DEFAULT 1\n)"
        );
    }

    #[test]
    fn test_logging_is_noop_elsewhere() {
        let schema = sample();
        for dialect in [Dialect::PostgreSQL, Dialect::MsSql, Dialect::MySQL, Dialect::SQLite] {
            let renderer = DdlRenderer::new(&schema, dialect);
            assert!(renderer.render(Operation::EnableLogging, ElementFlags::all()).is_empty());
        }
    }

    #[test]
    fn test_flags_off_yield_nothing() {
        let schema = sample();
        let renderer = DdlRenderer::new(&schema, Dialect::PostgreSQL);
        assert!(renderer.render_sections(Operation::Create, ElementFlags::none()).is_empty());
        assert!(renderer.render(Operation::Drop, ElementFlags::none()).is_empty());
    }

    #[test]
    fn test_flags_or_all() {
        assert_eq!(ElementFlags::none().or_all(), ElementFlags::all());
        assert_eq!(ElementFlags::tables_only().or_all(), ElementFlags::tables_only());
    }

    #[test]
    fn test_explicit_names_sort_constraints() {
        let table = Table::new("t")
            .with_column(Column::new("a", ColumnType::Integer))
            .with_column(Column::new("b", ColumnType::Integer))
            .with_constraint(Constraint::unique(Some("z_unique".into()), vec!["a".into()]))
            .with_constraint(Constraint::unique(Some("a_unique".into()), vec!["b".into()]));
        let schema = Schema {
            tables: vec![table],
        };
        let renderer = DdlRenderer::new(&schema, Dialect::MsSql);
        let flags = ElementFlags {
            constraints: true,
            ..ElementFlags::none()
        };
        assert_eq!(
            renderer.render(Operation::Create, flags),
            vec![
                "ALTER TABLE t ADD CONSTRAINT a_unique UNIQUE (b)",
                "ALTER TABLE t ADD CONSTRAINT z_unique UNIQUE (a)",
            ]
        );
    }
}

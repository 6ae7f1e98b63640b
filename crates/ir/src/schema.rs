//! Schema model
//!
//! The in-memory graph of tables, columns, constraints and indexes built
//! from a [`crate::SchemaDocument`]. A `Schema` lives for one generation
//! request and is never shared or persisted.

use ddlgen_core::ColumnType;
use serde::{Deserialize, Serialize};

/// Length given to string columns that do not declare one
pub const DEFAULT_STRING_LENGTH: u32 = 256;

/// Precision given to numeric columns that do not declare one
pub const DEFAULT_NUMERIC_PRECISION: u32 = 20;

/// Scale given to numeric columns that do not declare one
pub const DEFAULT_NUMERIC_SCALE: u32 = 5;

// ============================================================================
// Schema
// ============================================================================

/// A complete relational schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Tables in document order
    pub tables: Vec<Table>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a table by exact name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Get a mutable table by exact name
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    /// Number of tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Table names in document order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Every foreign key as a `(child, parent)` table pair.
    ///
    /// The child holds the foreign key; the parent is the referenced table.
    pub fn foreign_key_edges(&self) -> Vec<(&str, &str)> {
        self.tables
            .iter()
            .flat_map(|t| {
                t.foreign_keys()
                    .filter_map(move |c| c.target_table().map(|target| (t.name.as_str(), target)))
            })
            .collect()
    }

    /// Total number of indexes across all tables
    pub fn index_count(&self) -> usize {
        self.tables.iter().map(|t| t.indexes.len()).sum()
    }
}

// ============================================================================
// Table
// ============================================================================

/// A table with its columns, constraints and indexes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<Index>,
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a column (builder style)
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a constraint (builder style)
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Add an index (builder style)
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Get a column by exact name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a mutable column by exact name
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The first non-empty primary key, if any
    pub fn primary_key(&self) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| c.kind() == ConstraintKind::PrimaryKey && !c.is_empty())
    }

    /// Whether the column takes part in the primary key
    pub fn is_primary_key_column(&self, column: &str) -> bool {
        self.primary_key()
            .is_some_and(|pk| pk.columns().iter().any(|c| c == column))
    }

    /// Foreign key constraints
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.kind() == ConstraintKind::ForeignKey)
    }

    /// Non-empty constraints that are added with `ALTER TABLE` rather than
    /// inline: foreign keys and unique constraints.
    pub fn alter_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.use_alter() && !c.is_empty())
    }
}

// ============================================================================
// Column
// ============================================================================

/// A typed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,

    /// Explicit string length; `None` means the dialect or model default
    pub length: Option<u32>,

    /// Explicit numeric precision
    pub precision: Option<u32>,

    /// Explicit numeric scale
    pub scale: Option<u32>,

    pub nullable: bool,
    pub default: Option<DefaultValue>,

    /// Documentation only; never rendered into DDL
    pub description: Option<String>,
}

impl Column {
    /// Create a nullable column without parameters
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            length: None,
            precision: None,
            scale: None,
            nullable: true,
            default: None,
            description: None,
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set an explicit length. Zero counts as "not given".
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = (length > 0).then_some(length);
        self
    }

    /// Set explicit precision and scale. Zero counts as "not given".
    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = (precision > 0).then_some(precision);
        self.scale = (scale > 0).then_some(scale);
        self
    }

    /// Mark the column NOT NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    // ========================================================================
    // Effective parameters
    // ========================================================================

    /// Length to render when the dialect has no default of its own
    pub fn effective_length(&self) -> u32 {
        self.length.unwrap_or(DEFAULT_STRING_LENGTH)
    }

    pub fn effective_precision(&self) -> u32 {
        self.precision.unwrap_or(DEFAULT_NUMERIC_PRECISION)
    }

    pub fn effective_scale(&self) -> u32 {
        self.scale.unwrap_or(DEFAULT_NUMERIC_SCALE)
    }
}

/// A server-side column default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum DefaultValue {
    /// Rendered as a quoted literal
    Text(String),
    /// Rendered verbatim
    Number(String),
    /// Rendered with the dialect's boolean literals
    Bool(bool),
}

impl DefaultValue {
    /// Convert a document value; `None` for null, empty strings and
    /// unsupported shapes (arrays, objects).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(DefaultValue::Text(s.clone())),
            serde_json::Value::Number(n) => Some(DefaultValue::Number(n.to_string())),
            serde_json::Value::Bool(b) => Some(DefaultValue::Bool(*b)),
            _ => None,
        }
    }
}

// ============================================================================
// Constraint
// ============================================================================

/// Kinds of table constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Unique,
}

impl ConstraintKind {
    /// Human-readable name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "primary key",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::Unique => "unique constraint",
        }
    }
}

/// A table constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<String>,
    },
    ForeignKey {
        name: Option<String>,
        source_columns: Vec<String>,
        target_table: String,
        target_columns: Vec<String>,
        /// Request deferred checking where the dialect supports it
        deferred: bool,
    },
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
}

impl Constraint {
    /// Create a primary key
    pub fn primary_key(name: Option<String>, columns: Vec<String>) -> Self {
        Constraint::PrimaryKey { name, columns }
    }

    /// Create a deferred foreign key
    pub fn foreign_key(
        name: Option<String>,
        source_columns: Vec<String>,
        target_table: impl Into<String>,
        target_columns: Vec<String>,
    ) -> Self {
        Constraint::ForeignKey {
            name,
            source_columns,
            target_table: target_table.into(),
            target_columns,
            deferred: true,
        }
    }

    /// Create a unique constraint
    pub fn unique(name: Option<String>, columns: Vec<String>) -> Self {
        Constraint::Unique { name, columns }
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::PrimaryKey { .. } => ConstraintKind::PrimaryKey,
            Constraint::ForeignKey { .. } => ConstraintKind::ForeignKey,
            Constraint::Unique { .. } => ConstraintKind::Unique,
        }
    }

    /// Explicit name, if one was given
    pub fn name(&self) -> Option<&str> {
        match self {
            Constraint::PrimaryKey { name, .. }
            | Constraint::ForeignKey { name, .. }
            | Constraint::Unique { name, .. } => name.as_deref(),
        }
    }

    /// Columns of the owning table covered by the constraint
    pub fn columns(&self) -> &[String] {
        match self {
            Constraint::PrimaryKey { columns, .. } | Constraint::Unique { columns, .. } => columns,
            Constraint::ForeignKey { source_columns, .. } => source_columns,
        }
    }

    /// Referenced table for foreign keys
    pub fn target_table(&self) -> Option<&str> {
        match self {
            Constraint::ForeignKey { target_table, .. } => Some(target_table),
            _ => None,
        }
    }

    /// Referenced columns for foreign keys
    pub fn target_columns(&self) -> &[String] {
        match self {
            Constraint::ForeignKey { target_columns, .. } => target_columns,
            _ => &[],
        }
    }

    /// Name the constraint is created under: the explicit name, or
    /// `fk_<table>_<cols>_<target>` / `uq_<table>_<cols>` / `pk_<table>_<cols>`
    pub fn resolved_name(&self, table: &str) -> String {
        if let Some(name) = self.name() {
            return name.to_string();
        }
        let columns = self.columns().join("_");
        match self {
            Constraint::ForeignKey { target_table, .. } => {
                format!("fk_{}_{}_{}", table, columns, target_table)
            }
            Constraint::Unique { .. } => format!("uq_{}_{}", table, columns),
            Constraint::PrimaryKey { .. } => format!("pk_{}_{}", table, columns),
        }
    }

    /// Foreign keys and unique constraints are always added with a separate
    /// `ALTER TABLE`; primary keys are always inline.
    pub fn use_alter(&self) -> bool {
        !matches!(self, Constraint::PrimaryKey { .. })
    }

    /// A constraint without columns renders nothing
    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }
}

// ============================================================================
// Index
// ============================================================================

/// A (non-unique) index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

impl Index {
    pub fn new(name: Option<String>, columns: Vec<String>) -> Self {
        Self { name, columns }
    }

    /// Explicit name, or `idx_<table>_<cols>`
    pub fn resolved_name(&self, table: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("idx_{}_{}", table, self.columns.join("_")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> Table {
        Table::new("person")
            .with_column(Column::new("person_id", ColumnType::Integer))
            .with_column(Column::new("care_site_id", ColumnType::Integer))
            .with_constraint(Constraint::primary_key(None, vec!["person_id".into()]))
            .with_constraint(Constraint::foreign_key(
                None,
                vec!["care_site_id".into()],
                "care_site",
                vec!["care_site_id".into()],
            ))
            .with_constraint(Constraint::unique(Some("uq_person".into()), vec![]))
    }

    #[test]
    fn test_column_defaults() {
        let col = Column::new("name", ColumnType::String);
        assert!(col.nullable);
        assert_eq!(col.effective_length(), 256);

        let num = Column::new("amount", ColumnType::Numeric);
        assert_eq!(num.effective_precision(), 20);
        assert_eq!(num.effective_scale(), 5);
    }

    #[test]
    fn test_zero_parameters_count_as_absent() {
        let col = Column::new("name", ColumnType::String).with_length(0);
        assert_eq!(col.length, None);
        assert_eq!(col.effective_length(), 256);

        let num = Column::new("amount", ColumnType::Numeric).with_precision(10, 0);
        assert_eq!(num.effective_precision(), 10);
        assert_eq!(num.effective_scale(), 5);
    }

    #[test]
    fn test_default_value_from_json() {
        assert_eq!(
            DefaultValue::from_json(&json!("it's")),
            Some(DefaultValue::Text("it's".into()))
        );
        assert_eq!(
            DefaultValue::from_json(&json!(42)),
            Some(DefaultValue::Number("42".into()))
        );
        assert_eq!(DefaultValue::from_json(&json!(false)), Some(DefaultValue::Bool(false)));
        assert_eq!(
            DefaultValue::from_json(&json!(0)),
            Some(DefaultValue::Number("0".into()))
        );
        assert_eq!(DefaultValue::from_json(&json!("")), None);
        assert_eq!(DefaultValue::from_json(&json!(null)), None);
        assert_eq!(DefaultValue::from_json(&json!([1])), None);
    }

    #[test]
    fn test_resolved_names() {
        let table = person();
        let names: Vec<_> = table
            .constraints
            .iter()
            .map(|c| c.resolved_name(&table.name))
            .collect();
        assert_eq!(
            names,
            vec!["pk_person_person_id", "fk_person_care_site_id_care_site", "uq_person"]
        );

        let index = Index::new(None, vec!["a".into(), "b".into()]);
        assert_eq!(index.resolved_name("t"), "idx_t_a_b");
        assert_eq!(Index::new(Some("ix".into()), vec![]).resolved_name("t"), "ix");
    }

    #[test]
    fn test_table_lookups() {
        let table = person();
        assert!(table.has_column("person_id"));
        assert!(!table.has_column("missing"));
        assert!(table.is_primary_key_column("person_id"));
        assert!(!table.is_primary_key_column("care_site_id"));
        assert_eq!(table.foreign_keys().count(), 1);
    }

    #[test]
    fn test_alter_constraints_skip_pk_and_empty() {
        let table = person();
        let alter: Vec<_> = table.alter_constraints().collect();
        assert_eq!(alter.len(), 1);
        assert_eq!(alter[0].kind(), ConstraintKind::ForeignKey);
        assert!(alter[0].use_alter());
    }

    #[test]
    fn test_foreign_key_edges() {
        let schema = Schema {
            tables: vec![person(), Table::new("care_site")],
        };
        assert_eq!(schema.foreign_key_edges(), vec![("person", "care_site")]);
        assert_eq!(schema.table_names(), vec!["person", "care_site"]);
    }
}

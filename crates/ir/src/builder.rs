//! Schema model construction
//!
//! Turns a [`SchemaDocument`] into a validated [`Schema`]. Tables are built
//! first so that constraints may reference tables declared later in the
//! document; every reference is checked once the whole model exists.

use crate::document::{FieldDoc, SchemaDocument, TableDoc};
use crate::schema::{Column, Constraint, DefaultValue, Index, Schema, Table};
use ddlgen_core::{ColumnType, EngineError, EngineResult, Validatable};
use std::collections::HashSet;

// ============================================================================
// SchemaBuilder
// ============================================================================

/// Builds a [`Schema`] from a parsed document.
///
/// The builder borrows the document and owns nothing else; each call to
/// [`build`](SchemaBuilder::build) produces a fresh model.
#[derive(Debug, Clone, Copy)]
pub struct SchemaBuilder<'a> {
    document: &'a SchemaDocument,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(document: &'a SchemaDocument) -> Self {
        Self { document }
    }

    /// Build and validate the schema model.
    ///
    /// # Errors
    ///
    /// - `UnknownType` for a field type outside the supported set
    /// - `DuplicateName` for repeated table or column names, and for explicit
    ///   constraint or index names used twice
    /// - `SchemaReference` for constraints or indexes naming a missing table
    ///   or column
    pub fn build(&self) -> EngineResult<Schema> {
        let mut schema = Schema::new();

        // ── 1. Tables ────────────────────────────────────────────────────
        for table_doc in &self.document.tables {
            if schema.table(&table_doc.name).is_some() {
                return Err(EngineError::duplicate_name("table", &table_doc.name));
            }
            schema.tables.push(build_table(table_doc)?);
        }

        let constraints = &self.document.schema.constraints;

        // ── 2. Not-null flags ────────────────────────────────────────────
        for not_null in &constraints.not_null {
            match schema
                .table_mut(&not_null.table)
                .and_then(|t| t.column_mut(&not_null.field))
            {
                Some(column) => column.nullable = false,
                None => tracing::debug!(
                    table = %not_null.table,
                    field = %not_null.field,
                    "ignoring not-null entry for unknown field",
                ),
            }
        }

        // ── 3. Constraints ───────────────────────────────────────────────
        for pk in &constraints.primary_keys {
            let table = owning_table(&mut schema, &pk.table, "primary key")?;
            if table.primary_key().is_some() && !pk.fields.is_empty() {
                return Err(EngineError::duplicate_name(
                    "primary key",
                    format!("{} (table already has one)", pk.table),
                ));
            }
            table.constraints.push(Constraint::primary_key(
                explicit_name(&pk.name),
                pk.fields.clone(),
            ));
        }

        for fk in &constraints.foreign_keys {
            let table = owning_table(&mut schema, &fk.source_table, "foreign key")?;
            table.constraints.push(Constraint::foreign_key(
                explicit_name(&fk.name),
                vec![fk.source_field.clone()],
                &fk.target_table,
                vec![fk.target_field.clone()],
            ));
        }

        for unique in &constraints.uniques {
            let table = owning_table(&mut schema, &unique.table, "unique constraint")?;
            table.constraints.push(Constraint::unique(
                explicit_name(&unique.name),
                unique.fields.clone(),
            ));
        }

        // ── 4. Indexes ───────────────────────────────────────────────────
        for index in &self.document.schema.indexes {
            let table = owning_table(&mut schema, &index.table, "index")?;
            table
                .indexes
                .push(Index::new(explicit_name(&index.name), index.fields.clone()));
        }

        // ── 5. Cross-references and names ────────────────────────────────
        schema.validate()?;

        tracing::debug!(
            tables = schema.table_count(),
            indexes = schema.index_count(),
            "schema model built",
        );

        Ok(schema)
    }
}

/// Build a schema model from a document.
///
/// Shorthand for `SchemaBuilder::new(document).build()`.
pub fn build_schema(document: &SchemaDocument) -> EngineResult<Schema> {
    SchemaBuilder::new(document).build()
}

/// Parse a JSON document and build its schema model.
pub fn build_schema_from_json(json: &str) -> EngineResult<Schema> {
    build_schema(&SchemaDocument::from_json(json)?)
}

// ============================================================================
// Helpers
// ============================================================================

fn build_table(table_doc: &TableDoc) -> EngineResult<Table> {
    let mut table = Table::new(&table_doc.name);

    if table_doc.fields.is_empty() {
        tracing::warn!(table = %table_doc.name, "table declares no fields");
    }

    let mut seen = HashSet::new();
    for field in &table_doc.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(EngineError::duplicate_name(
                "column",
                format!("{}.{}", table_doc.name, field.name),
            ));
        }
        table.columns.push(build_column(&table_doc.name, field)?);
    }

    Ok(table)
}

fn build_column(table: &str, field: &FieldDoc) -> EngineResult<Column> {
    let column_type = ColumnType::from_type_str(&field.type_name)
        .ok_or_else(|| EngineError::unknown_type(table, &field.name, &field.type_name))?;

    let mut column = Column::new(&field.name, column_type);

    if column_type.has_length() {
        column = column.with_length(field.length.unwrap_or(0));
    }
    if column_type.has_precision() {
        column = column.with_precision(field.precision.unwrap_or(0), field.scale.unwrap_or(0));
    }

    column.default = field.default.as_ref().and_then(DefaultValue::from_json);
    column.description = field.description.clone().filter(|d| !d.is_empty());

    Ok(column)
}

fn owning_table<'s>(
    schema: &'s mut Schema,
    name: &str,
    what: &str,
) -> EngineResult<&'s mut Table> {
    schema.table_mut(name).ok_or_else(|| {
        EngineError::schema_reference(name, format!("{} declared on a table that does not exist", what))
    })
}

/// Empty names mean "generate one"
fn explicit_name(name: &Option<String>) -> Option<String> {
    name.as_ref().filter(|n| !n.trim().is_empty()).cloned()
}

// ============================================================================
// Tests
// ============================================================================

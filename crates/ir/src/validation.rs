//! Schema model validation
//!
//! Reference and naming checks that can only run once every table of a
//! document has been built, because foreign keys may point forward.

use crate::schema::{ConstraintKind, Schema, Table};
use ddlgen_core::{EngineError, EngineResult, Validatable};
use std::collections::{HashMap, HashSet};

impl Validatable for Schema {
    fn validate(&self) -> EngineResult<()> {
        for table in &self.tables {
            check_local_columns(table)?;
            check_foreign_key_targets(self, table)?;
        }
        check_resolved_names(self)
    }
}

/// Every constraint and index column must exist on its owning table
fn check_local_columns(table: &Table) -> EngineResult<()> {
    for constraint in &table.constraints {
        for column in constraint.columns() {
            if !table.has_column(column) {
                return Err(EngineError::schema_reference(
                    &table.name,
                    format!(
                        "{} references unknown column '{}'",
                        constraint.kind().label(),
                        column
                    ),
                ));
            }
        }
    }

    for index in &table.indexes {
        for column in &index.columns {
            if !table.has_column(column) {
                return Err(EngineError::schema_reference(
                    &table.name,
                    format!("index references unknown column '{}'", column),
                ));
            }
        }
    }

    Ok(())
}

/// Foreign key targets must name an existing table and existing columns
fn check_foreign_key_targets(schema: &Schema, table: &Table) -> EngineResult<()> {
    for fk in table.foreign_keys() {
        let Some(target_name) = fk.target_table() else {
            continue;
        };

        let target = schema.table(target_name).ok_or_else(|| {
            EngineError::schema_reference(
                &table.name,
                format!("foreign key targets unknown table '{}'", target_name),
            )
        })?;

        for column in fk.target_columns() {
            if !target.has_column(column) {
                return Err(EngineError::schema_reference(
                    &table.name,
                    format!(
                        "foreign key targets unknown column '{}.{}'",
                        target_name, column
                    ),
                ));
            }
        }

        if fk.target_columns().len() != fk.columns().len() {
            return Err(EngineError::schema_reference(
                &table.name,
                format!(
                    "foreign key to '{}' has {} source and {} target columns",
                    target_name,
                    fk.columns().len(),
                    fk.target_columns().len()
                ),
            ));
        }
    }

    Ok(())
}

/// Names a constraint or index is created under, explicit or generated,
/// must be unique per kind across the whole schema
fn check_resolved_names(schema: &Schema) -> EngineResult<()> {
    let mut constraint_names: HashMap<ConstraintKind, HashSet<String>> = HashMap::new();
    let mut index_names: HashSet<String> = HashSet::new();

    for table in &schema.tables {
        for constraint in &table.constraints {
            // Unnamed empty constraints render nothing
            if constraint.name().is_none() && constraint.is_empty() {
                continue;
            }
            let name = constraint.resolved_name(&table.name);
            let seen = constraint_names.entry(constraint.kind()).or_default();
            if seen.contains(&name) {
                return Err(EngineError::duplicate_name(constraint.kind().label(), name));
            }
            seen.insert(name);
        }

        for index in &table.indexes {
            if index.name.is_none() && index.columns.is_empty() {
                continue;
            }
            let name = index.resolved_name(&table.name);
            if index_names.contains(&name) {
                return Err(EngineError::duplicate_name("index", name));
            }
            index_names.insert(name);
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

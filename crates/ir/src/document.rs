//! Input schema documents
//!
//! Serde mirror of the JSON document a model registry serves for one
//! model version. Nothing here is validated; [`crate::builder`] turns a
//! document into a checked [`crate::Schema`].

use ddlgen_core::EngineResult;
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` list the same as a missing one
fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// SchemaDocument
// ============================================================================

/// Root of a schema document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Tables with their fields, in document order
    #[serde(default, deserialize_with = "nullable_list")]
    pub tables: Vec<TableDoc>,

    /// Constraints and indexes
    #[serde(default)]
    pub schema: SchemaSection,
}

impl SchemaDocument {
    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from a JSON value
    pub fn from_value(value: serde_json::Value) -> EngineResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// A table entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDoc {
    pub name: String,

    #[serde(default, deserialize_with = "nullable_list")]
    pub fields: Vec<FieldDoc>,
}

/// A field entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDoc {
    pub name: String,

    /// Type string, e.g. `integer`, `string`, `timestamp`
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub length: Option<u32>,

    #[serde(default)]
    pub precision: Option<u32>,

    #[serde(default)]
    pub scale: Option<u32>,

    /// Server default; strings, numbers and booleans are accepted
    #[serde(default)]
    pub default: Option<serde_json::Value>,

    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// Schema section
// ============================================================================

/// The `schema` object holding constraints and indexes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSection {
    #[serde(default)]
    pub constraints: ConstraintsDoc,

    #[serde(default, deserialize_with = "nullable_list")]
    pub indexes: Vec<IndexDoc>,
}

/// All constraint lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintsDoc {
    #[serde(default, deserialize_with = "nullable_list")]
    pub not_null: Vec<NotNullDoc>,

    #[serde(default, deserialize_with = "nullable_list")]
    pub primary_keys: Vec<PrimaryKeyDoc>,

    #[serde(default, deserialize_with = "nullable_list")]
    pub foreign_keys: Vec<ForeignKeyDoc>,

    #[serde(default, deserialize_with = "nullable_list")]
    pub uniques: Vec<UniqueDoc>,
}

/// A `(table, field)` pair that must not be null
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotNullDoc {
    pub table: String,
    pub field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKeyDoc {
    pub table: String,
    #[serde(default, deserialize_with = "nullable_list")]
    pub fields: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A single-column foreign key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDoc {
    pub source_table: String,
    pub source_field: String,
    pub target_table: String,
    pub target_field: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniqueDoc {
    pub table: String,
    #[serde(default, deserialize_with = "nullable_list")]
    pub fields: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDoc {
    pub table: String,
    #[serde(default, deserialize_with = "nullable_list")]
    pub fields: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_document() {
        let doc = SchemaDocument::from_value(json!({
            "tables": [
                {"name": "person", "fields": [
                    {"name": "person_id", "type": "integer"},
                    {"name": "name", "type": "string", "length": 50, "description": "Full name"}
                ]}
            ],
            "schema": {
                "constraints": {
                    "not_null": [{"table": "person", "field": "name"}],
                    "primary_keys": [{"table": "person", "fields": ["person_id"], "name": "pk_person"}],
                    "foreign_keys": [],
                    "uniques": [{"table": "person", "fields": ["name"]}]
                },
                "indexes": [{"table": "person", "fields": ["name"], "name": "idx_person_name"}]
            }
        }))
        .unwrap();

        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].fields[1].type_name, "string");
        assert_eq!(doc.tables[0].fields[1].length, Some(50));
        assert_eq!(doc.schema.constraints.not_null.len(), 1);
        assert_eq!(
            doc.schema.constraints.primary_keys[0].name.as_deref(),
            Some("pk_person")
        );
        assert_eq!(doc.schema.constraints.uniques[0].name, None);
        assert_eq!(doc.schema.indexes[0].fields, vec!["name".to_string()]);
    }

    #[test]
    fn test_null_lists_are_empty() {
        let doc = SchemaDocument::from_value(json!({
            "tables": [{"name": "empty", "fields": null}],
            "schema": {
                "constraints": {
                    "not_null": null,
                    "primary_keys": null,
                    "foreign_keys": null,
                    "uniques": null
                },
                "indexes": null
            }
        }))
        .unwrap();

        assert!(doc.tables[0].fields.is_empty());
        assert!(doc.schema.constraints.foreign_keys.is_empty());
        assert!(doc.schema.indexes.is_empty());
    }

    #[test]
    fn test_missing_schema_section() {
        let doc = SchemaDocument::from_json(r#"{"tables": []}"#).unwrap();
        assert!(doc.tables.is_empty());
        assert_eq!(doc.schema, SchemaSection::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = SchemaDocument::from_json("{\"tables\": [").unwrap_err();
        assert!(err.to_string().starts_with("JSON serialization error"));
    }
}

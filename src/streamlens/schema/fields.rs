//! Schema field merger
//!
//! Converts a topic's resolved key/value schemas into one flat, ordered
//! field list. Each Avro definition is parsed and its record tree walked
//! into dotted-path leaf fields tagged with their origin; key fields
//! precede value fields and declaration order is preserved within a
//! schema. A side in a format this source cannot parse contributes zero
//! fields and a warning, never an error.

use crate::streamlens::registry::{RegisteredSchema, SchemaFormat, TopicSchemaPair};
use apache_avro::Schema as AvroSchema;
use serde::{Deserialize, Serialize};

/// Which schema a field came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrigin {
    Key,
    Value,
}

/// Semantic type of a flattened leaf field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Enum,
    Fixed,
    Array,
    Map,
    Union,
    Record,
    Date,
    Time,
    Timestamp,
    Duration,
    Uuid,
}

/// One flattened leaf field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Dotted path from the schema root to the leaf
    pub path: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub origin: FieldOrigin,
    pub nullable: bool,
}

/// Result of merging a topic's key and value schemas
#[derive(Debug, Clone, Default)]
pub struct MergedSchema {
    /// Key fields first, then value fields, declaration order within each
    pub fields: Vec<Field>,
    /// Raw key definition, present when that side parsed successfully
    pub key_raw: Option<String>,
    /// Raw value definition, present when that side parsed successfully
    pub value_raw: Option<String>,
    parsed_any: bool,
}

impl MergedSchema {
    /// Whether a schema aspect should be emitted at all: either fields
    /// were extracted, or at least one raw definition parsed (an empty
    /// record is still a schema).
    pub fn has_schema(&self) -> bool {
        !self.fields.is_empty() || self.parsed_any
    }
}

/// Non-fatal conditions encountered while extracting fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaWarning {
    /// The registry holds a schema in a format this source cannot parse
    UnsupportedFormat { subject: String, format: String },
    /// The definition claimed to be Avro but did not parse
    Unparseable { subject: String, reason: String },
}

/// Merge a topic's schema pair into a flat field list.
pub fn merge_fields(pair: &TopicSchemaPair) -> (MergedSchema, Vec<SchemaWarning>) {
    let mut merged = MergedSchema::default();
    let mut warnings = Vec::new();

    if let Some(key) = &pair.key {
        if let Some(raw) = extract_side(key, FieldOrigin::Key, &mut merged, &mut warnings) {
            merged.key_raw = Some(raw);
        }
    }
    if let Some(value) = &pair.value {
        if let Some(raw) = extract_side(value, FieldOrigin::Value, &mut merged, &mut warnings) {
            merged.value_raw = Some(raw);
        }
    }

    (merged, warnings)
}

/// Extract one side's fields; returns the raw definition when it parsed.
fn extract_side(
    schema: &RegisteredSchema,
    origin: FieldOrigin,
    merged: &mut MergedSchema,
    warnings: &mut Vec<SchemaWarning>,
) -> Option<String> {
    match &schema.format {
        SchemaFormat::Avro => match AvroSchema::parse_str(&schema.raw) {
            Ok(parsed) => {
                merged.parsed_any = true;
                flatten(&parsed, "", origin, false, &mut merged.fields);
                Some(schema.raw.clone())
            }
            Err(e) => {
                log::debug!("failed to parse schema for subject {}: {}", schema.subject, e);
                warnings.push(SchemaWarning::Unparseable {
                    subject: schema.subject.clone(),
                    reason: e.to_string(),
                });
                None
            }
        },
        other => {
            warnings.push(SchemaWarning::UnsupportedFormat {
                subject: schema.subject.clone(),
                format: other.to_string(),
            });
            None
        }
    }
}

fn flatten(
    schema: &AvroSchema,
    prefix: &str,
    origin: FieldOrigin,
    nullable: bool,
    out: &mut Vec<Field>,
) {
    match schema {
        AvroSchema::Record(record) => {
            for field in &record.fields {
                let path = join_path(prefix, &field.name);
                flatten(&field.schema, &path, origin, nullable, out);
            }
        }
        AvroSchema::Union(union) => {
            let variants = union.variants();
            let non_null: Vec<&AvroSchema> = variants
                .iter()
                .filter(|v| !matches!(v, AvroSchema::Null))
                .collect();
            let with_null = non_null.len() < variants.len();
            match non_null.as_slice() {
                [] => push_leaf(prefix, FieldType::Null, origin, true, out),
                [single] => flatten(single, prefix, origin, nullable || with_null, out),
                _ => push_leaf(prefix, FieldType::Union, origin, nullable || with_null, out),
            }
        }
        AvroSchema::Array(items) => {
            if is_complex(items) {
                flatten(items, prefix, origin, nullable, out);
            } else {
                push_leaf(prefix, FieldType::Array, origin, nullable, out);
            }
        }
        AvroSchema::Map(values) => {
            if is_complex(values) {
                flatten(values, prefix, origin, nullable, out);
            } else {
                push_leaf(prefix, FieldType::Map, origin, nullable, out);
            }
        }
        AvroSchema::Null => push_leaf(prefix, FieldType::Null, origin, true, out),
        other => push_leaf(prefix, leaf_type(other), origin, nullable, out),
    }
}

fn is_complex(schema: &AvroSchema) -> bool {
    matches!(
        schema,
        AvroSchema::Record(_) | AvroSchema::Union(_) | AvroSchema::Array(_) | AvroSchema::Map(_)
    )
}

fn leaf_type(schema: &AvroSchema) -> FieldType {
    match schema {
        AvroSchema::Boolean => FieldType::Boolean,
        AvroSchema::Int => FieldType::Int,
        AvroSchema::Long => FieldType::Long,
        AvroSchema::Float => FieldType::Float,
        AvroSchema::Double => FieldType::Double,
        AvroSchema::Bytes => FieldType::Bytes,
        AvroSchema::String => FieldType::String,
        AvroSchema::Enum(_) => FieldType::Enum,
        AvroSchema::Fixed(_) => FieldType::Fixed,
        AvroSchema::Ref { .. } => FieldType::Record,
        AvroSchema::Date => FieldType::Date,
        AvroSchema::TimeMillis | AvroSchema::TimeMicros => FieldType::Time,
        AvroSchema::TimestampMillis | AvroSchema::TimestampMicros => FieldType::Timestamp,
        AvroSchema::Duration => FieldType::Duration,
        AvroSchema::Uuid => FieldType::Uuid,
        _ => FieldType::String,
    }
}

/// A leaf at the schema root has no name to anchor a path, so nothing is
/// emitted for bare primitive schemas.
fn push_leaf(path: &str, field_type: FieldType, origin: FieldOrigin, nullable: bool, out: &mut Vec<Field>) {
    if path.is_empty() {
        return;
    }
    out.push(Field {
        path: path.to_string(),
        field_type,
        origin,
        nullable,
    });
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

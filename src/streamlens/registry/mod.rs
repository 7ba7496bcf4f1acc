//! Schema registry capability
//!
//! Read-only view of a Confluent-compatible schema registry: list the
//! registered subjects once per run, then fetch the latest version of
//! individual subjects on demand. Schemas are never cached across runs.
//!
//! The [`SchemaRegistryApi`] trait is the seam between the pipeline and the
//! wire: production code uses the reqwest-backed [`HttpSchemaRegistry`],
//! tests substitute in-memory implementations.

pub mod client;
pub mod subjects;

pub use client::HttpSchemaRegistry;
pub use subjects::{SchemaSide, SubjectNameStrategy, SubjectResolver, TopicSchemaPair};

use crate::streamlens::error::SourceResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One schema version as registered under a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSchema {
    /// Subject the schema is registered under
    pub subject: String,
    /// Version within the subject
    pub version: i32,
    /// Registry-assigned identifier, treated as opaque
    pub schema_id: String,
    /// Raw schema definition exactly as stored in the registry
    pub raw: String,
    /// Declared serialization format
    pub format: SchemaFormat,
}

/// Serialization format of a registered schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaFormat {
    Avro,
    Protobuf,
    Json,
    Unknown(String),
}

impl SchemaFormat {
    /// Map the registry's `schemaType` string; an absent type means Avro
    /// per the Confluent convention.
    pub fn from_registry_type(schema_type: Option<&str>) -> Self {
        match schema_type {
            None | Some("AVRO") => SchemaFormat::Avro,
            Some("PROTOBUF") => SchemaFormat::Protobuf,
            Some("JSON") => SchemaFormat::Json,
            Some(other) => SchemaFormat::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaFormat::Avro => write!(f, "AVRO"),
            SchemaFormat::Protobuf => write!(f, "PROTOBUF"),
            SchemaFormat::Json => write!(f, "JSON"),
            SchemaFormat::Unknown(name) => write!(f, "{}", name),
        }
    }
}

/// Query capability exposed by a schema registry
#[async_trait]
pub trait SchemaRegistryApi: Send + Sync {
    /// List every subject known to the registry
    async fn list_subjects(&self) -> SourceResult<Vec<String>>;

    /// Fetch the latest version registered under a subject. A subject with
    /// no registered schema resolves to `Ok(None)`: the
    /// schema-less case, not an error.
    async fn latest_version(&self, subject: &str) -> SourceResult<Option<RegisteredSchema>>;
}

//! # streamlens
//!
//! Extracts structural and physical metadata about Kafka topics and
//! assembles it into normalized, catalog-ready metadata snapshots.
//!
//! Given a broker endpoint and an optional Confluent-compatible schema
//! registry, `streamlens` enumerates topics, applies configured inclusion
//! rules, resolves each topic's registered key/value schemas across the
//! supported subject naming conventions, merges schema fields with
//! broker-reported topic configuration, and emits one snapshot plus one
//! subtype record per topic, tolerating partial failures in any external
//! dependency without aborting the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use streamlens::{KafkaMetadataSource, SourceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SourceConfig {
//!         bootstrap: "localhost:9092".to_string(),
//!         schema_registry_url: Some("http://localhost:8081".to_string()),
//!         ..Default::default()
//!     };
//!
//!     let mut source = KafkaMetadataSource::connect(config).await?;
//!     while let Some(item) = source.next_item().await? {
//!         println!("{}", serde_json::to_string(&item)?);
//!     }
//!
//!     for warning in &source.report().warnings {
//!         eprintln!("warning: {}: {}", warning.key, warning.reason);
//!     }
//!     Ok(())
//! }
//! ```

pub mod streamlens;

pub use streamlens::config::{
    PatternConfig, RegistryAuth, SourceConfig, StatefulIngestionConfig, DEFAULT_PLATFORM,
};
pub use streamlens::error::{SourceError, SourceResult};
pub use streamlens::filter::TopicFilter;
pub use streamlens::kafka::{
    AdminConfigClient, BrokerClient, MetadataConsumer, TopicConfigApi, TopicConfigEntry,
};
pub use streamlens::registry::{
    HttpSchemaRegistry, RegisteredSchema, SchemaFormat, SchemaRegistryApi, SchemaSide,
    SubjectNameStrategy, SubjectResolver, TopicSchemaPair,
};
pub use streamlens::report::{IngestionReport, ReportEntry};
pub use streamlens::schema::{merge_fields, Field, FieldOrigin, FieldType, MergedSchema};
pub use streamlens::snapshot::{
    platform_instance_urn, platform_urn, Aspect, BrowsePathsAspect, DatasetUrn, MetadataSnapshot,
    PlatformInstanceAspect, PropertiesAspect, SchemaAspect, SnapshotBuilder, SourceItem,
    SourceRecord, SubTypeRecord,
};
pub use streamlens::source::KafkaMetadataSource;

//! Metadata snapshot assembly
//!
//! Value objects for the downstream catalog (URNs, aspects, records) and
//! the pure builder that composes them per topic. Nothing in this module
//! performs I/O; snapshots are immutable once built.

pub mod aspects;
pub mod builder;

pub use aspects::{
    platform_instance_urn, platform_urn, Aspect, BrowsePathsAspect, DatasetUrn, MetadataSnapshot,
    PlatformInstanceAspect, PropertiesAspect, SchemaAspect, SourceItem, SourceRecord,
    SubTypeRecord, SUBTYPE_TOPIC,
};
pub use builder::SnapshotBuilder;

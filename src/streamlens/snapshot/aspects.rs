//! Catalog value objects
//!
//! URNs are treated as opaque identifiers assembled once and compared as
//! strings; aspects are a tagged union serialized with an `aspect`
//! discriminator so the downstream catalog can dispatch on them.

use crate::streamlens::schema::Field;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Subtype name attached to every topic record
pub const SUBTYPE_TOPIC: &str = "Topic";

/// Opaque dataset identifier in the downstream catalog's URN scheme
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetUrn(String);

impl DatasetUrn {
    /// Build a dataset URN; a configured platform instance qualifies the
    /// dataset name.
    pub fn new(platform: &str, name: &str, instance: Option<&str>, env: &str) -> Self {
        let qualified = match instance {
            Some(instance) => format!("{}.{}", instance, name),
            None => name.to_string(),
        };
        DatasetUrn(format!(
            "urn:li:dataset:(urn:li:dataPlatform:{},{},{})",
            platform, qualified, env
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URN of a data platform
pub fn platform_urn(platform: &str) -> String {
    format!("urn:li:dataPlatform:{}", platform)
}

/// URN of one deployment of a data platform
pub fn platform_instance_urn(platform: &str, instance: &str) -> String {
    format!(
        "urn:li:dataPlatformInstance:(urn:li:dataPlatform:{},{})",
        platform, instance
    )
}

/// A typed facet of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aspect", rename_all = "camelCase")]
pub enum Aspect {
    Schema(SchemaAspect),
    PlatformInstance(PlatformInstanceAspect),
    BrowsePaths(BrowsePathsAspect),
    Properties(PropertiesAspect),
}

/// Merged schema metadata for one topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaAspect {
    /// Schema name; equals the topic name
    pub schema_name: String,
    /// Platform URN the schema belongs to
    pub platform: String,
    pub version: i64,
    /// Raw key schema definition, when one was parsed
    pub key_schema: Option<String>,
    /// Raw value schema definition, when one was parsed
    pub value_schema: Option<String>,
    pub fields: Vec<Field>,
}

/// Which deployment of the platform the topic lives on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInstanceAspect {
    pub platform: String,
    pub instance: String,
}

/// Hierarchical browse paths for catalog navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowsePathsAspect {
    pub paths: Vec<String>,
}

/// Broker-reported topic configuration, passed through untransformed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertiesAspect {
    pub custom_properties: BTreeMap<String, String>,
}

/// The full set of aspects describing one topic at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    pub urn: DatasetUrn,
    pub aspects: Vec<Aspect>,
}

impl MetadataSnapshot {
    pub fn schema_aspect(&self) -> Option<&SchemaAspect> {
        self.aspects.iter().find_map(|a| match a {
            Aspect::Schema(schema) => Some(schema),
            _ => None,
        })
    }

    pub fn platform_instance(&self) -> Option<&PlatformInstanceAspect> {
        self.aspects.iter().find_map(|a| match a {
            Aspect::PlatformInstance(instance) => Some(instance),
            _ => None,
        })
    }

    pub fn browse_paths(&self) -> Option<&BrowsePathsAspect> {
        self.aspects.iter().find_map(|a| match a {
            Aspect::BrowsePaths(paths) => Some(paths),
            _ => None,
        })
    }

    pub fn properties(&self) -> Option<&PropertiesAspect> {
        self.aspects.iter().find_map(|a| match a {
            Aspect::Properties(properties) => Some(properties),
            _ => None,
        })
    }
}

/// Constant subtype record emitted alongside every snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTypeRecord {
    pub urn: DatasetUrn,
    pub type_names: Vec<String>,
}

/// One record in the output stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRecord {
    Snapshot(MetadataSnapshot),
    SubTypes(SubTypeRecord),
}

/// A record plus its stable identifier within the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    pub id: String,
    pub record: SourceRecord,
}

impl SourceItem {
    pub fn snapshot(&self) -> Option<&MetadataSnapshot> {
        match &self.record {
            SourceRecord::Snapshot(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn subtypes(&self) -> Option<&SubTypeRecord> {
        match &self.record {
            SourceRecord::SubTypes(subtypes) => Some(subtypes),
            _ => None,
        }
    }
}

//! Source configuration
//!
//! All knobs for a metadata extraction run live in [`SourceConfig`]. The
//! struct deserializes from YAML (every field has a default, so a minimal
//! file only needs the bits that differ) and is equally constructible in
//! code. Validation happens eagerly through [`SourceConfig::validate`],
//! which compiles the topic patterns and enforces cross-field invariants
//! before any client is created.

use crate::streamlens::error::{SourceError, SourceResult};
use crate::streamlens::filter::TopicFilter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Platform identifier baked into every emitted URN
pub const DEFAULT_PLATFORM: &str = "kafka";

/// Configuration for a single metadata extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Kafka bootstrap servers, host:port pairs
    pub bootstrap: String,
    /// client.id reported to the brokers
    pub client_id: String,
    /// Topic inclusion rules applied after discovery
    pub topic_patterns: PatternConfig,
    /// Confluent-compatible schema registry endpoint; schemas are skipped
    /// entirely when unset
    pub schema_registry_url: Option<String>,
    /// Optional registry authentication
    pub registry_auth: Option<RegistryAuth>,
    /// Explicit `<topic>-key`/`<topic>-value` to subject overrides; takes
    /// priority over every subject name strategy
    pub topic_subject_map: HashMap<String, String>,
    /// Qualifier distinguishing multiple deployments of the same platform
    pub platform_instance: Option<String>,
    /// Environment tag stamped into URNs and browse paths
    pub env: String,
    /// Suppress warnings for schemas in formats this source cannot parse
    pub ignore_unsupported_schema_format: bool,
    /// Stateful ingestion settings; enabling requires a platform instance
    pub stateful_ingestion: StatefulIngestionConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            bootstrap: "localhost:9092".to_string(),
            client_id: "streamlens".to_string(),
            topic_patterns: PatternConfig::default(),
            schema_registry_url: None,
            registry_auth: None,
            topic_subject_map: HashMap::new(),
            platform_instance: None,
            env: "PROD".to_string(),
            ignore_unsupported_schema_format: false,
            stateful_ingestion: StatefulIngestionConfig::default(),
        }
    }
}

/// Allow/deny regex pattern sets for topic inclusion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// A topic must match at least one allow pattern (default: match-all)
    pub allow: Vec<String>,
    /// A topic matching any deny pattern is dropped (default: internal
    /// `_`-prefixed topics)
    pub deny: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            allow: vec![".*".to_string()],
            deny: vec!["_.*".to_string()],
        }
    }
}

/// Authentication configuration for the schema registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryAuth {
    Basic { username: String, password: String },
    Bearer { token: String },
}

/// Stateful ingestion settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatefulIngestionConfig {
    pub enabled: bool,
}

impl SourceConfig {
    /// Load configuration from a YAML string
    pub fn from_yaml_str(raw: &str) -> SourceResult<Self> {
        serde_yaml::from_str(raw)
            .map_err(|e| SourceError::config(format!("invalid configuration: {}", e)))
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SourceError::io(e, format!("read config file {}", path.display())))?;
        Self::from_yaml_str(&raw)
    }

    /// Validate cross-field invariants and compile the topic patterns.
    ///
    /// Called by the source constructor before any network client exists,
    /// so configuration problems never leave partial work behind.
    pub fn validate(&self) -> SourceResult<TopicFilter> {
        if self.stateful_ingestion.enabled && self.platform_instance.is_none() {
            return Err(SourceError::config(
                "enabling stateful ingestion requires a platform instance to be configured",
            ));
        }
        TopicFilter::new(&self.topic_patterns.allow, &self.topic_patterns.deny)
    }
}

//! Snapshot builder
//!
//! Pure composition of a topic's metadata into its snapshot and subtype
//! record. Aspect order is fixed: schema (when resolved), platform
//! instance (when configured), browse paths (always), properties (when
//! config was fetched).

use crate::streamlens::config::DEFAULT_PLATFORM;
use crate::streamlens::kafka::TopicConfigEntry;
use crate::streamlens::schema::MergedSchema;
use crate::streamlens::snapshot::aspects::{
    platform_instance_urn, platform_urn, Aspect, BrowsePathsAspect, DatasetUrn, MetadataSnapshot,
    PlatformInstanceAspect, PropertiesAspect, SchemaAspect, SubTypeRecord, SUBTYPE_TOPIC,
};

/// Builds snapshots for one run's platform/instance/environment triple
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    platform: String,
    platform_instance: Option<String>,
    env: String,
}

impl SnapshotBuilder {
    pub fn new(platform_instance: Option<String>, env: String) -> Self {
        Self {
            platform: DEFAULT_PLATFORM.to_string(),
            platform_instance,
            env,
        }
    }

    pub fn dataset_urn(&self, topic: &str) -> DatasetUrn {
        DatasetUrn::new(
            &self.platform,
            topic,
            self.platform_instance.as_deref(),
            &self.env,
        )
    }

    /// Compose the snapshot for one topic.
    pub fn build(
        &self,
        topic: &str,
        merged: &MergedSchema,
        configs: Option<&[TopicConfigEntry]>,
    ) -> MetadataSnapshot {
        let mut aspects = Vec::new();

        if merged.has_schema() {
            aspects.push(Aspect::Schema(SchemaAspect {
                schema_name: topic.to_string(),
                platform: platform_urn(&self.platform),
                version: 0,
                key_schema: merged.key_raw.clone(),
                value_schema: merged.value_raw.clone(),
                fields: merged.fields.clone(),
            }));
        }

        if let Some(instance) = &self.platform_instance {
            aspects.push(Aspect::PlatformInstance(PlatformInstanceAspect {
                platform: platform_urn(&self.platform),
                instance: platform_instance_urn(&self.platform, instance),
            }));
        }

        aspects.push(Aspect::BrowsePaths(BrowsePathsAspect {
            paths: vec![self.browse_path(topic)],
        }));

        if let Some(entries) = configs {
            aspects.push(Aspect::Properties(PropertiesAspect {
                custom_properties: entries
                    .iter()
                    .map(|entry| (entry.name.clone(), entry.value.clone()))
                    .collect(),
            }));
        }

        MetadataSnapshot {
            urn: self.dataset_urn(topic),
            aspects,
        }
    }

    /// The constant subtype record emitted after every snapshot.
    pub fn subtypes(&self, topic: &str) -> SubTypeRecord {
        SubTypeRecord {
            urn: self.dataset_urn(topic),
            type_names: vec![SUBTYPE_TOPIC.to_string()],
        }
    }

    /// Browse path segments: env (lowercased), platform, instance when
    /// configured, topic.
    fn browse_path(&self, topic: &str) -> String {
        let mut segments = vec![self.env.to_lowercase(), self.platform.clone()];
        if let Some(instance) = &self.platform_instance {
            segments.push(instance.clone());
        }
        segments.push(topic.to_string());
        format!("/{}", segments.join("/"))
    }
}

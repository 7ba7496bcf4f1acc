//! Topic configuration lookup
//!
//! Best-effort sidecar over the Kafka admin API. The pipeline never fails
//! because of this client: a missing admin client, a failed describe call
//! or a missing per-topic entry each degrade to "no properties aspect".

use crate::streamlens::config::SourceConfig;
use crate::streamlens::error::{SourceError, SourceResult};
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, OwnedResourceSpecifier, ResourceSpecifier};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One broker-reported configuration entry, passed through untransformed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicConfigEntry {
    pub name: String,
    pub value: String,
}

/// Capability for fetching per-topic broker configuration
#[async_trait]
pub trait TopicConfigApi: Send + Sync {
    /// Describe configuration for a batch of topics. Topics missing from
    /// the returned map simply had no readable configuration.
    async fn describe_topic_configs(
        &self,
        topics: &[String],
    ) -> SourceResult<HashMap<String, Vec<TopicConfigEntry>>>;
}

/// Admin client for topic configuration lookup
pub struct AdminConfigClient {
    admin: AdminClient<DefaultClientContext>,
    request_timeout: Duration,
}

impl AdminConfigClient {
    pub fn connect(config: &SourceConfig) -> SourceResult<Self> {
        let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap)
            .set("client.id", format!("{}-admin", config.client_id))
            .create()
            .map_err(|e| SourceError::broker(e, "failed to create admin client"))?;

        Ok(Self {
            admin,
            request_timeout: Duration::from_secs(30),
        })
    }
}

#[async_trait]
impl TopicConfigApi for AdminConfigClient {
    async fn describe_topic_configs(
        &self,
        topics: &[String],
    ) -> SourceResult<HashMap<String, Vec<TopicConfigEntry>>> {
        let specs: Vec<ResourceSpecifier> = topics
            .iter()
            .map(|topic| ResourceSpecifier::Topic(topic.as_str()))
            .collect();
        let opts = AdminOptions::new().request_timeout(Some(self.request_timeout));

        let results = self
            .admin
            .describe_configs(specs.iter(), &opts)
            .await
            .map_err(|e| SourceError::broker(e, "describe_configs request failed"))?;

        let mut by_topic = HashMap::new();
        for result in results {
            match result {
                Ok(resource) => {
                    if let OwnedResourceSpecifier::Topic(name) = &resource.specifier {
                        let entries: Vec<TopicConfigEntry> = resource
                            .entries
                            .iter()
                            .filter_map(|entry| {
                                entry.value.as_ref().map(|value| TopicConfigEntry {
                                    name: entry.name.clone(),
                                    value: value.clone(),
                                })
                            })
                            .collect();
                        by_topic.insert(name.clone(), entries);
                    }
                }
                // A failed resource drops that topic's properties only.
                Err(code) => log::warn!("describe_configs failed for one resource: {}", code),
            }
        }

        Ok(by_topic)
    }
}

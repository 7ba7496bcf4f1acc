//! Topic discovery client
//!
//! A consumer created purely for cluster metadata: one `fetch_metadata`
//! round trip lists every topic, and nothing is ever subscribed or
//! consumed.

use crate::streamlens::config::SourceConfig;
use crate::streamlens::error::{SourceError, SourceResult};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};
use std::time::Duration;

/// Capability the pipeline needs from the broker: list topics once,
/// release the connection when done.
pub trait BrokerClient: Send {
    /// One-shot listing of all topics in the cluster
    fn list_topics(&self) -> SourceResult<Vec<String>>;

    /// Release the underlying connection; safe to call more than once
    fn close(&mut self);
}

/// Metadata-only consumer over rdkafka
pub struct MetadataConsumer {
    consumer: Option<BaseConsumer>,
    timeout: Duration,
}

impl MetadataConsumer {
    /// Create the consumer. Failure here is fatal to the run: without the
    /// primary broker connection nothing downstream can execute.
    pub fn connect(config: &SourceConfig) -> SourceResult<Self> {
        let consumer: BaseConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap)
            .set("client.id", &config.client_id)
            .set("group.id", format!("{}-metadata", config.client_id))
            .create()
            .map_err(|e| SourceError::broker(e, "failed to create metadata consumer"))?;

        log::debug!("metadata consumer connected to {}", config.bootstrap);
        Ok(Self {
            consumer: Some(consumer),
            timeout: Duration::from_secs(10),
        })
    }
}

impl BrokerClient for MetadataConsumer {
    fn list_topics(&self) -> SourceResult<Vec<String>> {
        let consumer = self.consumer.as_ref().ok_or(SourceError::Closed)?;
        let metadata = consumer
            .fetch_metadata(None, self.timeout)
            .map_err(|e| SourceError::broker(e, "failed to fetch cluster metadata"))?;

        Ok(metadata
            .topics()
            .iter()
            .map(|topic| topic.name().to_string())
            .collect())
    }

    fn close(&mut self) {
        if self.consumer.take().is_some() {
            log::debug!("metadata consumer closed");
        }
    }
}

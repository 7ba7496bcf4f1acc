//! Pipeline driver
//!
//! `KafkaMetadataSource` orchestrates one extraction run: connect, discover
//! topics, then lazily produce one snapshot plus one subtype record per
//! included topic. The sequence is pull-driven and not restartable; each
//! topic is fully processed before the next begins.
//!
//! Fatal conditions (bad configuration, no broker, unreachable registry)
//! surface from `connect` or from the first pull, before any record is
//! emitted. Everything else (missing schemas, unsupported formats, a
//! broken admin client) degrades the affected topic or aspect and lands
//! in the run report.

use crate::streamlens::config::SourceConfig;
use crate::streamlens::error::{SourceError, SourceResult};
use crate::streamlens::filter::TopicFilter;
use crate::streamlens::kafka::{
    AdminConfigClient, BrokerClient, MetadataConsumer, TopicConfigApi, TopicConfigEntry,
};
use crate::streamlens::registry::{
    HttpSchemaRegistry, SchemaRegistryApi, SubjectResolver, TopicSchemaPair,
};
use crate::streamlens::report::IngestionReport;
use crate::streamlens::schema::{merge_fields, SchemaWarning};
use crate::streamlens::snapshot::{SnapshotBuilder, SourceItem, SourceRecord};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Run lifecycle. Discovery happens on the first pull; the source drains
/// its clients and closes once the last topic has been emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceState {
    Connected,
    Iterating,
    Closed,
}

/// Metadata extraction source for one Kafka cluster
pub struct KafkaMetadataSource {
    config: SourceConfig,
    filter: TopicFilter,
    builder: SnapshotBuilder,
    broker: Option<Box<dyn BrokerClient>>,
    resolver: Option<SubjectResolver>,
    admin: Option<Box<dyn TopicConfigApi>>,
    report: IngestionReport,
    state: SourceState,
    pending_topics: VecDeque<String>,
    pending_items: VecDeque<SourceItem>,
    topic_configs: HashMap<String, Vec<TopicConfigEntry>>,
}

impl std::fmt::Debug for KafkaMetadataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaMetadataSource")
            .field("state", &self.state)
            .field("pending_topics", &self.pending_topics.len())
            .field("pending_items", &self.pending_items.len())
            .finish_non_exhaustive()
    }
}

impl KafkaMetadataSource {
    /// Connect to the cluster described by `config`.
    ///
    /// Configuration is validated before any client exists, the broker
    /// client and (when configured) the registry subject list are
    /// required, and the admin client is best-effort: its absence is a
    /// warning, not an error.
    pub async fn connect(config: SourceConfig) -> SourceResult<Self> {
        let filter = config.validate()?;

        let broker = MetadataConsumer::connect(&config)?;

        let registry: Option<Arc<dyn SchemaRegistryApi>> = match &config.schema_registry_url {
            Some(url) => {
                let mut client = HttpSchemaRegistry::new(url);
                if let Some(auth) = &config.registry_auth {
                    client = client.with_auth(auth.clone());
                }
                Some(Arc::new(client))
            }
            None => None,
        };

        let mut report = IngestionReport::default();
        let admin: Option<Box<dyn TopicConfigApi>> = match AdminConfigClient::connect(&config) {
            Ok(client) => Some(Box::new(client)),
            Err(e) => {
                report.warn(
                    "admin-client",
                    format!("failed to create admin client, topic configs will be skipped: {}", e),
                );
                None
            }
        };

        Self::assemble(config, filter, Box::new(broker), registry, admin, report).await
    }

    /// Construct the source from externally supplied capability
    /// implementations. This is the seam integration tests drive the
    /// pipeline through; it applies the same construction-time checks as
    /// [`connect`](Self::connect).
    pub async fn with_clients(
        config: SourceConfig,
        broker: Box<dyn BrokerClient>,
        registry: Option<Arc<dyn SchemaRegistryApi>>,
        admin: Option<Box<dyn TopicConfigApi>>,
    ) -> SourceResult<Self> {
        let filter = config.validate()?;
        Self::assemble(config, filter, broker, registry, admin, IngestionReport::default()).await
    }

    async fn assemble(
        config: SourceConfig,
        filter: TopicFilter,
        broker: Box<dyn BrokerClient>,
        registry: Option<Arc<dyn SchemaRegistryApi>>,
        admin: Option<Box<dyn TopicConfigApi>>,
        report: IngestionReport,
    ) -> SourceResult<Self> {
        // Prime the subject list once per run. A registry that is
        // configured but unreachable fails the whole source here, before
        // discovery; per-subject misses later are the schema-less case.
        let resolver = match registry {
            Some(registry) => {
                let subjects = registry.list_subjects().await?;
                log::debug!("schema registry lists {} subjects", subjects.len());
                Some(SubjectResolver::new(
                    registry,
                    subjects,
                    config.topic_subject_map.clone(),
                ))
            }
            None => None,
        };

        let builder = SnapshotBuilder::new(config.platform_instance.clone(), config.env.clone());

        Ok(Self {
            config,
            filter,
            builder,
            broker: Some(broker),
            resolver,
            admin,
            report,
            state: SourceState::Connected,
            pending_topics: VecDeque::new(),
            pending_items: VecDeque::new(),
            topic_configs: HashMap::new(),
        })
    }

    /// Pull the next record. `Ok(None)` means the run is exhausted; an
    /// error aborts the run with nothing further emitted.
    pub async fn next_item(&mut self) -> SourceResult<Option<SourceItem>> {
        loop {
            if let Some(item) = self.pending_items.pop_front() {
                return Ok(Some(item));
            }

            match self.state {
                SourceState::Closed => return Ok(None),
                SourceState::Connected => {
                    match self.discover().await {
                        Ok(()) => self.state = SourceState::Iterating,
                        Err(e) => {
                            self.close();
                            return Err(e);
                        }
                    }
                }
                SourceState::Iterating => match self.pending_topics.pop_front() {
                    Some(topic) => self.process_topic(&topic).await,
                    None => {
                        self.close();
                        return Ok(None);
                    }
                },
            }
        }
    }

    /// Drain the remaining sequence into a vector.
    pub async fn collect_all(&mut self) -> SourceResult<Vec<SourceItem>> {
        let mut items = Vec::new();
        while let Some(item) = self.next_item().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// The run report accumulated so far.
    pub fn report(&self) -> &IngestionReport {
        &self.report
    }

    /// Release all held client resources. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut broker) = self.broker.take() {
            broker.close();
        }
        self.resolver = None;
        self.admin = None;
        self.state = SourceState::Closed;
    }

    /// One-shot discovery: list topics, apply the inclusion rules, and
    /// make the single best-effort configuration request for the
    /// surviving set.
    async fn discover(&mut self) -> SourceResult<()> {
        let broker = self.broker.as_ref().ok_or(SourceError::Closed)?;
        let topics = broker.list_topics()?;
        self.report.topics_discovered = topics.len();

        let included: Vec<String> = topics
            .into_iter()
            .filter(|topic| self.filter.is_included(topic))
            .collect();
        self.report.topics_filtered = self.report.topics_discovered - included.len();
        log::info!(
            "discovered {} topics, {} selected by the inclusion rules",
            self.report.topics_discovered,
            included.len()
        );

        if let Some(admin) = &self.admin {
            match admin.describe_topic_configs(&included).await {
                Ok(configs) => self.topic_configs = configs,
                Err(e) => self.report.warn(
                    "topic-configs",
                    format!("failed to describe topic configs, properties will be skipped: {}", e),
                ),
            }
        }

        self.pending_topics = included.into();
        Ok(())
    }

    /// Resolve, merge and build one topic, queueing its snapshot and
    /// subtype record.
    async fn process_topic(&mut self, topic: &str) {
        log::debug!("processing topic {}", topic);

        let resolved = match self.resolver.as_ref() {
            Some(resolver) => Some(resolver.resolve(topic).await),
            None => None,
        };
        let pair = match resolved {
            Some(Ok(pair)) => pair,
            Some(Err(e)) => {
                self.report
                    .warn(topic, format!("schema lookup failed: {}", e));
                TopicSchemaPair::default()
            }
            None => TopicSchemaPair::default(),
        };

        let (merged, warnings) = merge_fields(&pair);
        let mut unsupported = Vec::new();
        for warning in warnings {
            match warning {
                SchemaWarning::UnsupportedFormat { subject, format } => {
                    unsupported.push(format!("{} ({})", subject, format));
                }
                SchemaWarning::Unparseable { subject, reason } => {
                    self.report.warn(
                        topic,
                        format!("unable to parse schema for subject {}: {}", subject, reason),
                    );
                }
            }
        }
        if !unsupported.is_empty() && !self.config.ignore_unsupported_schema_format {
            self.report.warn(
                topic,
                format!("unsupported schema format for: {}", unsupported.join(", ")),
            );
        }

        let configs = self.topic_configs.get(topic).map(|entries| entries.as_slice());
        let snapshot = self.builder.build(topic, &merged, configs);

        self.pending_items.push_back(SourceItem {
            id: topic.to_string(),
            record: SourceRecord::Snapshot(snapshot),
        });
        self.pending_items.push_back(SourceItem {
            id: format!("{}-subtypes", topic),
            record: SourceRecord::SubTypes(self.builder.subtypes(topic)),
        });
        self.report.records_emitted += 2;
    }
}

impl Drop for KafkaMetadataSource {
    fn drop(&mut self) {
        self.close();
    }
}

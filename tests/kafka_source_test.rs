//! End-to-end pipeline tests driven through in-memory capability
//! implementations: no broker, registry or admin endpoint is required.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use streamlens::{
    platform_instance_urn, BrokerClient, KafkaMetadataSource, PatternConfig, RegisteredSchema,
    SchemaFormat, SchemaRegistryApi, SourceConfig, SourceError, SourceItem, SourceResult,
    StatefulIngestionConfig, TopicConfigApi, TopicConfigEntry,
};

struct StaticBroker {
    topics: Vec<String>,
    list_calls: Arc<AtomicUsize>,
    close_calls: Arc<AtomicUsize>,
}

impl StaticBroker {
    fn new(topics: &[&str]) -> (Box<dyn BrokerClient>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let list_calls = Arc::new(AtomicUsize::new(0));
        let close_calls = Arc::new(AtomicUsize::new(0));
        let broker = Box::new(StaticBroker {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            list_calls: list_calls.clone(),
            close_calls: close_calls.clone(),
        });
        (broker, list_calls, close_calls)
    }
}

impl BrokerClient for StaticBroker {
    fn list_topics(&self) -> SourceResult<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.topics.clone())
    }

    fn close(&mut self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct StaticRegistry {
    schemas: HashMap<String, RegisteredSchema>,
}

impl StaticRegistry {
    fn new(schemas: Vec<RegisteredSchema>) -> Arc<dyn SchemaRegistryApi> {
        Arc::new(StaticRegistry {
            schemas: schemas.into_iter().map(|s| (s.subject.clone(), s)).collect(),
        })
    }
}

#[async_trait]
impl SchemaRegistryApi for StaticRegistry {
    async fn list_subjects(&self) -> SourceResult<Vec<String>> {
        let mut subjects: Vec<String> = self.schemas.keys().cloned().collect();
        subjects.sort();
        Ok(subjects)
    }

    async fn latest_version(&self, subject: &str) -> SourceResult<Option<RegisteredSchema>> {
        Ok(self.schemas.get(subject).cloned())
    }
}

struct StaticAdmin {
    configs: HashMap<String, Vec<TopicConfigEntry>>,
    fail: bool,
    describe_calls: Arc<AtomicUsize>,
}

impl StaticAdmin {
    fn with_configs(
        configs: HashMap<String, Vec<TopicConfigEntry>>,
    ) -> (Box<dyn TopicConfigApi>, Arc<AtomicUsize>) {
        let describe_calls = Arc::new(AtomicUsize::new(0));
        let admin = Box::new(StaticAdmin {
            configs,
            fail: false,
            describe_calls: describe_calls.clone(),
        });
        (admin, describe_calls)
    }

    fn failing() -> (Box<dyn TopicConfigApi>, Arc<AtomicUsize>) {
        let describe_calls = Arc::new(AtomicUsize::new(0));
        let admin = Box::new(StaticAdmin {
            configs: HashMap::new(),
            fail: true,
            describe_calls: describe_calls.clone(),
        });
        (admin, describe_calls)
    }
}

#[async_trait]
impl TopicConfigApi for StaticAdmin {
    async fn describe_topic_configs(
        &self,
        _topics: &[String],
    ) -> SourceResult<HashMap<String, Vec<TopicConfigEntry>>> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SourceError::registry("describe_configs blew up"));
        }
        Ok(self.configs.clone())
    }
}

fn avro_schema(subject: &str, record: &str, field: &str) -> RegisteredSchema {
    RegisteredSchema {
        subject: subject.to_string(),
        version: 1,
        schema_id: "1".to_string(),
        raw: format!(
            r#"{{"type":"record","name":"{}","namespace":"test.acryl","fields":[{{"name":"{}","type":"string"}}]}}"#,
            record, field
        ),
        format: SchemaFormat::Avro,
    }
}

fn unknown_schema(subject: &str) -> RegisteredSchema {
    RegisteredSchema {
        subject: subject.to_string(),
        version: 1,
        schema_id: "2".to_string(),
        raw: "{}".to_string(),
        format: SchemaFormat::Unknown("UNKNOWN_TYPE".to_string()),
    }
}

fn allow(patterns: &[&str]) -> PatternConfig {
    PatternConfig {
        allow: patterns.iter().map(|p| p.to_string()).collect(),
        deny: vec![],
    }
}

async fn collect(source: &mut KafkaMetadataSource) -> Vec<SourceItem> {
    source.collect_all().await.unwrap()
}

#[tokio::test]
async fn every_topic_yields_a_snapshot_and_a_subtype_record() {
    let (broker, list_calls, _) = StaticBroker::new(&["foobar", "bazbaz"]);
    let mut source = KafkaMetadataSource::with_clients(SourceConfig::default(), broker, None, None)
        .await
        .unwrap();

    let items = collect(&mut source).await;
    assert_eq!(items.len(), 4);
    assert_eq!(list_calls.load(Ordering::SeqCst), 1);

    assert!(items[0].snapshot().is_some());
    assert_eq!(items[0].id, "foobar");
    assert_eq!(items[1].subtypes().unwrap().type_names, vec!["Topic"]);
    assert_eq!(items[1].id, "foobar-subtypes");
    assert!(items[2].snapshot().is_some());
    assert_eq!(items[2].id, "bazbaz");
    assert!(items[3].subtypes().is_some());

    assert!(!source.report().has_warnings());
    assert_eq!(source.report().records_emitted, 4);
}

#[tokio::test]
async fn topic_patterns_limit_the_emitted_set() {
    let (broker, _, _) = StaticBroker::new(&["test", "foobar", "bazbaz"]);
    let config = SourceConfig {
        topic_patterns: allow(&["test"]),
        ..Default::default()
    };
    let mut source = KafkaMetadataSource::with_clients(config, broker, None, None)
        .await
        .unwrap();
    assert_eq!(collect(&mut source).await.len(), 2);
    assert_eq!(source.report().topics_filtered, 2);

    let (broker, _, _) = StaticBroker::new(&["test", "test2", "bazbaz"]);
    let config = SourceConfig {
        topic_patterns: allow(&["test.*"]),
        ..Default::default()
    };
    let mut source = KafkaMetadataSource::with_clients(config, broker, None, None)
        .await
        .unwrap();
    assert_eq!(collect(&mut source).await.len(), 4);
}

#[tokio::test]
async fn default_rules_hide_internal_topics() {
    let (broker, _, _) = StaticBroker::new(&["orders", "_schemas", "__consumer_offsets"]);
    let mut source = KafkaMetadataSource::with_clients(SourceConfig::default(), broker, None, None)
        .await
        .unwrap();
    let items = collect(&mut source).await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "orders");
}

#[tokio::test]
async fn platform_instance_qualifies_urn_aspect_and_browse_path() {
    let (broker, _, _) = StaticBroker::new(&["test"]);
    let config = SourceConfig {
        platform_instance: Some("kafka_cluster".to_string()),
        ..Default::default()
    };
    let mut source = KafkaMetadataSource::with_clients(config, broker, None, None)
        .await
        .unwrap();

    let items = collect(&mut source).await;
    assert_eq!(items.len(), 2);

    let snapshot = items[0].snapshot().unwrap();
    assert_eq!(
        snapshot.urn.as_str(),
        "urn:li:dataset:(urn:li:dataPlatform:kafka,kafka_cluster.test,PROD)"
    );
    assert_eq!(
        snapshot.platform_instance().unwrap().instance,
        platform_instance_urn("kafka", "kafka_cluster")
    );
    assert!(snapshot
        .browse_paths()
        .unwrap()
        .paths
        .contains(&"/prod/kafka/kafka_cluster/test".to_string()));
}

#[tokio::test]
async fn subject_name_strategies_resolve_key_and_value_schemas() {
    let (broker, list_calls, _) =
        StaticBroker::new(&["topic1", "topic2", "topic3", "schema_less_topic"]);

    let registry = StaticRegistry::new(vec![
        // TopicName strategy
        avro_schema("topic1-key", "Topic1Key", "t1key"),
        avro_schema("topic1-value", "Topic1Value", "t1value"),
        // RecordName strategy, reachable through the override map
        avro_schema("test.acryl.Topic2Key", "Topic2Key", "t2key"),
        avro_schema("test.acryl.Topic2Value", "Topic2Value", "t2value"),
        // TopicRecordName strategy
        avro_schema("topic3-test.acryl.Topic3Key-key", "Topic3Key", "t3key"),
        avro_schema("topic3-test.acryl.Topic3Value-value", "Topic3Value", "t3value"),
    ]);

    let config = SourceConfig {
        topic_subject_map: [
            ("topic2-key".to_string(), "test.acryl.Topic2Key".to_string()),
            ("topic2-value".to_string(), "test.acryl.Topic2Value".to_string()),
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    };

    let mut source = KafkaMetadataSource::with_clients(config, broker, Some(registry), None)
        .await
        .unwrap();
    let items = collect(&mut source).await;

    assert_eq!(items.len(), 8);
    assert_eq!(list_calls.load(Ordering::SeqCst), 1);

    for item in items.iter().take(6) {
        let Some(snapshot) = item.snapshot() else {
            continue;
        };
        let schema = snapshot.schema_aspect().expect("schema aspect expected");
        assert!(["topic1", "topic2", "topic3"].contains(&schema.schema_name.as_str()));
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.key_schema.as_deref().unwrap().contains("Key"));
        assert!(schema.value_schema.as_deref().unwrap().contains("Value"));
    }

    // The schema-less topic gets no schema aspect and no warning.
    let last_snapshot = items[6].snapshot().unwrap();
    assert_eq!(items[6].id, "schema_less_topic");
    assert!(last_snapshot.schema_aspect().is_none());
    assert!(!source.report().has_warnings());
}

#[tokio::test]
async fn unsupported_schema_format_warns_once_unless_suppressed() {
    for (suppress, expected_warnings) in [(false, 1), (true, 0)] {
        let (broker, _, _) = StaticBroker::new(&["topic1"]);
        let registry = StaticRegistry::new(vec![
            unknown_schema("topic1-key"),
            unknown_schema("topic1-value"),
        ]);
        let config = SourceConfig {
            ignore_unsupported_schema_format: suppress,
            ..Default::default()
        };

        let mut source = KafkaMetadataSource::with_clients(config, broker, Some(registry), None)
            .await
            .unwrap();
        let items = collect(&mut source).await;

        assert_eq!(items.len(), 2);
        assert!(items[0].snapshot().unwrap().schema_aspect().is_none());
        assert_eq!(source.report().warnings.len(), expected_warnings);
    }
}

#[tokio::test]
async fn admin_failure_degrades_to_no_properties_with_one_warning() {
    let (broker, _, _) = StaticBroker::new(&["test", "foobar", "bazbaz"]);
    let (admin, describe_calls) = StaticAdmin::failing();
    let config = SourceConfig {
        topic_patterns: allow(&["test"]),
        ..Default::default()
    };

    let mut source = KafkaMetadataSource::with_clients(config, broker, None, Some(admin))
        .await
        .unwrap();
    let items = collect(&mut source).await;

    assert_eq!(items.len(), 2);
    assert_eq!(describe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.report().warnings.len(), 1);
    assert!(items[0].snapshot().unwrap().properties().is_none());
}

#[tokio::test]
async fn fetched_configs_become_properties_aspects() {
    let (broker, _, _) = StaticBroker::new(&["with-config", "without-config"]);
    let configs: HashMap<String, Vec<TopicConfigEntry>> = [(
        "with-config".to_string(),
        vec![TopicConfigEntry {
            name: "retention.ms".to_string(),
            value: "604800000".to_string(),
        }],
    )]
    .into_iter()
    .collect();
    let (admin, _) = StaticAdmin::with_configs(configs);

    let mut source =
        KafkaMetadataSource::with_clients(SourceConfig::default(), broker, None, Some(admin))
            .await
            .unwrap();
    let items = collect(&mut source).await;

    let with_config = items[0].snapshot().unwrap();
    assert_eq!(
        with_config
            .properties()
            .unwrap()
            .custom_properties
            .get("retention.ms")
            .unwrap(),
        "604800000"
    );
    // A topic missing from the batch response simply has no properties.
    let without_config = items[2].snapshot().unwrap();
    assert!(without_config.properties().is_none());
    assert!(!source.report().has_warnings());
}

#[tokio::test]
async fn stateful_ingestion_without_platform_instance_fails_before_discovery() {
    let (broker, list_calls, _) = StaticBroker::new(&["test"]);
    let config = SourceConfig {
        stateful_ingestion: StatefulIngestionConfig { enabled: true },
        ..Default::default()
    };

    let err = KafkaMetadataSource::with_clients(config, broker, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Configuration { .. }));
    assert!(err.to_string().contains("platform instance"));
    assert_eq!(list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn close_releases_clients_and_is_idempotent() {
    let (broker, _, close_calls) = StaticBroker::new(&["test"]);
    let mut source = KafkaMetadataSource::with_clients(SourceConfig::default(), broker, None, None)
        .await
        .unwrap();

    source.close();
    source.close();
    assert_eq!(close_calls.load(Ordering::SeqCst), 1);

    // A closed source yields nothing further.
    assert!(source.next_item().await.unwrap().is_none());
}

#[tokio::test]
async fn exhausting_the_stream_closes_the_broker_client() {
    let (broker, _, close_calls) = StaticBroker::new(&["test"]);
    let mut source = KafkaMetadataSource::with_clients(SourceConfig::default(), broker, None, None)
        .await
        .unwrap();

    let _ = collect(&mut source).await;
    assert_eq!(close_calls.load(Ordering::SeqCst), 1);
    drop(source);
}

#[tokio::test]
async fn registry_listing_failure_is_fatal_at_construction() {
    struct DownRegistry;

    #[async_trait]
    impl SchemaRegistryApi for DownRegistry {
        async fn list_subjects(&self) -> SourceResult<Vec<String>> {
            Err(SourceError::registry("connection refused"))
        }

        async fn latest_version(&self, _: &str) -> SourceResult<Option<RegisteredSchema>> {
            Ok(None)
        }
    }

    let (broker, list_calls, _) = StaticBroker::new(&["test"]);
    let err = KafkaMetadataSource::with_clients(
        SourceConfig::default(),
        broker,
        Some(Arc::new(DownRegistry)),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SourceError::Registry { .. }));
    assert_eq!(list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn degraded_run_report_serializes_with_warnings() {
    let (broker, _, _) = StaticBroker::new(&["topic1"]);
    let registry = StaticRegistry::new(vec![unknown_schema("topic1-value")]);
    let (admin, _) = StaticAdmin::failing();

    let mut source = KafkaMetadataSource::with_clients(
        SourceConfig::default(),
        broker,
        Some(registry),
        Some(admin),
    )
    .await
    .unwrap();
    let _ = collect(&mut source).await;

    let json = serde_json::to_value(source.report()).unwrap();
    assert_eq!(json["topics_discovered"], 1);
    assert_eq!(json["records_emitted"], 2);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 2);
}

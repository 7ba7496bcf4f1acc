//! Subject name resolution
//!
//! A schema registry associates a topic with its key/value schemas through
//! one of three incompatible subject naming conventions. For a given topic
//! the resolver probes them in fixed priority order and short-circuits on
//! the first hit; there is no merging across strategies, and key and value
//! resolve independently of each other.
//!
//! The `RecordName` convention names the subject after the record's fully
//! qualified name, which is not derivable from the topic, so it can only be
//! honored through the explicit per-topic override map. The override map
//! outranks every probed strategy either way.

use crate::streamlens::error::SourceResult;
use crate::streamlens::registry::{RegisteredSchema, SchemaRegistryApi};
use std::collections::HashMap;
use std::sync::Arc;

/// Subject naming conventions, in probe priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectNameStrategy {
    /// `<topic>-key` / `<topic>-value`
    TopicName,
    /// Subject equals the fully qualified record name; reachable only via
    /// the override map
    RecordName,
    /// `<topic>-<fully.qualified.RecordName>-key` / `...-value`
    TopicRecordName,
}

/// Which half of a topic's schema pair is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSide {
    Key,
    Value,
}

impl SchemaSide {
    fn suffix(&self) -> &'static str {
        match self {
            SchemaSide::Key => "-key",
            SchemaSide::Value => "-value",
        }
    }
}

/// Key/value schemas resolved for one topic; either or both sides may be
/// absent (the schema-less case)
#[derive(Debug, Clone, Default)]
pub struct TopicSchemaPair {
    pub key: Option<RegisteredSchema>,
    pub value: Option<RegisteredSchema>,
}

impl TopicSchemaPair {
    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.value.is_none()
    }
}

/// Resolves topics to registry subjects for the duration of one run
pub struct SubjectResolver {
    registry: Arc<dyn SchemaRegistryApi>,
    /// Subject list fetched once when the source connects
    subjects: Vec<String>,
    overrides: HashMap<String, String>,
}

impl SubjectResolver {
    pub fn new(
        registry: Arc<dyn SchemaRegistryApi>,
        subjects: Vec<String>,
        overrides: HashMap<String, String>,
    ) -> Self {
        Self {
            registry,
            subjects,
            overrides,
        }
    }

    /// Determine the subject holding one side of a topic's schema, if any,
    /// along with the strategy that produced the match.
    pub fn subject_for(
        &self,
        topic: &str,
        side: SchemaSide,
    ) -> Option<(String, SubjectNameStrategy)> {
        let keyed = format!("{}{}", topic, side.suffix());

        if let Some(subject) = self.overrides.get(&keyed) {
            return Some((subject.clone(), SubjectNameStrategy::RecordName));
        }

        if self.subjects.iter().any(|s| *s == keyed) {
            return Some((keyed, SubjectNameStrategy::TopicName));
        }

        let prefix = format!("{}-", topic);
        self.subjects
            .iter()
            .find(|s| s.starts_with(&prefix) && s.ends_with(side.suffix()))
            .map(|s| (s.clone(), SubjectNameStrategy::TopicRecordName))
    }

    /// Resolve the key and value schemas for a topic. A miss on either
    /// side leaves that side empty; only transport failures are errors.
    pub async fn resolve(&self, topic: &str) -> SourceResult<TopicSchemaPair> {
        let mut pair = TopicSchemaPair::default();

        for side in [SchemaSide::Key, SchemaSide::Value] {
            let Some((subject, strategy)) = self.subject_for(topic, side) else {
                continue;
            };
            log::debug!(
                "topic {} {:?} schema resolved to subject {} via {:?}",
                topic,
                side,
                subject,
                strategy
            );
            let schema = self.registry.latest_version(&subject).await?;
            match side {
                SchemaSide::Key => pair.key = schema,
                SchemaSide::Value => pair.value = schema,
            }
        }

        Ok(pair)
    }
}

//! Broker-facing capabilities
//!
//! Two narrow client surfaces: topic discovery over a metadata-only
//! consumer, and best-effort topic configuration lookup over the admin
//! API. Both are behind traits so the pipeline can be driven by in-memory
//! implementations in tests.

pub mod admin;
pub mod broker;

pub use admin::{AdminConfigClient, TopicConfigApi, TopicConfigEntry};
pub use broker::{BrokerClient, MetadataConsumer};

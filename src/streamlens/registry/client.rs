//! Schema Registry HTTP client
//!
//! Thin client for the Confluent Schema Registry subject API with optional
//! basic/bearer authentication. Only the two read endpoints the pipeline
//! needs are implemented: `GET /subjects` and
//! `GET /subjects/{subject}/versions/latest`.

use crate::streamlens::config::RegistryAuth;
use crate::streamlens::error::{SourceError, SourceResult};
use crate::streamlens::registry::{RegisteredSchema, SchemaFormat, SchemaRegistryApi};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// reqwest-backed registry client
pub struct HttpSchemaRegistry {
    base_url: String,
    auth: Option<RegistryAuth>,
    http_client: Client,
    timeout: Duration,
}

/// API response for a subject's latest version
#[derive(Debug, Deserialize)]
struct SubjectVersionResponse {
    subject: String,
    version: i32,
    id: i64,
    schema: String,
    #[serde(rename = "schemaType")]
    schema_type: Option<String>,
}

impl HttpSchemaRegistry {
    /// Create a new registry client
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: None,
            http_client: Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set authentication configuration
    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get(&self, url: &str) -> SourceResult<reqwest::Response> {
        let mut request = self
            .http_client
            .get(url)
            .header("Accept", "application/vnd.schemaregistry.v1+json")
            .timeout(self.timeout);

        if let Some(auth) = &self.auth {
            request = match auth {
                RegistryAuth::Basic { username, password } => {
                    request.basic_auth(username, Some(password))
                }
                RegistryAuth::Bearer { token } => request.bearer_auth(token),
            };
        }

        request
            .send()
            .await
            .map_err(|e| SourceError::registry(format!("request to {} failed: {}", url, e)))
    }
}

#[async_trait]
impl SchemaRegistryApi for HttpSchemaRegistry {
    async fn list_subjects(&self) -> SourceResult<Vec<String>> {
        let url = format!("{}/subjects", self.base_url);
        let response = self.get(&url).await?;

        if !response.status().is_success() {
            return Err(SourceError::registry(format!(
                "listing subjects failed with status {}",
                response.status()
            )));
        }

        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| SourceError::registry(format!("failed to parse subjects response: {}", e)))
    }

    async fn latest_version(&self, subject: &str) -> SourceResult<Option<RegisteredSchema>> {
        let url = format!("{}/subjects/{}/versions/latest", self.base_url, subject);
        let response = self.get(&url).await?;

        // An unregistered subject is the schema-less case, not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SourceError::registry(format!(
                "lookup of subject {} failed with status {}",
                subject,
                response.status()
            )));
        }

        let version: SubjectVersionResponse = response
            .json()
            .await
            .map_err(|e| SourceError::registry(format!("failed to parse version response: {}", e)))?;

        Ok(Some(RegisteredSchema {
            subject: version.subject,
            version: version.version,
            schema_id: version.id.to_string(),
            raw: version.schema,
            format: SchemaFormat::from_registry_type(version.schema_type.as_deref()),
        }))
    }
}

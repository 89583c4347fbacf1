//! REST client surface of the model serving API

use crate::descriptor::{ModelDescriptor, ModelKind};
use crate::error::{ConsoleError, ConsoleResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// Wire Types
// ============================================================================

/// Body of a launch request, built fresh for every attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub model_uid: String,
    pub model_name: String,
    pub model_type: String,
}

impl LaunchRequest {
    /// Build a request from the card's identifier input
    ///
    /// Surrounding whitespace is trimmed; blank input falls back to a fresh
    /// time-based UID. No further validation happens on the client.
    pub fn new(uid_input: &str, model_name: &str, kind: ModelKind) -> Self {
        let trimmed = uid_input.trim();
        let model_uid = if trimmed.is_empty() {
            generate_model_uid()
        } else {
            trimmed.to_string()
        };

        Self {
            model_uid,
            model_name: model_name.to_string(),
            model_type: kind.as_str().to_string(),
        }
    }
}

/// Generate a time-based (version 1) model UID
pub fn generate_model_uid() -> String {
    static NODE_ID: OnceLock<[u8; 6]> = OnceLock::new();

    // Random node id, fixed for the lifetime of the process
    let node_id = NODE_ID.get_or_init(|| {
        let seed = Uuid::new_v4();
        let bytes = seed.as_bytes();
        [
            bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
        ]
    });

    Uuid::now_v1(node_id).to_string()
}

/// Catalog entry from the registrations listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    #[serde(flatten)]
    pub descriptor: ModelDescriptor,

    /// Built-in models ship with the server; everything else was registered
    /// by a user and can be deleted
    #[serde(default)]
    pub is_builtin: bool,
}

impl Registration {
    pub fn is_custom(&self) -> bool {
        !self.is_builtin
    }
}

/// Entry in the running-models listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningModel {
    pub model_name: String,
    pub model_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica: Option<u32>,
}

/// Error body shape used by the serving API
#[derive(Debug, Deserialize)]
struct DetailBody {
    detail: String,
}

// ============================================================================
// Trait Definition
// ============================================================================

/// Client-side surface of the model serving API
#[async_trait]
pub trait ModelApi: Send + Sync {
    /// Launch a model instance
    async fn launch_model(&self, request: &LaunchRequest) -> ConsoleResult<()>;

    /// Remove a custom model registration
    async fn unregister_model(&self, kind: ModelKind, model_name: &str) -> ConsoleResult<()>;

    /// List registrations for one model type
    async fn list_registrations(&self, kind: ModelKind) -> ConsoleResult<Vec<Registration>>;

    /// List running model instances, keyed by model UID
    async fn list_running(&self) -> ConsoleResult<BTreeMap<String, RunningModel>>;

    /// Terminate a running model instance
    async fn terminate_model(&self, model_uid: &str) -> ConsoleResult<()>;
}

// ============================================================================
// Production Implementation
// ============================================================================

/// REST implementation over reqwest
pub struct RestModelApi {
    client: reqwest::Client,
    base_url: String,
}

impl RestModelApi {
    /// Create a client against the given endpoint
    ///
    /// `base_url` must not end with a slash. A `request_timeout` of `None`
    /// keeps the transport default; a launch can legitimately take minutes
    /// while the server pulls model weights.
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Option<Duration>,
    ) -> ConsoleResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a non-success response to `ConsoleError::Server`
    async fn check(response: reqwest::Response) -> ConsoleResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The serving API reports failures as {"detail": "..."}; any other
        // body shape collapses to no detail
        let detail = response
            .json::<DetailBody>()
            .await
            .ok()
            .map(|body| body.detail);

        Err(ConsoleError::Server {
            status: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl ModelApi for RestModelApi {
    async fn launch_model(&self, request: &LaunchRequest) -> ConsoleResult<()> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn unregister_model(&self, kind: ModelKind, model_name: &str) -> ConsoleResult<()> {
        let url = format!(
            "{}/v1/model_registrations/{}/{}",
            self.base_url,
            kind.as_str(),
            urlencoding::encode(model_name)
        );
        let response = self.client.delete(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_registrations(&self, kind: ModelKind) -> ConsoleResult<Vec<Registration>> {
        let url = format!(
            "{}/v1/model_registrations/{}",
            self.base_url,
            kind.as_str()
        );
        let response = self.client.get(&url).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn list_running(&self) -> ConsoleResult<BTreeMap<String, RunningModel>> {
        let url = format!("{}/v1/models", self.base_url);
        let response = self.client.get(&url).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn terminate_model(&self, model_uid: &str) -> ConsoleResult<()> {
        let url = format!(
            "{}/v1/models/{}",
            self.base_url,
            urlencoding::encode(model_uid)
        );
        let response = self.client.delete(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

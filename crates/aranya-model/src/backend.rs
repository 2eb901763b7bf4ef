//! Backend trait over generative model providers.
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use aranya_core::{DataUri, HerbError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("missing credential: {0}")]
    MissingCredential(String),
}

impl From<ModelError> for HerbError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::MissingCredential(msg) => HerbError::Configuration(msg),
            other => HerbError::Model(other.to_string()),
        }
    }
}

/// One structured model call
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Prompt id, used for logging and by scripted backends
    pub prompt_id: String,
    pub system: Option<String>,
    pub text: String,
    /// Images sent alongside the text
    pub media: Vec<DataUri>,
    /// Ask the provider for a JSON response body
    pub json_output: bool,
}

impl ModelRequest {
    pub fn new(prompt_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            system: None,
            text: text.into(),
            media: Vec::new(),
            json_output: false,
        }
    }

    pub fn with_system(mut self, system: Option<String>) -> Self {
        self.system = system;
        self
    }

    pub fn with_media(mut self, media: Vec<DataUri>) -> Self {
        self.media = media;
        self
    }

    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Backend identifier (e.g. model name)
    fn id(&self) -> &str;

    /// Whether credentials are present. Checked before any request is built.
    fn is_configured(&self) -> bool {
        true
    }

    /// Generate a completion and return the raw text of the reply
    async fn generate(&self, request: ModelRequest) -> Result<String, ModelError>;
}

#[async_trait]
impl ModelBackend for Arc<dyn ModelBackend> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }

    async fn generate(&self, request: ModelRequest) -> Result<String, ModelError> {
        (**self).generate(request).await
    }
}

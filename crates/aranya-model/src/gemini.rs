//! Gemini backend.
//!
//! Calls `models/{model}:generateContent` with the prompt text and any images
//! as inline data parts.
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{ModelBackend, ModelError, ModelRequest};

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; empty means unconfigured
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    /// Transport timeout, separate from the per-stage deadline
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.4,
            timeout_secs: 120,
        }
    }
}

pub struct GeminiBackend {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::Http(e.to_string()))?;
        info!(model = %config.model, configured = !config.api_key.is_empty(), "gemini backend ready");
        Ok(Self { client, config })
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_body(&self, request: ModelRequest) -> GeminiRequest {
        let mut parts = vec![GeminiPart::Text { text: request.text }];
        parts.extend(request.media.into_iter().map(|media| GeminiPart::InlineData {
            inline_data: InlineData {
                mime_type: media.mime_type,
                data: media.data,
            },
        }));

        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            system_instruction: request.system.map(|system| GeminiSystemInstruction {
                parts: vec![GeminiPart::Text { text: system }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: request.json_output.then(|| "application/json".to_string()),
            },
        }
    }
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    fn id(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    async fn generate(&self, request: ModelRequest) -> Result<String, ModelError> {
        if !self.is_configured() {
            return Err(ModelError::MissingCredential(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        let prompt_id = request.prompt_id.clone();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(self.config.api_key.trim())
            .map_err(|_| ModelError::MissingCredential("API key is not a valid header value".to_string()))?;
        headers.insert("x-goog-api-key", key);

        let body = self.build_body(request);
        debug!(prompt = %prompt_id, model = %self.config.model, "calling gemini");

        let response = self
            .client
            .post(self.build_url())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::Http(e.to_string()))?;

        let parsed: Option<GeminiResponse> = serde_json::from_str(&text).ok();

        // Check for API error
        if let Some(error) = parsed.as_ref().and_then(|p| p.error.as_ref()) {
            return Err(ModelError::Response(format!(
                "Gemini API error: {}",
                error.message
            )));
        }
        if !status.is_success() {
            return Err(ModelError::Response(format!("HTTP {}: {}", status, text)));
        }

        let parsed = parsed.ok_or_else(|| {
            ModelError::Serialization("unreadable generateContent response".to_string())
        })?;
        let candidate = parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| ModelError::Response("No candidates in response".to_string()))?;

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ModelError::Response(format!(
                "No content in response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(content)
    }
}

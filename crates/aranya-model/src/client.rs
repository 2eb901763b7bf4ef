//! Prompt-Model Client: `invoke(prompt, input) -> output`
//!
//! Input is validated before the prompt is rendered; output must parse into
//! the declared type and pass its contract, otherwise the call is a schema
//! violation and nothing partially typed escapes.
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use aranya_core::{Contract, DataUri, HerbError};
use aranya_prompt::{PromptRenderer, RenderedPrompt};

use crate::backend::{ModelBackend, ModelRequest};
use crate::output::extract_json;

const MAX_PROMPT_LOG_CHARS: usize = 2_000;

#[derive(Clone)]
pub struct PromptModelClient {
    backend: Arc<dyn ModelBackend>,
    renderer: Arc<PromptRenderer>,
}

impl PromptModelClient {
    pub fn new(backend: Arc<dyn ModelBackend>, renderer: Arc<PromptRenderer>) -> Self {
        Self { backend, renderer }
    }

    /// Structured call: the reply must be a JSON object matching `O`.
    pub async fn invoke<I, O>(
        &self,
        prompt_id: &str,
        input: &I,
        media: Vec<DataUri>,
    ) -> Result<O, HerbError>
    where
        I: Serialize + Contract + Sync,
        O: DeserializeOwned + Contract,
    {
        let prompt = self.prepare(prompt_id, input)?;
        let request = self.request(prompt, media).with_json_output();
        let raw = self.backend.generate(request).await?;

        let value = extract_json(&raw)
            .map_err(|e| HerbError::SchemaViolation(format!("{}: {}", prompt_id, e)))?;
        let output: O = serde_json::from_value(value)
            .map_err(|e| HerbError::SchemaViolation(format!("{}: {}", prompt_id, e)))?;
        output
            .validate()
            .map_err(|e| HerbError::SchemaViolation(format!("{}: {}", prompt_id, e)))?;

        Ok(output)
    }

    fn prepare<I>(&self, prompt_id: &str, input: &I) -> Result<RenderedPrompt, HerbError>
    where
        I: Serialize + Contract,
    {
        if !self.backend.is_configured() {
            return Err(HerbError::Configuration(format!(
                "model backend '{}' has no API credential",
                self.backend.id()
            )));
        }

        input.validate().map_err(HerbError::Validation)?;

        let data = serde_json::to_value(input)
            .map_err(|e| HerbError::Validation(format!("{}: {}", prompt_id, e)))?;
        let prompt = self
            .renderer
            .render(prompt_id, &data)
            .map_err(|e| HerbError::Template(e.to_string()))?;

        debug!(
            prompt = prompt_id,
            text = %truncate(&prompt.text, MAX_PROMPT_LOG_CHARS),
            "rendered prompt"
        );
        Ok(prompt)
    }

    fn request(&self, prompt: RenderedPrompt, media: Vec<DataUri>) -> ModelRequest {
        ModelRequest::new(prompt.id, prompt.text)
            .with_system(prompt.system)
            .with_media(media)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedBackend;
    use serde::Deserialize;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct HerbName {
        herb_name: String,
    }

    impl Contract for HerbName {
        fn validate(&self) -> Result<(), String> {
            if self.herb_name.trim().is_empty() {
                Err("herbName is required".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Category {
        category: String,
    }

    impl Contract for Category {
        fn validate(&self) -> Result<(), String> {
            if self.category.is_empty() {
                Err("category is empty".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn client(backend: Arc<ScriptedBackend>) -> PromptModelClient {
        PromptModelClient::new(backend, Arc::new(PromptRenderer::bundled().unwrap()))
    }

    fn input(name: &str) -> HerbName {
        HerbName {
            herb_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_invoke_parses_output() {
        let backend = Arc::new(ScriptedBackend::new().reply("categorize_herb", r#"{"category":"Medicinal"}"#));
        let out: Category = client(backend.clone())
            .invoke("categorize_herb", &input("Neem"), Vec::new())
            .await
            .unwrap();

        assert_eq!(out.category, "Medicinal");
        assert_eq!(backend.calls(), 1);
        let request = backend.requests().pop().unwrap();
        assert!(request.json_output);
        assert!(request.text.contains("\"Neem\""));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_model() {
        let backend = Arc::new(ScriptedBackend::new().reply("categorize_herb", r#"{"category":"Medicinal"}"#));
        let err = client(backend.clone())
            .invoke::<_, Category>("categorize_herb", &input("  "), Vec::new())
            .await
            .unwrap_err();

        assert_eq!(err, HerbError::Validation("herbName is required".to_string()));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_schema_violation() {
        let backend = Arc::new(ScriptedBackend::new().reply("categorize_herb", r#"{"kind":"Medicinal"}"#));
        let err = client(backend)
            .invoke::<_, Category>("categorize_herb", &input("Neem"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HerbError::SchemaViolation(msg) if msg.contains("category")));
    }

    #[tokio::test]
    async fn test_contract_failure_is_schema_violation() {
        let backend = Arc::new(ScriptedBackend::new().reply("categorize_herb", r#"{"category":""}"#));
        let err = client(backend)
            .invoke::<_, Category>("categorize_herb", &input("Neem"), Vec::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            HerbError::SchemaViolation("categorize_herb: category is empty".to_string())
        );
    }

    #[tokio::test]
    async fn test_unconfigured_backend_fails_fast() {
        let backend = Arc::new(ScriptedBackend::new().unconfigured());
        let err = client(backend.clone())
            .invoke::<_, Category>("categorize_herb", &input("Neem"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HerbError::Configuration(_)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_prompt_is_template_error() {
        let backend = Arc::new(ScriptedBackend::new());
        let err = client(backend)
            .invoke::<_, Category>("no_such_prompt", &input("Neem"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HerbError::Template(_)));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}

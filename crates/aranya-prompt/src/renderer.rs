//! Prompt rendering.
//!
//! Uses Handlebars with literal interpolation (no HTML escaping) and a few
//! helpers:
//! - media: reference an attached image, `{{media url=photoDataUri}}`
//! - default: fall back when a value is missing or blank

use handlebars::{Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext};
use serde::Serialize;
use serde_json::Value;

use crate::templates::PromptFile;
use crate::PromptError;

/// A prompt ready to send to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPrompt {
    pub id: String,
    pub system: Option<String>,
    pub text: String,
}

pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
    prompts: PromptFile,
}

impl PromptRenderer {
    pub fn new(prompts: PromptFile) -> Result<Self, PromptError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("media", Box::new(MediaHelper));
        handlebars.register_helper("default", Box::new(DefaultHelper));

        for (id, prompt) in &prompts.prompts {
            handlebars
                .register_template_string(id, &prompt.template)
                .map_err(|e| PromptError::Template {
                    id: id.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(PromptRenderer { handlebars, prompts })
    }

    /// Load a prompt file from disk. It must define every stage prompt.
    pub fn load(path: &str) -> Result<Self, PromptError> {
        let prompts = PromptFile::load(path)?;
        prompts.ensure_complete()?;
        Self::new(prompts)
    }

    pub fn bundled() -> Result<Self, PromptError> {
        Self::new(PromptFile::bundled()?)
    }

    /// Render a named prompt over its input
    pub fn render(&self, id: &str, data: &Value) -> Result<RenderedPrompt, PromptError> {
        let prompt = self
            .prompts
            .get(id)
            .ok_or_else(|| PromptError::Missing(id.to_string()))?;

        let text = self
            .handlebars
            .render(id, data)
            .map_err(|e| PromptError::Render(e.to_string()))?;

        Ok(RenderedPrompt {
            id: id.to_string(),
            system: prompt
                .system
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            text: text.trim().to_string(),
        })
    }

}

// ============================================================================
// Custom Helpers
// ============================================================================

/// Marks where an attached image belongs in the prompt text.
///
/// The image bytes travel beside the text as an inline part; the marker only
/// names the media type so the payload is never interpolated.
struct MediaHelper;

impl HelperDef for MediaHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let url = h
            .hash_get("url")
            .and_then(|v| v.value().as_str())
            .or_else(|| h.param(0).and_then(|v| v.value().as_str()))
            .unwrap_or("");

        let mime = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|m| !m.is_empty())
            .unwrap_or("image");

        out.write(&format!("[attached media: {}]", mime))?;
        Ok(())
    }
}

struct DefaultHelper;

impl HelperDef for DefaultHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let fallback = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");

        match h.param(0).map(|v| v.value()) {
            Some(Value::String(s)) if !s.trim().is_empty() => out.write(s)?,
            Some(Value::Number(n)) => out.write(&n.to_string())?,
            Some(Value::Bool(b)) => out.write(&b.to_string())?,
            _ => out.write(fallback)?,
        }
        Ok(())
    }
}

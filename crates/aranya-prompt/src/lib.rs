//! Aranya prompts: templated model instructions
//!
//! Prompts are a pure formatting function over validated stage input. The
//! bundled `prompts/herb-prompts.yaml` holds one entry per stage; a file at
//! another path can replace it.
//!
//! # Example
//!
//! ```ignore
//! use aranya_prompt::PromptRenderer;
//! use serde_json::json;
//!
//! let renderer = PromptRenderer::bundled()?;
//! let prompt = renderer.render("categorize_herb", &json!({ "herbName": "Neem" }))?;
//! println!("{}", prompt.text);
//! ```

pub mod renderer;
pub mod templates;

pub use renderer::{PromptRenderer, RenderedPrompt};
pub use templates::{PromptFile, PromptTemplate};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file load failed: {0}")]
    Load(String),
    #[error("Prompt file parse failed: {0}")]
    Parse(String),
    #[error("Template '{id}' is invalid: {reason}")]
    Template { id: String, reason: String },
    #[error("Unknown prompt '{0}'")]
    Missing(String),
    #[error("Render failed: {0}")]
    Render(String),
}

/// Prompt ids used by the stages
pub mod ids {
    pub const IDENTIFY_HERB: &str = "identify_herb";
    pub const CATEGORIZE_HERB: &str = "categorize_herb";
    pub const AYURVEDIC_APPLICATIONS: &str = "ayurvedic_applications";
    pub const HERB_LOCATIONS: &str = "herb_locations";
    pub const ARANYA_CHAT: &str = "aranya_chat";

    pub const ALL: [&str; 5] = [
        IDENTIFY_HERB,
        CATEGORIZE_HERB,
        AYURVEDIC_APPLICATIONS,
        HERB_LOCATIONS,
        ARANYA_CHAT,
    ];
}

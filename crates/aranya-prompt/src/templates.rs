//! Prompt file loading.
//!
//! Format:
//! ```yaml
//! version: "1.0"
//! prompts:
//!   categorize_herb:
//!     description: Classify a herb by name
//!     system: "You are an expert botanist."   # optional
//!     template: "Herb: {{herbName}}"
//! ```

use serde::Deserialize;
use std::collections::HashMap;

use crate::PromptError;

const BUNDLED: &str = include_str!("../prompts/herb-prompts.yaml");

#[derive(Debug, Clone, Deserialize)]
pub struct PromptFile {
    pub version: String,
    pub prompts: HashMap<String, PromptTemplate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplate {
    pub description: String,
    /// Persona or system instruction, sent as-is
    #[serde(default)]
    pub system: Option<String>,
    pub template: String,
}

impl PromptFile {
    pub fn load(path: &str) -> Result<Self, PromptError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PromptError::Load(format!("{}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, PromptError> {
        serde_yaml::from_str(yaml).map_err(|e| PromptError::Parse(e.to_string()))
    }

    /// The prompts shipped with the crate
    pub fn bundled() -> Result<Self, PromptError> {
        Self::from_yaml(BUNDLED)
    }

    pub fn get(&self, id: &str) -> Option<&PromptTemplate> {
        self.prompts.get(id)
    }

    /// Fails on the first stage prompt the file does not define
    pub fn ensure_complete(&self) -> Result<(), PromptError> {
        match crate::ids::ALL.iter().find(|id| !self.prompts.contains_key(**id)) {
            Some(id) => Err(PromptError::Missing(id.to_string())),
            None => Ok(()),
        }
    }
}

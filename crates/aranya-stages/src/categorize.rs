use async_trait::async_trait;
use serde::Serialize;

use aranya_core::{Categorization, Contract, ExecutionContext, HerbError, Stage};
use aranya_model::PromptModelClient;
use aranya_prompt::ids;

/// Only the herb name: a saved record can be re-categorized without its photo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeInput {
    pub herb_name: String,
}

impl CategorizeInput {
    pub fn new(herb_name: impl Into<String>) -> Self {
        Self {
            herb_name: herb_name.into(),
        }
    }
}

impl Contract for CategorizeInput {
    fn validate(&self) -> Result<(), String> {
        if self.herb_name.trim().is_empty() {
            return Err("herbName is required".to_string());
        }
        Ok(())
    }
}

pub struct CategorizationStage {
    client: PromptModelClient,
}

impl CategorizationStage {
    pub fn new(client: PromptModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Stage for CategorizationStage {
    type Input = CategorizeInput;
    type Output = Categorization;

    fn id(&self) -> &'static str {
        "categorize.herb.v1"
    }

    async fn run(
        &self,
        input: &Self::Input,
        _ctx: &ExecutionContext,
    ) -> Result<Self::Output, HerbError> {
        self.client
            .invoke(ids::CATEGORIZE_HERB, input, Vec::new())
            .await
    }
}

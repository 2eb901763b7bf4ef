use async_trait::async_trait;
use serde::Serialize;

use aranya_core::{
    AyurvedicApplications, AyurvedicRelevance, Contract, ExecutionContext, HerbError, Stage,
};
use aranya_model::PromptModelClient;
use aranya_prompt::ids;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AyurvedicInput {
    pub herb_name: String,
    /// Free text, usually the identified herb's uses
    pub herb_description: String,
}

impl AyurvedicInput {
    pub fn new(herb_name: impl Into<String>, herb_description: impl Into<String>) -> Self {
        Self {
            herb_name: herb_name.into(),
            herb_description: herb_description.into(),
        }
    }
}

impl Contract for AyurvedicInput {
    fn validate(&self) -> Result<(), String> {
        if self.herb_name.trim().is_empty() {
            return Err("herbName is required".to_string());
        }
        Ok(())
    }
}

/// Ayurvedic uses of a herb. "No documented use" is the `NotApplicable`
/// variant, not an error.
pub struct AyurvedicStage {
    client: PromptModelClient,
}

impl AyurvedicStage {
    pub fn new(client: PromptModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Stage for AyurvedicStage {
    type Input = AyurvedicInput;
    type Output = AyurvedicRelevance;

    fn id(&self) -> &'static str {
        "ayurvedic.applications.v1"
    }

    async fn run(
        &self,
        input: &Self::Input,
        _ctx: &ExecutionContext,
    ) -> Result<Self::Output, HerbError> {
        let wire: AyurvedicApplications = self
            .client
            .invoke(ids::AYURVEDIC_APPLICATIONS, input, Vec::new())
            .await?;
        Ok(wire.into())
    }
}

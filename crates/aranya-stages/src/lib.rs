//! Aranya Stages: the model-backed stages and the analysis orchestrator.
//!
//! # Pipeline Flow
//!
//! ```text
//! photo → identify ─┬──────────────→ ayurvedic → composite
//!        identify → categorize ─┘
//!
//! herb name → geo prediction → 8-12 locations
//! question  → assistant      → markdown answer
//! ```
//!
//! Geo prediction and the assistant are independent of the analysis run.

mod assistant;
mod ayurvedic;
mod categorize;
mod geo;
mod identify;
mod orchestrator;

pub use assistant::{
    compose_answer, AssistantReply, AssistantStage, CLOSING_PHRASE, DECLINE, DISCLAIMER,
    DISCLAIMER_CORE,
};
pub use ayurvedic::{AyurvedicInput, AyurvedicStage};
pub use categorize::{CategorizationStage, CategorizeInput};
pub use geo::{GeoPredictionSet, GeoPredictionStage};
pub use identify::{IdentificationStage, IdentifyInput};
pub use orchestrator::{AnalysisObserver, Orchestrator, OrchestratorOptions};

use std::sync::Arc;

use aranya_core::{run_stage, ChatAnswer, ChatRequest, GeoPrediction, GeoRequest, HerbError};
use aranya_model::PromptModelClient;

/// Every pipeline the service exposes, sharing one model client
pub struct HerbPipelines {
    pub analysis: Orchestrator,
    pub geo: GeoPredictionStage,
    pub assistant: AssistantStage,
}

impl HerbPipelines {
    pub fn new(client: PromptModelClient, options: OrchestratorOptions) -> Self {
        Self {
            analysis: Orchestrator::new(client.clone(), options),
            geo: GeoPredictionStage::new(client.clone()),
            assistant: AssistantStage::new(client),
        }
    }

    /// Report every analysis outcome to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn AnalysisObserver>) -> Self {
        self.analysis = self.analysis.with_observer(observer);
        self
    }

    pub async fn predict_locations(
        &self,
        request: &GeoRequest,
    ) -> Result<Vec<GeoPrediction>, HerbError> {
        let ctx = self.analysis.context();
        let traced = run_stage(&self.geo, request, &ctx).await?;
        Ok(traced.value)
    }

    pub async fn ask(&self, request: &ChatRequest) -> Result<ChatAnswer, HerbError> {
        let ctx = self.analysis.context();
        let traced = run_stage(&self.assistant, request, &ctx).await?;
        Ok(traced.value)
    }
}

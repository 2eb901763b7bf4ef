use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use aranya_core::data_model::GEO_RESULT_COUNT;
use aranya_core::{Contract, ExecutionContext, GeoPrediction, GeoRequest, HerbError, Stage};
use aranya_model::PromptModelClient;
use aranya_prompt::ids;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPredictionSet {
    pub locations: Vec<GeoPrediction>,
}

impl Contract for GeoPredictionSet {
    fn validate(&self) -> Result<(), String> {
        if !GEO_RESULT_COUNT.contains(&self.locations.len()) {
            return Err(format!(
                "expected {}-{} locations, got {}",
                GEO_RESULT_COUNT.start(),
                GEO_RESULT_COUNT.end(),
                self.locations.len()
            ));
        }
        self.locations.validate()
    }
}

/// Predicts where in India a herb grows.
///
/// Either the whole list passes validation or the call fails; a partial list
/// is never returned.
pub struct GeoPredictionStage {
    client: PromptModelClient,
}

impl GeoPredictionStage {
    pub fn new(client: PromptModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Stage for GeoPredictionStage {
    type Input = GeoRequest;
    type Output = Vec<GeoPrediction>;

    fn id(&self) -> &'static str {
        "geo.locations.v1"
    }

    async fn run(
        &self,
        input: &Self::Input,
        _ctx: &ExecutionContext,
    ) -> Result<Self::Output, HerbError> {
        let set: GeoPredictionSet = self
            .client
            .invoke(ids::HERB_LOCATIONS, input, Vec::new())
            .await?;
        Ok(set.locations)
    }
}

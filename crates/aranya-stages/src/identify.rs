use async_trait::async_trait;
use serde::{Serialize, Serializer};

use aranya_core::{
    AnalysisRequest, Contract, DataUri, ExecutionContext, HerbError, IdentificationReport, Stage,
};
use aranya_model::PromptModelClient;
use aranya_prompt::ids;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyInput {
    /// Parsed once at request validation; rendered back as a data URI
    #[serde(rename = "herbPhotoDataUri", serialize_with = "photo_as_uri")]
    pub photo: DataUri,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_description: Option<String>,
}

impl IdentifyInput {
    /// Blank hints are dropped; they only ever disambiguate.
    pub fn from_request(request: &AnalysisRequest, photo: DataUri) -> Self {
        Self {
            photo,
            location_description: request.location().map(str::to_string),
            weather_description: request.weather().map(str::to_string),
        }
    }
}

fn photo_as_uri<S: Serializer>(photo: &DataUri, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&photo.to_uri())
}

// The photo is checked by `DataUri::parse` before the input exists.
impl Contract for IdentifyInput {}

/// Identifies the herb in a photo and describes it.
///
/// The confidence is the model's own estimate; nothing cross-checks it.
pub struct IdentificationStage {
    client: PromptModelClient,
}

impl IdentificationStage {
    pub fn new(client: PromptModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Stage for IdentificationStage {
    type Input = IdentifyInput;
    type Output = IdentificationReport;

    fn id(&self) -> &'static str {
        "identify.herb.v1"
    }

    async fn run(
        &self,
        input: &Self::Input,
        _ctx: &ExecutionContext,
    ) -> Result<Self::Output, HerbError> {
        self.client
            .invoke(ids::IDENTIFY_HERB, input, vec![input.photo.clone()])
            .await
    }
}

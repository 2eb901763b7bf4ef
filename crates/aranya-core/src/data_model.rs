//! Data Model: requests, stage outputs, and the composite result
//!
//! Every record here is created per request and handed to the caller. Field
//! names serialize in camelCase to match the model schemas and stored columns.
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::RangeInclusive;

use crate::error::HerbError;
use crate::media::DataUri;
use crate::stage::Contract;

/// Sentinel text the Ayurvedic stage uses for "no documented use"
pub const NOT_APPLICABLE: &str = "Not applicable";

/// Latitude band of the India bounding box, decimal degrees north
pub const INDIA_LATITUDE: RangeInclusive<f64> = 8.0..=37.0;
/// Longitude band of the India bounding box, decimal degrees east
pub const INDIA_LONGITUDE: RangeInclusive<f64> = 68.0..=97.0;
/// Accepted confidence band for geo predictions
pub const GEO_CONFIDENCE: RangeInclusive<f64> = 0.5..=0.9;
/// Accepted number of geo predictions per request
pub const GEO_RESULT_COUNT: RangeInclusive<usize> = 8..=12;

// ============================================================================
// ANALYSIS REQUEST
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Base64 data URI of the herb photo
    #[serde(default, alias = "herbImage", deserialize_with = "null_as_empty")]
    pub image: String,
    #[serde(
        default,
        rename = "locationDescription",
        alias = "location",
        skip_serializing_if = "Option::is_none"
    )]
    pub location_hint: Option<String>,
    #[serde(
        default,
        rename = "weatherDescription",
        alias = "weather",
        skip_serializing_if = "Option::is_none"
    )]
    pub weather_hint: Option<String>,
}

impl AnalysisRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location_hint = Some(location.into());
        self
    }

    pub fn with_weather(mut self, weather: impl Into<String>) -> Self {
        self.weather_hint = Some(weather.into());
        self
    }

    /// Reject requests without an image before any model call is made.
    pub fn validate(&self) -> Result<DataUri, HerbError> {
        DataUri::parse(&self.image)
    }

    /// Location hint with blank values treated as absent
    pub fn location(&self) -> Option<&str> {
        non_blank(self.location_hint.as_deref())
    }

    pub fn weather(&self) -> Option<&str> {
        non_blank(self.weather_hint.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Required text fields read `null` the same as a missing field, so the
/// contract check reports them instead of the decoder.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ============================================================================
// IDENTIFICATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub common_name: String,
    pub latin_name: String,
    /// Probability in [0, 1], never a percentage
    #[serde(rename = "confidenceLevel", alias = "confidence")]
    pub confidence: f64,
}

impl Identification {
    /// Outward percentage string, e.g. `0.874` becomes `"87%"`
    pub fn confidence_percent(&self) -> String {
        confidence_percent(self.confidence)
    }
}

/// Format a [0, 1] probability as a rounded percentage string.
pub fn confidence_percent(confidence: f64) -> String {
    let percent = (confidence.clamp(0.0, 1.0) * 100.0).round() as i64;
    format!("{}%", percent)
}

impl Contract for Identification {
    fn validate(&self) -> Result<(), String> {
        if self.common_name.trim().is_empty() {
            return Err("identification.commonName is empty".to_string());
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "identification.confidenceLevel {} is outside [0, 1]",
                self.confidence
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HerbDetails {
    pub uses: String,
    pub cultivation: String,
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemical_constituents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preservation_techniques: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancient_uses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicinal_preparations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ayurvedic_application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicinal_properties: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultivation_methods: Option<String>,
}

/// Output of the Identification stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationReport {
    pub identification: Identification,
    pub details: HerbDetails,
}

impl Contract for IdentificationReport {
    fn validate(&self) -> Result<(), String> {
        self.identification.validate()
    }
}

// ============================================================================
// CATEGORIZATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categorization {
    pub category: String,
    pub medicinal_properties: String,
    pub cultivation_methods: String,
    pub preservation_techniques: String,
}

impl Contract for Categorization {
    fn validate(&self) -> Result<(), String> {
        if self.category.trim().is_empty() {
            return Err("category is empty".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// AYURVEDIC APPLICATIONS
// ============================================================================

/// Wire shape shared with the model schema and existing consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AyurvedicApplications {
    pub ayurvedic_applications: String,
}

impl Contract for AyurvedicApplications {
    fn validate(&self) -> Result<(), String> {
        if self.ayurvedic_applications.trim().is_empty() {
            return Err("ayurvedicApplications is empty".to_string());
        }
        Ok(())
    }
}

/// Tagged form of the Ayurvedic stage output.
///
/// Serializes as [`AyurvedicApplications`], with `NotApplicable` written as
/// the literal `"Not applicable"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AyurvedicApplications", into = "AyurvedicApplications")]
pub enum AyurvedicRelevance {
    Applicable(String),
    NotApplicable,
}

impl AyurvedicRelevance {
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        let bare = trimmed
            .trim_matches(|c: char| c == '\'' || c == '"' || c == '.' || c.is_whitespace());
        if bare.eq_ignore_ascii_case(NOT_APPLICABLE) {
            Self::NotApplicable
        } else {
            Self::Applicable(trimmed.to_string())
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Self::Applicable(text) => text,
            Self::NotApplicable => NOT_APPLICABLE,
        }
    }

    /// Whether a presentation layer should render an Ayurvedic section
    pub fn is_applicable(&self) -> bool {
        matches!(self, Self::Applicable(_))
    }
}

impl From<AyurvedicApplications> for AyurvedicRelevance {
    fn from(wire: AyurvedicApplications) -> Self {
        Self::from_text(&wire.ayurvedic_applications)
    }
}

impl From<AyurvedicRelevance> for AyurvedicApplications {
    fn from(relevance: AyurvedicRelevance) -> Self {
        AyurvedicApplications {
            ayurvedic_applications: relevance.as_text().to_string(),
        }
    }
}

// ============================================================================
// GEO PREDICTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherContext {
    pub temperature: f64,
    pub humidity: f64,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub common_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_weather: Option<WeatherContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location: Option<Coordinates>,
}

impl GeoRequest {
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            ..Default::default()
        }
    }
}

impl Contract for GeoRequest {
    fn validate(&self) -> Result<(), String> {
        if self.common_name.trim().is_empty() {
            return Err("commonName is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPrediction {
    pub latitude: f64,
    pub longitude: f64,
    pub region_name: String,
    pub climate_type: String,
    pub elevation_range: String,
    pub suitable_conditions: String,
    pub confidence_score: f64,
}

impl Contract for GeoPrediction {
    fn validate(&self) -> Result<(), String> {
        if !INDIA_LATITUDE.contains(&self.latitude) {
            return Err(format!(
                "{}: latitude {} is outside 8°N-37°N",
                self.region_name, self.latitude
            ));
        }
        if !INDIA_LONGITUDE.contains(&self.longitude) {
            return Err(format!(
                "{}: longitude {} is outside 68°E-97°E",
                self.region_name, self.longitude
            ));
        }
        if !GEO_CONFIDENCE.contains(&self.confidence_score) {
            return Err(format!(
                "{}: confidenceScore {} is outside [0.5, 0.9]",
                self.region_name, self.confidence_score
            ));
        }
        Ok(())
    }
}

// ============================================================================
// CONVERSATIONAL ASSISTANT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub question: String,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

impl Contract for ChatRequest {
    fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question is required".to_string());
        }
        Ok(())
    }
}

/// Gate state of the assistant persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    OnTopic,
    OffTopic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAnswer {
    /// Markdown formatted answer
    pub answer_text: String,
    pub topic: Topic,
    pub health_condition: bool,
}

// ============================================================================
// COMPOSITE RESULT
// ============================================================================

/// Everything a successful analysis produced, still in internal form
#[derive(Debug, Clone, PartialEq)]
pub struct HerbReport {
    pub identification: Identification,
    pub details: HerbDetails,
    pub category: Categorization,
    pub ayurvedic: AyurvedicRelevance,
    pub location_hint: Option<String>,
    pub weather_hint: Option<String>,
}

/// Result of one analysis. There is no partially successful variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeResult {
    Success(Box<HerbReport>),
    Failure { error: String },
}

impl CompositeResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn report(&self) -> Option<&HerbReport> {
        match self {
            Self::Success(report) => Some(report),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error } => Some(error),
        }
    }
}

impl Serialize for CompositeResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::view::CompositeView::from(self).serialize(serializer)
    }
}

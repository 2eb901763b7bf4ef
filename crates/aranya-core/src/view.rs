//! Outward shape of the composite result.
//!
//! This is the only place confidence becomes a percentage string and the
//! optional details collapse to display text.
use serde::{Deserialize, Serialize};

use crate::data_model::{AyurvedicApplications, CompositeResult, HerbReport};

/// Placeholder for optional details the model did not provide
pub const NOT_AVAILABLE: &str = "Not available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationView {
    pub common_name: String,
    pub latin_name: String,
    pub confidence_level: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsView {
    pub uses: String,
    pub chemical_constituents: String,
    pub cultivation: String,
    pub preservation: String,
    pub origin: String,
    pub historical_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub medicinal_properties: String,
    pub cultivation_methods: String,
    pub climatic_requirements: String,
    pub category: String,
}

/// Wire form of [`CompositeResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeView {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<IdentificationView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DetailsView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ayurvedic: Option<AyurvedicApplications>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
}

impl CompositeView {
    /// A success view must carry all four sections; a failure view none.
    pub fn is_consistent(&self) -> bool {
        let sections = [
            self.identification.is_some(),
            self.details.is_some(),
            self.category.is_some(),
            self.ayurvedic.is_some(),
        ];
        if self.success {
            self.error.is_none() && sections.iter().all(|s| *s)
        } else {
            self.error.as_deref().is_some_and(|e| !e.is_empty()) && !sections.iter().any(|s| *s)
        }
    }
}

impl From<&HerbReport> for CompositeView {
    fn from(report: &HerbReport) -> Self {
        let details = &report.details;
        let category = &report.category;

        CompositeView {
            success: true,
            error: None,
            identification: Some(IdentificationView {
                common_name: report.identification.common_name.clone(),
                latin_name: report.identification.latin_name.clone(),
                confidence_level: report.identification.confidence_percent(),
                description: details.uses.clone(),
            }),
            details: Some(DetailsView {
                uses: details.uses.clone(),
                chemical_constituents: details
                    .chemical_constituents
                    .as_ref()
                    .filter(|c| !c.is_empty())
                    .map(|c| c.join(", "))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                cultivation: details.cultivation.clone(),
                preservation: or_not_available(details.preservation_techniques.as_deref()),
                origin: details.origin.clone(),
                historical_context: or_not_available(details.history.as_deref()),
            }),
            // Stored reports read climatic requirements from the
            // preservation field; keep that wiring.
            category: Some(CategoryView {
                medicinal_properties: category.medicinal_properties.clone(),
                cultivation_methods: category.cultivation_methods.clone(),
                climatic_requirements: category.preservation_techniques.clone(),
                category: category.category.clone(),
            }),
            ayurvedic: Some(report.ayurvedic.clone().into()),
            location: report.location_hint.clone(),
            weather: report.weather_hint.clone(),
        }
    }
}

impl From<&CompositeResult> for CompositeView {
    fn from(result: &CompositeResult) -> Self {
        match result {
            CompositeResult::Success(report) => CompositeView::from(report.as_ref()),
            CompositeResult::Failure { error } => CompositeView {
                success: false,
                error: Some(error.clone()),
                identification: None,
                details: None,
                category: None,
                ayurvedic: None,
                location: None,
                weather: None,
            },
        }
    }
}

fn or_not_available(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

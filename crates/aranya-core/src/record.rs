//! Persisted record shape for saved analyses.
//!
//! Mirrors the `herb_analyses` columns of the hosted store. This crate only
//! produces and reads the record; writing it is the caller's job.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data_model::AyurvedicApplications;
use crate::error::HerbError;
use crate::view::{CategoryView, CompositeView, DetailsView, IdentificationView};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerbAnalysisRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub common_name: String,
    pub latin_name: String,
    pub confidence_level: String,
    pub uses: String,
    pub chemical_constituents: String,
    pub cultivation: String,
    pub preservation: String,
    pub origin: String,
    pub historical_context: String,
    pub medicinal_properties: String,
    pub cultivation_methods: String,
    pub climatic_requirements: String,
    pub category: String,
    pub ayurvedic_applications: String,
    pub location: String,
    pub weather: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl HerbAnalysisRecord {
    /// Build a record from a successful composite view.
    pub fn from_view(view: &CompositeView) -> Result<Self, HerbError> {
        if !view.success {
            return Err(HerbError::Validation(
                "Only successful analyses can be saved".to_string(),
            ));
        }
        let (Some(identification), Some(details), Some(category), Some(ayurvedic)) = (
            view.identification.as_ref(),
            view.details.as_ref(),
            view.category.as_ref(),
            view.ayurvedic.as_ref(),
        ) else {
            return Err(HerbError::Validation("Analysis result is incomplete".to_string()));
        };

        Ok(Self {
            user_id: None,
            user_email: None,
            common_name: identification.common_name.clone(),
            latin_name: identification.latin_name.clone(),
            confidence_level: identification.confidence_level.clone(),
            uses: details.uses.clone(),
            chemical_constituents: details.chemical_constituents.clone(),
            cultivation: details.cultivation.clone(),
            preservation: details.preservation.clone(),
            origin: details.origin.clone(),
            historical_context: details.historical_context.clone(),
            medicinal_properties: category.medicinal_properties.clone(),
            cultivation_methods: category.cultivation_methods.clone(),
            climatic_requirements: category.climatic_requirements.clone(),
            category: category.category.clone(),
            ayurvedic_applications: ayurvedic.ayurvedic_applications.clone(),
            location: view.location.clone().unwrap_or_default(),
            weather: view.weather.clone().unwrap_or_default(),
            image_url: None,
            created_at: Some(Utc::now()),
        })
    }

    pub fn with_user(mut self, user_id: impl Into<String>, email: Option<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.user_email = email;
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Read a stored record back into the outward composite shape.
    pub fn to_view(&self) -> CompositeView {
        CompositeView {
            success: true,
            error: None,
            identification: Some(IdentificationView {
                common_name: self.common_name.clone(),
                latin_name: self.latin_name.clone(),
                confidence_level: self.confidence_level.clone(),
                description: self.uses.clone(),
            }),
            details: Some(DetailsView {
                uses: self.uses.clone(),
                chemical_constituents: self.chemical_constituents.clone(),
                cultivation: self.cultivation.clone(),
                preservation: self.preservation.clone(),
                origin: self.origin.clone(),
                historical_context: self.historical_context.clone(),
            }),
            category: Some(CategoryView {
                medicinal_properties: self.medicinal_properties.clone(),
                cultivation_methods: self.cultivation_methods.clone(),
                climatic_requirements: self.climatic_requirements.clone(),
                category: self.category.clone(),
            }),
            ayurvedic: Some(AyurvedicApplications {
                ayurvedic_applications: self.ayurvedic_applications.clone(),
            }),
            location: Some(self.location.clone()).filter(|l| !l.is_empty()),
            weather: Some(self.weather.clone()).filter(|w| !w.is_empty()),
        }
    }
}

//! Inline image payloads carried as `data:<mime>;base64,<payload>` URIs.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::HerbError;

static DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:(?P<mime>[A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+);base64,(?P<data>[A-Za-z0-9+/=\s]+)$")
        .expect("static data URI pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUri {
    pub mime_type: String,
    /// Base64 payload, whitespace removed
    pub data: String,
}

impl DataUri {
    /// Parse and check an image data URI.
    ///
    /// The media type must be `image/*` and the payload must decode as base64.
    pub fn parse(uri: &str) -> Result<Self, HerbError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(HerbError::Validation("Please provide an herb image.".to_string()));
        }

        let caps = DATA_URI.captures(uri).ok_or_else(|| {
            HerbError::Validation(
                "Image must be a data URI of the form data:<mimetype>;base64,<data>".to_string(),
            )
        })?;

        let mime_type = caps["mime"].to_ascii_lowercase();
        if !mime_type.starts_with("image/") {
            return Err(HerbError::Validation(format!(
                "Unsupported media type '{}', expected an image",
                mime_type
            )));
        }

        let data: String = caps["data"].chars().filter(|c| !c.is_whitespace()).collect();
        match STANDARD.decode(data.as_bytes()) {
            Ok(bytes) if !bytes.is_empty() => {}
            Ok(_) => return Err(HerbError::Validation("Image payload is empty".to_string())),
            Err(e) => {
                return Err(HerbError::Validation(format!("Image payload is not valid base64: {}", e)))
            }
        }

        Ok(Self { mime_type, data })
    }

    pub fn to_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

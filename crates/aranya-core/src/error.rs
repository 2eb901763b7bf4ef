//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HerbError {
    /// Request is missing required fields or carries malformed input
    #[error("VALIDATION/{0}")]
    Validation(String),

    /// Model output did not conform to the declared output shape
    #[error("SCHEMA/{0}")]
    SchemaViolation(String),

    /// The model call itself failed (network, quota, provider)
    #[error("MODEL/{0}")]
    Model(String),

    /// Credentials or environment are not set up
    #[error("CONFIG/{0}")]
    Configuration(String),

    #[error("TEMPLATE/{0}")]
    Template(String),

    #[error("TIMEOUT/{stage} exceeded {limit_ms}ms")]
    Timeout { stage: String, limit_ms: u64 },

    #[error("CANCELLED/{0}")]
    Cancelled(String),
}

impl HerbError {
    /// Stable code prefix, used as a metrics label
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::SchemaViolation(_) => "SCHEMA",
            Self::Model(_) => "MODEL",
            Self::Configuration(_) => "CONFIG",
            Self::Template(_) => "TEMPLATE",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Cancelled(_) => "CANCELLED",
        }
    }

    /// Text placed in the `error` field of a failed result.
    ///
    /// Validation messages are shown to the user verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::SchemaViolation(msg) => format!("The model returned an unexpected response: {}", msg),
            Self::Model(msg) => msg.clone(),
            Self::Configuration(msg) => format!("Service is not configured: {}", msg),
            Self::Template(msg) => format!("Prompt rendering failed: {}", msg),
            Self::Timeout { stage, limit_ms } => {
                format!("{} did not respond within {} seconds", stage, limit_ms / 1000)
            }
            Self::Cancelled(stage) => format!("{} was cancelled", stage),
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

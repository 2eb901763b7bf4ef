//! Aranya Core: Stage trait, Runner, and Data Model
//!
//! Generic stage core shared by every herb pipeline: typed contracts checked
//! at the call boundary, a runner that enforces deadlines and cancellation,
//! and the records handed back to callers.

pub mod context;
pub mod data_model;
pub mod error;
pub mod media;
pub mod record;
pub mod runner;
pub mod stage;
pub mod view;

pub use context::ExecutionContext;
pub use data_model::{
    AnalysisRequest, AyurvedicApplications, AyurvedicRelevance, Categorization, ChatAnswer,
    ChatRequest, CompositeResult, Coordinates, GeoPrediction, GeoRequest, HerbDetails,
    HerbReport, Identification, IdentificationReport, Topic, WeatherContext, NOT_APPLICABLE,
};
pub use error::HerbError;
pub use media::DataUri;
pub use record::HerbAnalysisRecord;
pub use runner::{run_stage, StageTrace, Traced};
pub use stage::{Contract, Stage};
pub use view::CompositeView;

/// Engine version reported by the health endpoint
pub const ARANYA_VERSION: &str = "1.0.0";

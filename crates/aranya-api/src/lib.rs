//! Aranya API /v1: REST endpoints
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::{info, warn};

use aranya_model::{GeminiBackend, ModelBackend, PromptModelClient};
use aranya_prompt::PromptRenderer;
use aranya_stages::{HerbPipelines, OrchestratorOptions};

pub use config::AppConfig;
pub use metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub pipelines: Arc<HerbPipelines>,
    pub metrics: Metrics,
    pub backend_id: String,
    pub configured: bool,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        renderer: Arc<PromptRenderer>,
        options: OrchestratorOptions,
    ) -> anyhow::Result<Self> {
        let backend_id = backend.id().to_string();
        let configured = backend.is_configured();
        let client = PromptModelClient::new(backend, renderer);
        let metrics = Metrics::new().context("registering metrics")?;
        let pipelines =
            HerbPipelines::new(client, options).with_observer(Arc::new(metrics.clone()));

        Ok(Self {
            pipelines: Arc::new(pipelines),
            metrics,
            backend_id,
            configured,
        })
    }

    /// State backed by Gemini, as described by `config`
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let renderer = match &config.prompts_path {
            Some(path) => PromptRenderer::load(path)
                .with_context(|| format!("loading prompts from {}", path))?,
            None => PromptRenderer::bundled().context("loading bundled prompts")?,
        };
        let backend =
            GeminiBackend::new(config.gemini.clone()).context("building Gemini client")?;

        Self::new(
            Arc::new(backend),
            Arc::new(renderer),
            config.orchestrator_options(),
        )
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/analyze", post(handlers::analyze))
        .route("/v1/locations", post(handlers::locations))
        .route("/api/generate-locations", post(handlers::locations))
        .route("/v1/chat", post(handlers::chat))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::cors())
        .layer(middleware::trace())
        .with_state(state)
}

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    if !config.has_credential() {
        warn!("GEMINI_API_KEY is not set; model stages will fail until it is");
    }
    let state = AppState::from_config(&config)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;

    info!("Aranya API listening on {}", config.addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

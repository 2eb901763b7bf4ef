//! API Handlers
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use aranya_core::{
    AnalysisRequest, ChatRequest, CompositeResult, GeoRequest, HerbError, ARANYA_VERSION,
};

use crate::AppState;

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> (StatusCode, Json<CompositeResult>) {
    state.metrics.request("analyze");
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "malformed analysis request");
            return (
                StatusCode::BAD_REQUEST,
                Json(CompositeResult::failure(invalid_body(&rejection))),
            );
        }
    };

    // Failures travel in the body; the route itself answers 200.
    let result = state.pipelines.analysis.analyze(request).await;
    (StatusCode::OK, Json(result))
}

pub async fn locations(
    State(state): State<AppState>,
    payload: Result<Json<GeoRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    state.metrics.request("locations");
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": invalid_body(&rejection) })),
            )
        }
    };

    match state.pipelines.predict_locations(&request).await {
        Ok(locations) => (
            StatusCode::OK,
            Json(json!({ "success": true, "locations": locations })),
        ),
        Err(HerbError::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg })))
        }
        Err(e) => {
            error!(herb = %request.common_name, error = %e, "location prediction failed");
            state.metrics.stage_failure(e.code());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to generate herb locations",
                    "details": e.user_message()
                })),
            )
        }
    }
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    state.metrics.request("chat");
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": invalid_body(&rejection) })),
            )
        }
    };

    match state.pipelines.ask(&request).await {
        Ok(answer) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "answer": answer.answer_text,
                "topic": answer.topic,
                "healthCondition": answer.health_condition
            })),
        ),
        Err(e) => {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                state.metrics.stage_failure(e.code());
                StatusCode::INTERNAL_SERVER_ERROR
            };
            warn!(error = %e, "chat failed");
            (
                status,
                Json(json!({ "success": false, "error": e.user_message() })),
            )
        }
    }
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": ARANYA_VERSION,
            "model": state.backend_id,
            "configured": state.configured
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            e.to_string(),
        ),
    }
}

fn invalid_body(rejection: &JsonRejection) -> String {
    format!("Invalid request body: {}", rejection.body_text())
}

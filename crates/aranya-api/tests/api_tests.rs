use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use aranya_api::{create_app, AppState};
use aranya_model::{ModelError, ScriptedBackend};
use aranya_prompt::{ids, PromptRenderer};
use aranya_stages::{OrchestratorOptions, CLOSING_PHRASE, DECLINE};

const PHOTO: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQAAAQABAAD/2wBDAAgGBgcGBQgHBwcJCQgKDBQNDAsLDBkSEw8UHR8eHR0aHBwgJC4nICIsIxwcKDcpLDAxNDQ0Hyc5PTgyPC4zNDL/2wBDAQkJCQwLDBgNDRgyIRwhMjIy";

fn app(backend: ScriptedBackend) -> Router {
    let state = AppState::new(
        Arc::new(backend),
        Arc::new(PromptRenderer::bundled().unwrap()),
        OrchestratorOptions::default(),
    )
    .unwrap();
    create_app(state)
}

fn analysis_backend() -> ScriptedBackend {
    ScriptedBackend::new()
        .reply(
            ids::IDENTIFY_HERB,
            json!({
                "identification": {
                    "commonName": "Neem",
                    "latinName": "Azadirachta indica",
                    "confidenceLevel": 0.91
                },
                "details": {
                    "uses": "Skin care, oral hygiene and as a natural pesticide",
                    "cultivation": "Hardy in dry, poor soils",
                    "origin": "Indian subcontinent"
                }
            })
            .to_string(),
        )
        .reply(
            ids::CATEGORIZE_HERB,
            json!({
                "category": "Medicinal tree",
                "medicinalProperties": "Antibacterial, antifungal",
                "cultivationMethods": "Grown from fresh seed",
                "preservationTechniques": "Leaves dried in shade"
            })
            .to_string(),
        )
        .reply(
            ids::AYURVEDIC_APPLICATIONS,
            json!({ "ayurvedicApplications": "Nimba is used for pitta and kapha skin disorders." })
                .to_string(),
        )
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_analyze_success() {
    let (status, body) = send(
        app(analysis_backend()),
        post("/v1/analyze", json!({ "image": PHOTO, "location": "Jaipur" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["identification"]["commonName"], json!("Neem"));
    assert_eq!(body["identification"]["confidenceLevel"], json!("91%"));
    assert_eq!(
        body["identification"]["description"],
        json!("Skin care, oral hygiene and as a natural pesticide")
    );
    assert_eq!(body["details"]["chemicalConstituents"], json!("Not available"));
    assert_eq!(body["details"]["historicalContext"], json!("Not available"));
    assert_eq!(body["category"]["climaticRequirements"], json!("Leaves dried in shade"));
    assert_eq!(
        body["ayurvedic"]["ayurvedicApplications"],
        json!("Nimba is used for pitta and kapha skin disorders.")
    );
    assert_eq!(body["location"], json!("Jaipur"));
    assert!(body.get("weather").is_none());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_analyze_without_image() {
    let (status, body) = send(app(analysis_backend()), post("/v1/analyze", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Please provide an herb image." })
    );
}

#[tokio::test]
async fn test_analyze_failure_has_no_sections() {
    let backend = ScriptedBackend::new()
        .reply(ids::IDENTIFY_HERB, "I could not identify this plant.")
        .reply(ids::CATEGORIZE_HERB, "{}");

    let (status, body) = send(app(backend), post("/v1/analyze", json!({ "image": PHOTO }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert!(!body["error"].as_str().unwrap().is_empty());
    for section in ["identification", "details", "category", "ayurvedic"] {
        assert!(body.get(section).is_none(), "{} leaked", section);
    }
}

#[tokio::test]
async fn test_locations_missing_name() {
    let (status, body) = send(
        app(ScriptedBackend::new()),
        post("/v1/locations", json!({ "latinName": "Ocimum tenuiflorum" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "commonName is required" }));
}

#[tokio::test]
async fn test_locations_model_failure() {
    let backend = ScriptedBackend::new().fail(
        ids::HERB_LOCATIONS,
        ModelError::Response("Gemini API error: quota exceeded".to_string()),
    );
    let (status, body) = send(
        app(backend),
        post("/api/generate-locations", json!({ "commonName": "Tulsi" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Failed to generate herb locations"));
    assert!(body["details"].as_str().unwrap().contains("quota exceeded"));
}

#[tokio::test]
async fn test_locations_success() {
    let locations: Vec<Value> = (0..8)
        .map(|i| {
            json!({
                "latitude": 12.0 + i as f64,
                "longitude": 75.5 + i as f64,
                "regionName": format!("Site {}", i),
                "climateType": "Subtropical",
                "elevationRange": "0-500m",
                "suitableConditions": "Sandy loam, full sun.",
                "confidenceScore": 0.7
            })
        })
        .collect();
    let backend = ScriptedBackend::new().reply(
        ids::HERB_LOCATIONS,
        json!({ "locations": locations }).to_string(),
    );

    let (status, body) = send(
        app(backend),
        post("/v1/locations", json!({ "commonName": "Tulsi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["locations"].as_array().unwrap().len(), 8);
    assert_eq!(body["locations"][0]["regionName"], json!("Site 0"));
}

#[tokio::test]
async fn test_chat_off_topic() {
    let backend = ScriptedBackend::new().reply(
        ids::ARANYA_CHAT,
        json!({ "onTopic": false, "healthCondition": false, "answer": "" }).to_string(),
    );
    let (status, body) = send(
        app(backend),
        post("/v1/chat", json!({ "question": "What's the best stock to buy?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topic"], json!("off_topic"));
    assert_eq!(
        body["answer"],
        json!(format!("{}\n\n{}", DECLINE, CLOSING_PHRASE))
    );
}

#[tokio::test]
async fn test_chat_empty_question() {
    let (status, body) = send(app(ScriptedBackend::new()), post("/v1/chat", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_unconfigured_backend() {
    let app = app(ScriptedBackend::new().unconfigured());

    let (status, body) = send(
        app.clone(),
        Request::builder().uri("/v1/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], json!(false));

    let (status, body) = send(app, post("/v1/analyze", json!({ "image": PHOTO }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Service is not configured"));
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let app = app(ScriptedBackend::new());
    send(app.clone(), post("/v1/chat", json!({ "question": "" }))).await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("aranya_requests_total{route=\"chat\"} 1"));
}

#[tokio::test]
async fn test_null_image_is_missing_image() {
    let backend = analysis_backend();
    let (status, body) = send(
        app(backend),
        post("/v1/analyze", json!({ "image": null, "location": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Please provide an herb image." })
    );
}

#[tokio::test]
async fn test_null_common_name_is_required_error() {
    let (status, body) = send(
        app(ScriptedBackend::new()),
        post("/api/generate-locations", json!({ "commonName": null })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "commonName is required" }));
}

#[tokio::test]
async fn test_mistyped_bodies_get_json_errors() {
    let (status, body) = send(
        app(ScriptedBackend::new()),
        post("/v1/analyze", json!({ "image": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

    let (status, body) = send(
        app(ScriptedBackend::new()),
        post(
            "/v1/locations",
            json!({ "commonName": "Tulsi", "currentWeather": { "temperature": 31.0 } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("humidity"));

    let (status, body) = send(
        app(ScriptedBackend::new()),
        post("/v1/chat", json!({ "question": ["what", "is", "neem"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_analysis_failures_are_counted() {
    let app = app(ScriptedBackend::new().unconfigured());
    send(app.clone(), post("/v1/analyze", json!({ "image": PHOTO }))).await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("aranya_stage_failures_total{code=\"CONFIG\"} 1"));
}

//! Geo prediction and the assistant, driven through `HerbPipelines`.

use std::sync::Arc;

use aranya_core::{ChatRequest, Coordinates, GeoRequest, HerbError, Topic, WeatherContext};
use aranya_model::{PromptModelClient, ScriptedBackend};
use aranya_prompt::{ids, PromptRenderer};
use aranya_stages::{HerbPipelines, OrchestratorOptions, CLOSING_PHRASE, DECLINE, DISCLAIMER_CORE};
use serde_json::{json, Value};

fn pipelines(backend: Arc<ScriptedBackend>) -> HerbPipelines {
    let client = PromptModelClient::new(backend, Arc::new(PromptRenderer::bundled().unwrap()));
    HerbPipelines::new(client, OrchestratorOptions::default())
}

/// `count` locations spread down the Western Ghats
fn locations(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "latitude": 10.0 + i as f64,
                "longitude": 76.0 + (i as f64) / 2.0,
                "regionName": format!("Region {}", i + 1),
                "climateType": "Tropical",
                "elevationRange": "500-1500m",
                "suitableConditions": "Moist laterite soil with monsoon rainfall.",
                "confidenceScore": 0.6 + (i % 3) as f64 / 10.0
            })
        })
        .collect()
}

fn geo_reply(locations: Vec<Value>) -> String {
    json!({ "locations": locations }).to_string()
}

#[tokio::test]
async fn test_geo_prediction_within_bounds() {
    let backend = Arc::new(ScriptedBackend::new().reply(ids::HERB_LOCATIONS, geo_reply(locations(10))));
    let request = GeoRequest {
        latin_name: Some("Withania somnifera".to_string()),
        current_weather: Some(WeatherContext {
            temperature: 29.5,
            humidity: 71.0,
            location: "Mysuru".to_string(),
        }),
        current_location: Some(Coordinates { lat: 12.3, lng: 76.6 }),
        ..GeoRequest::new("Ashwagandha")
    };

    let found = pipelines(backend.clone()).predict_locations(&request).await.unwrap();
    assert_eq!(found.len(), 10);
    assert_eq!(found[0].region_name, "Region 1");

    let prompt = &backend.requests()[0].text;
    assert!(prompt.contains("\"Ashwagandha\" (Withania somnifera)"));
    assert!(prompt.contains("Temperature 29.5°C, Humidity 71.0%, Location: Mysuru"));
    assert!(prompt.contains("User's current location: 12.3, 76.6"));
}

#[tokio::test]
async fn test_geo_prompt_without_context() {
    let backend = Arc::new(ScriptedBackend::new().reply(ids::HERB_LOCATIONS, geo_reply(locations(8))));
    pipelines(backend.clone())
        .predict_locations(&GeoRequest::new("Brahmi"))
        .await
        .unwrap();

    let prompt = &backend.requests()[0].text;
    assert!(prompt.contains("\"Brahmi\" can naturally"));
    assert!(!prompt.contains("Current weather context"));
    assert!(!prompt.contains("User's current location"));
}

#[tokio::test]
async fn test_geo_rejects_short_list() {
    let backend = Arc::new(ScriptedBackend::new().reply(ids::HERB_LOCATIONS, geo_reply(locations(7))));
    let err = pipelines(backend)
        .predict_locations(&GeoRequest::new("Neem"))
        .await
        .unwrap_err();
    assert!(matches!(err, HerbError::SchemaViolation(msg) if msg.contains("got 7")));
}

#[tokio::test]
async fn test_geo_rejects_whole_list_for_one_bad_point() {
    let mut points = locations(9);
    // Colombo, outside India's bounding box
    points[4]["latitude"] = json!(6.9);
    points[4]["longitude"] = json!(79.8);

    let backend = Arc::new(ScriptedBackend::new().reply(ids::HERB_LOCATIONS, geo_reply(points)));
    let err = pipelines(backend)
        .predict_locations(&GeoRequest::new("Neem"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SCHEMA");
}

#[tokio::test]
async fn test_geo_rejects_out_of_range_confidence() {
    let mut points = locations(8);
    points[0]["confidenceScore"] = json!(0.95);

    let backend = Arc::new(ScriptedBackend::new().reply(ids::HERB_LOCATIONS, geo_reply(points)));
    let result = pipelines(backend)
        .predict_locations(&GeoRequest::new("Neem"))
        .await;
    assert!(matches!(result, Err(HerbError::SchemaViolation(_))));
}

#[tokio::test]
async fn test_geo_requires_common_name() {
    let backend = Arc::new(ScriptedBackend::new().reply(ids::HERB_LOCATIONS, geo_reply(locations(8))));
    let err = pipelines(backend.clone())
        .predict_locations(&GeoRequest::new("   "))
        .await
        .unwrap_err();
    assert_eq!(err, HerbError::Validation("commonName is required".to_string()));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_assistant_declines_off_topic() {
    let backend = Arc::new(ScriptedBackend::new().reply(
        ids::ARANYA_CHAT,
        json!({ "onTopic": false, "answer": "Consider a broad market stock index fund." }).to_string(),
    ));
    let answer = pipelines(backend.clone())
        .ask(&ChatRequest::new("What's the best stock to buy?"))
        .await
        .unwrap();

    assert_eq!(answer.topic, Topic::OffTopic);
    assert!(answer.answer_text.contains(DECLINE));
    assert!(!answer.answer_text.contains("stock"));
    assert!(answer.answer_text.ends_with(CLOSING_PHRASE));
    assert!(backend.requests()[0]
        .text
        .contains("User Question: \"What's the best stock to buy?\""));
}

#[tokio::test]
async fn test_assistant_health_answer() {
    let markdown = "For a mild cold, Ayurveda suggests:\n\n- **Tulsi** tea, twice a day\n- **Ginger** with honey\n- **Turmeric** milk at night";
    let backend = Arc::new(ScriptedBackend::new().reply(
        ids::ARANYA_CHAT,
        json!({ "onTopic": true, "healthCondition": true, "answer": markdown }).to_string(),
    ));
    let answer = pipelines(backend)
        .ask(&ChatRequest::new("Which herbs help with a cold?"))
        .await
        .unwrap();

    assert_eq!(answer.topic, Topic::OnTopic);
    assert!(answer.health_condition);
    assert!(answer.answer_text.contains("- **Tulsi** tea"));
    assert!(answer.answer_text.contains(DISCLAIMER_CORE));
    assert!(answer.answer_text.ends_with(CLOSING_PHRASE));
}

#[tokio::test]
async fn test_assistant_plain_answer_has_no_disclaimer() {
    let backend = Arc::new(ScriptedBackend::new().reply(
        ids::ARANYA_CHAT,
        json!({
            "onTopic": true,
            "healthCondition": false,
            "answer": "**Neem** (*Azadirachta indica*) is a fast-growing evergreen tree native to India."
        })
        .to_string(),
    ));
    let answer = pipelines(backend)
        .ask(&ChatRequest::new("What is neem?"))
        .await
        .unwrap();

    assert!(!answer.answer_text.contains(DISCLAIMER_CORE));
    assert!(answer.answer_text.ends_with(CLOSING_PHRASE));
}

#[tokio::test]
async fn test_assistant_empty_question() {
    let backend = Arc::new(ScriptedBackend::new());
    let err = pipelines(backend.clone())
        .ask(&ChatRequest::new(""))
        .await
        .unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(backend.calls(), 0);
}

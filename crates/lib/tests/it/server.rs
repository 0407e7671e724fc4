use reqwest::StatusCode;
use scholarai::{config::Provider, server::AppState};
use serde_json::{Value, json};

use crate::helpers::{
    MockUpstream, google_text, large_jpeg_base64, openrouter_text, provider_error, start_app,
    start_app_with,
};

fn valid_bodies() -> Vec<Value> {
    vec![
        json!({"endpoint": "chat", "history": [], "newMessage": "Hi", "userContext": "Class 10"}),
        json!({"endpoint": "notes", "topic": "Photosynthesis"}),
        json!({"endpoint": "doubt", "doubt": "Solve for x: 2x+5=15"}),
        json!({"endpoint": "quiz", "topic": "Thermodynamics", "difficulty": "Medium"}),
        json!({"endpoint": "career", "profile": "Grade 12 Science", "query": "Engineering or medicine?"}),
        json!({"endpoint": "plan", "details": {"subjects": "Maths", "hoursPerDay": 3, "examDate": "2030-03-01", "weakAreas": "Calculus"}}),
    ]
}

async fn post(base: &str, body: &Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}/api/gemini"))
        .json(body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_missing_credential_fails_every_operation_with_guidance() {
    let base = start_app(AppState::unconfigured(Provider::Google)).await;

    for body in valid_bodies() {
        let (status, json) = post(&base, &body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");
        let error = json["error"].as_str().unwrap();
        assert!(error.contains("no API key configured"), "{error}");
        assert!(error.contains("GEMINI_API_KEY"), "{error}");
    }
}

#[tokio::test]
async fn test_missing_credential_checked_before_body() {
    let base = start_app(AppState::unconfigured(Provider::OpenRouter)).await;

    let (status, json) = post(&base, &json!({"endpoint": "notes"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("OPENROUTER_API_KEY"));

    let (status, _) = post(&base, &json!({"endpoint": "poetry"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_request_validation() {
    let mock = MockUpstream::new();
    let upstream = mock.start().await;
    let base = start_app_with(Provider::OpenRouter, &upstream).await;

    let (status, json) = post(&base, &json!({"endpoint": "poetry"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid endpoint");

    let (status, json) = post(&base, &json!({"endpoint": "notes"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid request"));

    let response = reqwest::Client::new()
        .post(format!("{base}/api/gemini"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Missing request body");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_doubt_accepts_photo_above_default_body_limit() {
    let mock = MockUpstream::new().respond(google_text("The circuit has 3 ohms."));
    let upstream = mock.start().await;
    let base = start_app_with(Provider::Google, &upstream).await;

    let image = large_jpeg_base64(3 * 1024 * 1024);
    let (status, json) = post(
        &base,
        &json!({"endpoint": "doubt", "doubt": "Find the resistance", "image": image}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"], "The circuit has 3 ohms.");

    let parts = &mock.requests()[0].body["contents"][0]["parts"];
    let inline = parts
        .as_array()
        .unwrap()
        .iter()
        .find_map(|part| part.get("inlineData"))
        .unwrap();
    assert_eq!(inline["mimeType"], "image/jpeg");
    assert_eq!(inline["data"].as_str().unwrap().len(), image.len());
}

#[tokio::test]
async fn test_options_cors_and_method_not_allowed() {
    let base = start_app(AppState::unconfigured(Provider::Google)).await;
    let client = reqwest::Client::new();

    let response = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/gemini"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/gemini"))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let response = client
        .get(format!("{base}/api/gemini"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Method Not Allowed");
}

#[tokio::test]
async fn test_health_reports_configuration() {
    let base = start_app(AppState::unconfigured(Provider::OpenRouter)).await;
    let json: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        json,
        json!({"status": "healthy", "provider": "openrouter", "configured": false})
    );
}

#[tokio::test]
async fn test_doubt_returns_markdown_from_reasoning_tier() {
    let mock = MockUpstream::new().respond(google_text(
        "## Solution\n\n1. Subtract 5: 2x = 10\n2. Divide by 2: **x = 5**",
    ));
    let upstream = mock.start().await;
    let base = start_app_with(Provider::Google, &upstream).await;

    let (status, json) = post(
        &base,
        &json!({"endpoint": "doubt", "doubt": "Solve for x: 2x+5=15"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let text = json["result"].as_str().unwrap();
    assert!(text.contains("x = 5"));
    assert!(
        text.lines()
            .any(|line| line.starts_with('#') || line.trim_start().starts_with("1."))
    );

    let recorded = &mock.requests()[0];
    assert_eq!(
        recorded.path,
        "/v1beta/models/gemini-2.5-pro:generateContent"
    );
    assert_eq!(
        recorded.body["generationConfig"]["thinkingConfig"]["thinkingBudget"],
        2048
    );
}

#[tokio::test]
async fn test_quiz_returns_parsed_questions() {
    let questions: Vec<Value> = (1..=5)
        .map(|i| {
            json!({
                "id": i,
                "question": format!("Question {i}?"),
                "options": ["A", "B", "C", "D"],
                "correctAnswer": i % 4,
                "explanation": "Because."
            })
        })
        .collect();
    let raw = format!("```json\n{}\n```", Value::Array(questions));
    let mock = MockUpstream::new().respond(openrouter_text(&raw));
    let upstream = mock.start().await;
    let base = start_app_with(Provider::OpenRouter, &upstream).await;

    let (status, json) = post(
        &base,
        &json!({"endpoint": "quiz", "topic": "Thermodynamics", "difficulty": "Medium"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let result = json["result"].as_array().unwrap();
    assert_eq!(result.len(), 5);
    for question in result {
        assert_eq!(question["options"].as_array().unwrap().len(), 4);
        assert!((0..=3).contains(&question["correctAnswer"].as_u64().unwrap()));
    }
    assert_eq!(
        mock.requests()[0].body["response_format"]["type"],
        "json_object"
    );
}

#[tokio::test]
async fn test_provider_errors_map_to_status() {
    let mock = MockUpstream::new()
        .respond(provider_error(401, "API key not valid"))
        .respond(provider_error(429, "quota"))
        .respond(provider_error(429, "quota"))
        .respond(provider_error(429, "quota"));
    let upstream = mock.start().await;
    let base = start_app_with(Provider::Google, &upstream).await;

    let (code, json) = post(&base, &json!({"endpoint": "notes", "topic": "Optics"})).await;
    assert_eq!(code, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("rejected the API key"));

    let (code, _) = post(&base, &json!({"endpoint": "notes", "topic": "Optics"})).await;
    assert_eq!(code, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(mock.requests().len(), 4);
}

#[tokio::test]
async fn test_api_alias_path() {
    let mock = MockUpstream::new().respond(google_text("## Notes"));
    let upstream = mock.start().await;
    let base = start_app_with(Provider::Google, &upstream).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api"))
        .json(&json!({"endpoint": "notes", "topic": "Optics"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["result"], "## Notes");
}

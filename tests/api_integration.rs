use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use documind::AppState;
use documind::config::AppConfig;
use documind::extraction::{DocumentExtractor, SchemaTable};
use documind::llm::{CompletionRequest, LlmDriver, LlmSettings, Provider};
use documind::server::build_router;

const BOUNDARY: &str = "documind-test-boundary";

/// Driver that replies with a fixed string and counts calls.
#[derive(Debug)]
struct CannedDriver {
    reply: String,
    calls: Mutex<usize>,
}

#[async_trait]
impl LlmDriver for CannedDriver {
    async fn complete(&self, _request: CompletionRequest) -> anyhow::Result<String> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.reply.clone())
    }
}

fn settings(api_key: Option<&str>) -> LlmSettings {
    LlmSettings {
        base_url: "http://localhost:9".to_string(),
        api_key: api_key.map(ToString::to_string),
        model: "test-model".to_string(),
        provider: Provider::Generic,
        request_timeout: Duration::from_secs(5),
    }
}

fn app_with(reply: &str, api_key: Option<&str>) -> (axum::Router, Arc<CannedDriver>) {
    let config = Arc::new(AppConfig::load_from_args(["documind"]).expect("default config"));
    let driver = Arc::new(CannedDriver {
        reply: reply.to_string(),
        calls: Mutex::new(0),
    });
    let extractor = DocumentExtractor::new(
        settings(api_key),
        Arc::new(SchemaTable::builtin()),
        config.extraction.clone(),
        driver.clone(),
    );
    (build_router(AppState::new(config, extractor)), driver)
}

fn multipart_body(mode: &str, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"mode\"\r\n\r\n{mode}\r\n"
        )
        .as_bytes(),
    );
    if let Some((name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn analyze_request(body: Vec<u8>) -> Request<Body> {
    Request::post("/api/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_modes_endpoint() {
    let (app, _) = app_with("{}", Some("sk-test"));
    let response = app
        .oneshot(Request::get("/api/modes").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let modes = json_body(response).await;
    let labels: Vec<&str> = modes
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Resume Parsing", "Invoice Data", "Sentiment Analysis"]);
    assert_eq!(modes[1]["expected_fields"][0], "Invoice_Number");
}

#[tokio::test]
async fn test_dashboard_page() {
    let (app, _) = app_with("{}", Some("sk-test"));
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;
    assert!(html.contains("DocuMind"));
    assert!(html.contains("Extract invoice details, amounts, and vendor information"));
}

#[tokio::test]
async fn test_analyze_text_upload_and_downloads() {
    let reply = "```json\n{\"Sentiment_Score\": 0.8, \"Sentiment_Label\": \"Positive\", \"Main_Theme\": \"Service\", \"Tone\": \"\", \"Key_Phrases\": [\"fast\", \"friendly\"]}\n```";
    let (app, driver) = app_with(reply, Some("sk-test"));

    let body = multipart_body(
        "Sentiment Analysis",
        Some(("review.txt", b"  Fast and friendly service.\n")),
    );
    let response = app.clone().oneshot(analyze_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*driver.calls.lock().unwrap(), 1);

    let data = json_body(response).await;
    assert_eq!(data["mode"], "Sentiment");
    assert_eq!(data["file_name"], "review.txt");
    assert_eq!(data["text"], "Fast and friendly service.");
    assert_eq!(data["result"]["Tone"], "");
    assert!(data["display"].get("Tone").is_none());
    assert_eq!(data["table"][0]["field"], "Sentiment_Score");
    assert_eq!(data["table"][3]["value"], "[\"fast\",\"friendly\"]");

    let session_id = data["session_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/sessions/{session_id}/download.csv"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"review.txt_extracted.csv\""
    );
    let csv = text_body(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "Sentiment_Score,Sentiment_Label,Main_Theme,Tone,Key_Phrases"
    );

    let response = app
        .oneshot(
            Request::get(format!("/api/sessions/{session_id}/download.json"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = text_body(response).await;
    assert!(json.starts_with("{\n  \"Sentiment_Score\": 0.8"));
}

#[tokio::test]
async fn test_unsupported_extension_is_rejected_before_llm() {
    let (app, driver) = app_with("{}", Some("sk-test"));
    let body = multipart_body("Resume", Some(("cv.docx", b"hello")));

    let response = app.oneshot(analyze_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let data = json_body(response).await;
    assert_eq!(data["code"], "UNSUPPORTED_TYPE");
    assert!(data["error"].as_str().unwrap().contains(".pdf, .txt"));
    assert_eq!(*driver.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_file() {
    let (app, driver) = app_with("{}", Some("sk-test"));
    let response = app
        .oneshot(analyze_request(multipart_body("Resume", None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "MISSING_FILE");
    assert_eq!(*driver.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_mode() {
    let (app, _) = app_with("{}", Some("sk-test"));
    let body = multipart_body("Poetry", Some(("a.txt", b"words")));
    let response = app.oneshot(analyze_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_MODE");
}

#[tokio::test]
async fn test_malformed_reply_returns_raw_text() {
    let (app, _) = app_with("Sorry, I cannot help with that.", Some("sk-test"));
    let body = multipart_body("Invoice", Some(("inv.txt", b"Invoice #7")));

    let response = app.oneshot(analyze_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let data = json_body(response).await;
    assert_eq!(data["code"], "MALFORMED_RESPONSE");
    assert_eq!(data["raw"], "Sorry, I cannot help with that.");
}

#[tokio::test]
async fn test_missing_api_key_never_calls_provider() {
    let (app, driver) = app_with("{}", None);
    let body = multipart_body("Resume", Some(("cv.txt", b"Jane Doe")));

    let response = app.oneshot(analyze_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let data = json_body(response).await;
    assert_eq!(data["code"], "CONFIGURATION_ERROR");
    assert_eq!(data["recoverable"], false);
    assert_eq!(*driver.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_session_download() {
    let (app, _) = app_with("{}", Some("sk-test"));
    let response = app
        .oneshot(
            Request::get("/api/sessions/nope/download.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "SESSION_NOT_FOUND");
}

async fn assert_too_large(byte_count: usize) {
    let (app, driver) = app_with("{}", Some("sk-test"));
    let payload = vec![b'a'; byte_count];
    let body = multipart_body("Resume", Some(("big.txt", &payload)));

    let response = app.oneshot(analyze_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let data = json_body(response).await;
    assert_eq!(data["code"], "TOO_LARGE");
    assert!(data["error"].as_str().unwrap().contains("10MB"));
    assert_eq!(data["recoverable"], true);
    assert_eq!(*driver.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_upload_just_over_ceiling_is_too_large() {
    assert_too_large(10 * 1024 * 1024 + 512 * 1024).await;
}

#[tokio::test]
async fn test_upload_over_body_limit_is_too_large() {
    assert_too_large(12 * 1024 * 1024).await;
}

//! Router tests with a canned model runner.
use std::path::Path;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use ttharvest_core::{ModelRunner, PromptTemplate, Result};
use ttharvest_server::{AppState, router};

struct CannedRunner {
    reply: String,
}

impl ModelRunner for CannedRunner {
    async fn run(&self, prompt: &str) -> Result<String> {
        assert!(prompt.starts_with("Convert:"));
        Ok(self.reply.clone())
    }
}

fn app(dir: &Path, template: &str, reply: &str) -> axum::Router {
    router(AppState {
        runner: CannedRunner { reply: reply.to_string() },
        template: PromptTemplate::new(template),
        output_dir: dir.to_path_buf(),
    })
}

fn post_process(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path(), "Convert: {{ARTICLE_TEXT}}", "{}")
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["message"].is_string());
}

#[tokio::test]
async fn test_process_persists_and_echoes() {
    let dir = TempDir::new().unwrap();
    let reply = r#"{"title": "Serve Tips", "drills": ["short serve"]}"#;
    let response = app(dir.path(), "Convert: {{ARTICLE_TEXT}}", reply)
        .oneshot(post_process(json!({"article_id": "article-0001", "text": "===ARTICLE===\nTEXT:\nbody"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["article_id"], "article-0001");
    assert_eq!(body["llm_output"]["drills"][0], "short serve");

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("article-0001.json")).unwrap()).unwrap();
    assert_eq!(saved, body["llm_output"]);
}

#[tokio::test]
async fn test_process_generates_id() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path(), "Convert: {{ARTICLE_TEXT}}", "{}")
        .oneshot(post_process(json!({"text": "body"})))
        .await
        .unwrap();

    let body = json_body(response).await;
    let id = body["article_id"].as_str().unwrap();
    assert_eq!(id.len(), 36);
    assert!(dir.path().join(format!("{id}.json")).exists());
}

#[tokio::test]
async fn test_process_wraps_non_json_output() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path(), "Convert: {{ARTICLE_TEXT}}", "I could not parse that.")
        .oneshot(post_process(json!({"article_id": "a2", "text": "body"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["llm_output"]["raw_output"], "I could not parse that.");
}

#[tokio::test]
async fn test_process_bad_template_is_500() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path(), "Convert: {{ARTICLE}}", "{}")
        .oneshot(post_process(json!({"article_id": "a3", "text": "body"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["detail"].as_str().unwrap().contains("ARTICLE_TEXT"));
    assert!(!dir.path().join("a3.json").exists());
}

#[tokio::test]
async fn test_process_rejects_missing_text() {
    let dir = TempDir::new().unwrap();
    let response = app(dir.path(), "Convert: {{ARTICLE_TEXT}}", "{}")
        .oneshot(post_process(json!({"article_id": "a4"})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

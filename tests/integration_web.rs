#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Web front end served over a real socket

mod common;

use std::fs;
use std::sync::Arc;

use common::{ContextEchoModel, HashingEmbedder};
use pdf_qa::answer::QaService;
use pdf_qa::config::Config;
use pdf_qa::web::{AppState, EMPTY_QUERY_MESSAGE, serve};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use url::form_urlencoded;

const TITLE: &str = "Country Budget Chatbot";

struct Reply {
    status: u16,
    body: String,
}

async fn start(documents: &[(&str, &str)]) -> (String, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    for (name, text) in documents {
        fs::write(temp_dir.path().join(name), text).expect("should write");
    }

    let mut config = Config::default();
    config.documents.directory = temp_dir.path().to_path_buf();
    let service = QaService::from_config(
        &config,
        Arc::new(HashingEmbedder::default()),
        Arc::new(ContextEchoModel::default()),
    )
    .expect("service should build");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let address = listener.local_addr().expect("should have address");
    let state = AppState::new(Arc::new(service), TITLE);
    tokio::spawn(serve(listener, state));

    (format!("http://{}", address), temp_dir)
}

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .into()
}

async fn get(url: String) -> Reply {
    tokio::task::spawn_blocking(move || {
        let mut response = agent().get(&url).call().expect("request should complete");
        Reply {
            status: response.status().as_u16(),
            body: response
                .body_mut()
                .read_to_string()
                .expect("body should be text"),
        }
    })
    .await
    .expect("blocking task should join")
}

async fn post(url: String, content_type: &'static str, body: String) -> Reply {
    tokio::task::spawn_blocking(move || {
        let mut response = agent()
            .post(&url)
            .header("Content-Type", content_type)
            .send(body.as_str())
            .expect("request should complete");
        Reply {
            status: response.status().as_u16(),
            body: response
                .body_mut()
                .read_to_string()
                .expect("body should be text"),
        }
    })
    .await
    .expect("blocking task should join")
}

async fn post_form(base: &str, query: &str) -> Reply {
    let body = form_urlencoded::Serializer::new(String::new())
        .append_pair("query", query)
        .finish();
    post(
        format!("{}/", base),
        "application/x-www-form-urlencoded",
        body,
    )
    .await
}

async fn post_json(base: &str, body: &Value) -> Reply {
    post(
        format!("{}/api/answer", base),
        "application/json",
        body.to_string(),
    )
    .await
}

const BUDGET: (&str, &str) = (
    "budget.txt",
    "The agriculture budget was increased by 5000 crore this year.",
);

#[tokio::test(flavor = "multi_thread")]
async fn form_page_is_served() {
    let (base, _dir) = start(&[BUDGET]).await;

    let reply = get(format!("{}/", base)).await;

    assert_eq!(reply.status, 200);
    assert!(reply.body.contains(TITLE));
    assert!(reply.body.contains("name=\"query\""));
    assert!(!reply.body.contains(EMPTY_QUERY_MESSAGE));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_form_submission_prompts_for_query() {
    let (base, _dir) = start(&[BUDGET]).await;

    let reply = post_form(&base, "   ").await;

    assert_eq!(reply.status, 200);
    assert!(reply.body.contains(EMPTY_QUERY_MESSAGE));
    assert!(!reply.body.contains("<strong>Answer:</strong>"));
}

#[tokio::test(flavor = "multi_thread")]
async fn form_submission_shows_answer() {
    let (base, _dir) = start(&[BUDGET]).await;

    let reply = post_form(&base, "How much was the agriculture budget increased by?").await;

    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("<strong>Answer:</strong>"));
    assert!(reply.body.contains("5000 crore"));
    assert!(reply.body.contains("budget.txt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn api_answers_with_sources() {
    let (base, _dir) = start(&[BUDGET]).await;

    let reply = post_json(&base, &json!({ "query": "agriculture budget" })).await;

    assert_eq!(reply.status, 200);
    let body: Value = serde_json::from_str(&reply.body).expect("response should be JSON");
    assert!(
        body["answer"]
            .as_str()
            .expect("answer should be a string")
            .contains("5000 crore")
    );
    assert_eq!(body["used_context"], json!(true));
    let sources = body["sources"].as_array().expect("sources should be an array");
    assert_eq!(sources.len(), 1);
    assert!(
        sources[0]["source"]
            .as_str()
            .expect("source should be a string")
            .ends_with("budget.txt")
    );
    assert_eq!(sources[0]["page"], Value::Null);
}

#[tokio::test(flavor = "multi_thread")]
async fn api_rejects_empty_query() {
    let (base, _dir) = start(&[BUDGET]).await;

    let reply = post_json(&base, &json!({ "query": "" })).await;

    assert_eq!(reply.status, 400);
    let body: Value = serde_json::from_str(&reply.body).expect("response should be JSON");
    assert!(body["error"].as_str().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn api_request_without_query_is_rejected_as_empty() {
    let (base, _dir) = start(&[BUDGET]).await;

    let reply = post_json(&base, &json!({})).await;

    assert_eq!(reply.status, 400);
    let body: Value = serde_json::from_str(&reply.body).expect("response should be JSON");
    assert!(
        body["error"]
            .as_str()
            .expect("error should be a string")
            .contains("Query must not be empty")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn api_without_documents_reports_no_context() {
    let (base, _dir) = start(&[]).await;

    let reply = post_json(&base, &json!({ "query": "What changed?" })).await;

    assert_eq!(reply.status, 200);
    let body: Value = serde_json::from_str(&reply.body).expect("response should be JSON");
    assert_eq!(body["used_context"], json!(false));
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn health_reports_indexed_chunks() {
    let (base, _dir) = start(&[BUDGET, ("notes.md", "Railways got new stations.")]).await;

    let reply = get(format!("{}/health", base)).await;

    assert_eq!(reply.status, 200);
    let body: Value = serde_json::from_str(&reply.body).expect("response should be JSON");
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["indexed_chunks"], json!(2));
}

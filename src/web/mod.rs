//! HTTP front end
//!
//! Serves a single-page question form plus a small JSON API over a shared
//! [`QaService`]. Query work runs on the blocking pool because the remote
//! client is synchronous.

mod page;

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::answer::{AnswerResult, QaService};
use crate::{QaError, Result};

pub use page::{EMPTY_QUERY_MESSAGE, PageMessage, html_escape, render_page};

/// Server state shared across requests
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QaService>,
    pub title: Arc<str>,
}

impl AppState {
    #[inline]
    pub fn new(service: Arc<QaService>, title: &str) -> Self {
        Self {
            service,
            title: Arc::from(title),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub used_context: bool,
    pub sources: Vec<SourceResponse>,
}

#[derive(Debug, Serialize)]
pub struct SourceResponse {
    pub source: String,
    pub page: Option<u32>,
    pub similarity: f32,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub indexed_chunks: usize,
}

impl From<AnswerResult> for AnswerResponse {
    #[inline]
    fn from(result: AnswerResult) -> Self {
        Self {
            answer: result.text,
            used_context: result.used_context,
            sources: result
                .sources
                .into_iter()
                .map(|r| SourceResponse {
                    source: r.chunk.source.path.display().to_string(),
                    page: r.chunk.source.page,
                    similarity: r.similarity,
                })
                .collect(),
        }
    }
}

/// Build the application router
#[inline]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route("/api/answer", post(api_answer))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `address` and serve until the process is stopped
#[inline]
pub async fn start_server(address: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!("Serving on http://{}", listener.local_addr()?);
    serve(listener, state).await
}

/// Serve on an already-bound listener
#[inline]
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn show_form(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.title, "", &PageMessage::None))
}

async fn submit_form(State(state): State<AppState>, Form(form): Form<AskForm>) -> Html<String> {
    let query = form.query;
    let message = if query.trim().is_empty() {
        PageMessage::Prompt
    } else {
        match run_query(Arc::clone(&state.service), query.clone()).await {
            Ok(result) => PageMessage::Answer(result),
            Err(e) => PageMessage::Error(e.to_string()),
        }
    };

    Html(render_page(&state.title, &query, &message))
}

async fn api_answer(State(state): State<AppState>, Json(request): Json<AnswerRequest>) -> Response {
    match run_query(Arc::clone(&state.service), request.query).await {
        Ok(result) => Json(AnswerResponse::from(result)).into_response(),
        Err(e) => {
            let status = if e.is_user_error() {
                StatusCode::BAD_REQUEST
            } else if e.is_remote() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        indexed_chunks: state.service.index().len(),
    })
}

async fn run_query(service: Arc<QaService>, query: String) -> Result<AnswerResult> {
    let result = tokio::task::spawn_blocking(move || service.answer(&query))
        .await
        .map_err(|e| QaError::Other(anyhow::anyhow!("Query task failed: {}", e)))?;

    match &result {
        Ok(_) => {}
        Err(e) if e.is_user_error() => warn!("Rejected query: {}", e),
        Err(e) => error!("Query failed: {}", e),
    }
    result
}

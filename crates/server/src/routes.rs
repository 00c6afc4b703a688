//! HTTP routes: `GET /` and `POST /process`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use ttharvest_core::{ArticleInput, HarvestError, ModelRunner, PromptTemplate, process_article};
use uuid::Uuid;

/// Shared, read-only state of the service.
pub struct AppState<R> {
    pub runner: R,
    pub template: PromptTemplate,
    pub output_dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: &'static str,
    pub article_id: String,
    pub llm_output: Value,
}

/// A failed request, answered with 500 and `{"status":"error","detail":...}`.
#[derive(Debug)]
pub struct ApiError(HarvestError);

impl From<HarvestError> for ApiError {
    fn from(e: HarvestError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("request failed: {}", self.0);
        let body = Json(json!({ "status": "error", "detail": self.0.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub fn router<R>(state: AppState<R>) -> Router
where
    R: ModelRunner + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/process", post(process::<R>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(state))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "ttharvest server is running" }))
}

async fn process<R>(
    State(state): State<Arc<AppState<R>>>, Json(input): Json<ArticleInput>,
) -> Result<Json<ProcessResponse>, ApiError>
where
    R: ModelRunner + Send + Sync + 'static,
{
    let article_id = input
        .article_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    info!("Processing {} ({} bytes)", article_id, input.text.len());
    let llm_output =
        process_article(&state.runner, &state.template, &state.output_dir, &article_id, &input.text).await?;

    Ok(Json(ProcessResponse { status: "ok", article_id, llm_output }))
}

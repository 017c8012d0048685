//! HTTP routes for clipboard operations.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::info;

use crate::auth::basic_password;
use crate::error::ApiError;
use copybridge_clipboard::{ClipboardService, ClipboardUpdate, ClipboardView, NewClipboard};
use copybridge_store::{HealthReport, HealthStatus};

/// Build the application router around a service.
pub fn router(service: ClipboardService) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/clipboard", post(create_clipboard))
        .route(
            "/clipboard/{name}",
            get(get_clipboard)
                .put(update_clipboard)
                .delete(delete_clipboard),
        )
        .layer(middleware::from_fn(log_requests))
        .with_state(service)
}

async fn index() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

async fn health(State(service): State<ClipboardService>) -> (StatusCode, Json<HealthReport>) {
    let report = service.health().await;
    let status = match report.status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report))
}

async fn get_clipboard(
    State(service): State<ClipboardService>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ClipboardView>, ApiError> {
    let view = service.get(&name, basic_password(&headers)).await?;
    Ok(Json(view))
}

async fn create_clipboard(
    State(service): State<ClipboardService>,
    headers: HeaderMap,
    body: Result<Json<NewClipboard>, JsonRejection>,
) -> Result<(StatusCode, Json<ClipboardView>), ApiError> {
    let Json(input) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let view = service.create(input, basic_password(&headers)).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update_clipboard(
    State(service): State<ClipboardService>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Result<Json<ClipboardUpdate>, JsonRejection>,
) -> Result<Json<ClipboardView>, ApiError> {
    let Json(changes) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let view = service
        .update(&name, changes, basic_password(&headers))
        .await?;
    Ok(Json(view))
}

async fn delete_clipboard(
    State(service): State<ClipboardService>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    service.delete(&name, basic_password(&headers)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Log method, path, status and latency. Headers and bodies are never
/// logged since they carry credentials and clipboard data.
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request handled"
    );
    response
}

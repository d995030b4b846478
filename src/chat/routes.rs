//! REST endpoints for the intake chat.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use super::session::SessionStore;
use crate::chart::InMemoryChartStore;
use crate::intake::IntakeMachine;

/// Session used when a client does not send one.
pub const DEFAULT_SESSION: &str = "default";

/// Shared state for chat routes.
#[derive(Clone)]
pub struct ChatRouteState {
    pub machine: Arc<IntakeMachine>,
    pub sessions: Arc<SessionStore>,
    pub charts: Arc<InMemoryChartStore>,
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    #[serde(default)]
    session_id: Option<String>,
    text: String,
}

#[derive(Debug, Deserialize)]
struct SessionRequest {
    #[serde(default)]
    session_id: Option<String>,
}

fn session_id(raw: Option<String>) -> String {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "bmi-assist"
    }))
}

/// GET /api/welcome?session_id=…
///
/// Resets the session and returns the greeting.
async fn welcome(
    State(state): State<ChatRouteState>,
    Query(query): Query<SessionRequest>,
) -> impl IntoResponse {
    let id = session_id(query.session_id);
    Json(state.sessions.welcome(&state.machine, &id).await)
}

/// POST /api/message `{session_id, text}`
async fn message(
    State(state): State<ChatRouteState>,
    Json(body): Json<MessageRequest>,
) -> impl IntoResponse {
    let id = session_id(body.session_id);
    debug!(session_id = %id, "Chat message received");
    let reply = state.sessions.process(&state.machine, &id, &body.text).await;
    Json(reply)
}

/// POST /api/reset `{session_id}`
async fn reset(
    State(state): State<ChatRouteState>,
    Json(body): Json<SessionRequest>,
) -> impl IntoResponse {
    let id = session_id(body.session_id);
    state.sessions.reset(&id).await;
    Json(serde_json::json!({"message": "Estado reiniciado correctamente."}))
}

/// GET /api/charts/{id}
///
/// Returns the chart description, or 404 if it is unknown or was evicted.
async fn chart(State(state): State<ChatRouteState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.charts.get(&id).await {
        Some(chart) => Json(chart).into_response(),
        None => {
            info!(chart_id = %id, "Chart not found");
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Gráfico no disponible."})),
            )
                .into_response()
        }
    }
}

/// Build the chat REST routes.
pub fn chat_routes(state: ChatRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/welcome", get(welcome))
        .route("/api/message", post(message))
        .route("/api/reset", post(reset))
        .route("/api/charts/{id}", get(chart))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

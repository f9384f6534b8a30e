use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
struct HealthResponse {
    success: bool,
    status: &'static str,
    timestamp: DateTime<Utc>,
    database: &'static str,
}

async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let database = if app_state.intake_use_cases.store_healthy().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        success: true,
        status: "Server is running",
        timestamp: Utc::now(),
        database,
    })
}

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::mail::EmailProvider;
use crate::state::AppState;

/// Health response structure
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub email_configured: bool,
    pub provider: EmailProvider,
    pub timestamp: String,
}

/// Health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let email_env = state.email_env();

    // Mail is optional for newsletter signups, so missing config only degrades
    let status = if email_env.has_email_config {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        email_configured: email_env.has_email_config,
        provider: email_env.provider,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::error::{AppError, Result};
use crate::mail::open_verified_transport;
use crate::models::TestEmailResponse;
use crate::state::AppState;

/// Diagnostic routes
pub fn test_email_routes() -> Router<AppState> {
    Router::new().route("/test-email", get(test_email))
}

/// GET /api/test-email - Verify the configured provider accepts our credentials
async fn test_email(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<TestEmailResponse>)> {
    let email_env = state.email_env();

    tracing::info!(
        provider = %email_env.provider,
        user = %email_env.user,
        has_app_password = email_env.app_password.is_some(),
        has_password = email_env.password.is_some(),
        "Testing email configuration"
    );

    if !email_env.has_email_config {
        return Err(AppError::EmailNotConfigured(email_env.missing_env_vars));
    }

    match open_verified_transport(state.connector.as_ref(), &email_env).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(TestEmailResponse {
                success: true,
                message: Some(format!("{} configuration is working!", email_env.provider)),
                provider: Some(email_env.provider),
                error: None,
                code: None,
            }),
        )),
        Err(e) => {
            tracing::error!(error = %e, provider = %email_env.provider, "Email test failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TestEmailResponse {
                    success: false,
                    message: None,
                    provider: Some(email_env.provider),
                    error: Some(e.to_string()),
                    code: Some(e.code().to_string()),
                }),
            ))
        }
    }
}

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::mail::templates::{chat_handoff, ChatHandoff};
use crate::mail::{open_verified_transport, EmailEnvironment, MailError};
use crate::models::{ChatRequest, ChatResponse};
use crate::state::AppState;
use crate::validation::required;

const HANDOFF_MESSAGE: &str = "Human assistance request sent! Our team will be with you shortly.";
const HANDOFF_BOT_RESPONSE: &str = "Perfect! I've notified our human team and they'll be with you in just a moment. In the meantime, feel free to tell me more about what you need help with! 🤝";

/// Chat routes
pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat_message))
}

/// POST /api/chat - Accept a chat message, paging the team when a human is requested
async fn chat_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let message = required(&request.message)
        .ok_or_else(|| AppError::BadRequest("Message is required".to_string()))?;

    if !request.request_human {
        return Ok(Json(ChatResponse {
            success: true,
            message: "Message received".to_string(),
            bot_response: None,
        }));
    }

    let handoff = ChatHandoff {
        message,
        user_name: request.user_name.as_deref().filter(|s| !s.is_empty()),
        user_email: request.user_email.as_deref().filter(|s| !s.is_empty()),
        requested_at: Utc::now(),
    };

    // The visitor gets an answer either way; the alert is best effort
    let email_env = state.email_env();
    if email_env.has_email_config {
        match notify_team(&state, &email_env, &handoff).await {
            Ok(()) => tracing::info!(
                to = %email_env.notification_email,
                "Human assistance request sent"
            ),
            Err(e) => tracing::error!(
                error = %e,
                code = e.code(),
                provider = %email_env.provider,
                "Failed to send human assistance notification"
            ),
        }
    } else {
        tracing::info!(
            missing = ?email_env.missing_env_vars,
            "Skipping chat handoff email, configuration incomplete"
        );
    }

    Ok(Json(ChatResponse {
        success: true,
        message: HANDOFF_MESSAGE.to_string(),
        bot_response: Some(HANDOFF_BOT_RESPONSE.to_string()),
    }))
}

async fn notify_team(
    state: &AppState,
    email_env: &EmailEnvironment,
    handoff: &ChatHandoff<'_>,
) -> std::result::Result<(), MailError> {
    let transport = open_verified_transport(state.connector.as_ref(), email_env).await?;
    transport.send_mail(&chat_handoff(email_env, handoff)).await
}

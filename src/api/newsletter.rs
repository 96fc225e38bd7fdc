use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::mail::templates::{newsletter_alert, newsletter_welcome};
use crate::mail::{open_verified_transport, EmailEnvironment, MailError};
use crate::models::{NewsletterStatsResponse, SubscribeRequest, SubscribeResponse};
use crate::newsletter::SubscribeOutcome;
use crate::state::AppState;
use crate::validation::{is_valid_email, required};

const RECENT_SIGNUPS: usize = 10;

/// Newsletter routes
pub fn newsletter_routes() -> Router<AppState> {
    Router::new().route("/newsletter", get(newsletter_stats).post(subscribe))
}

/// POST /api/newsletter - Join the Pup Squad
async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>> {
    let email = required(&request.email)
        .filter(|email| is_valid_email(email))
        .ok_or_else(|| AppError::BadRequest("Please enter a valid email address".to_string()))?;

    let (email, total) = match state.newsletter.subscribe(email).await? {
        SubscribeOutcome::Subscribed { email, total } => (email, total),
        SubscribeOutcome::AlreadySubscribed => {
            return Err(AppError::Conflict(
                "Email already subscribed to the Pup Squad!".to_string(),
            ));
        }
    };

    // The signup is stored; mail is best effort from here on
    let email_env = state.email_env();
    if email_env.has_email_config {
        if let Err(e) = notify_signup(&state, &email_env, &email, total).await {
            tracing::error!(
                error = %e,
                code = e.code(),
                provider = %email_env.provider,
                "Newsletter email delivery failed"
            );
        }
    } else {
        tracing::info!(
            missing = ?email_env.missing_env_vars,
            "Skipping newsletter emails, configuration incomplete"
        );
    }

    Ok(Json(SubscribeResponse {
        success: true,
        message: "Welcome to the Pup Squad! 🎉".to_string(),
        total_subscribers: total,
    }))
}

async fn notify_signup(
    state: &AppState,
    email_env: &EmailEnvironment,
    subscriber: &str,
    total: usize,
) -> std::result::Result<(), MailError> {
    let transport = open_verified_transport(state.connector.as_ref(), email_env).await?;
    let now = Utc::now();

    transport
        .send_mail(&newsletter_alert(email_env, subscriber, total, now))
        .await?;
    tracing::info!(to = %email_env.notification_email, "Signup alert sent");

    transport
        .send_mail(&newsletter_welcome(email_env, subscriber, now))
        .await?;
    tracing::info!("Welcome email sent to subscriber");

    Ok(())
}

/// GET /api/newsletter - Subscriber count and the latest signups
async fn newsletter_stats(State(state): State<AppState>) -> Result<Json<NewsletterStatsResponse>> {
    let (total_subscribers, signups) = state.newsletter.recent(RECENT_SIGNUPS).await;

    Ok(Json(NewsletterStatsResponse {
        total_subscribers,
        signups,
    }))
}

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::mail::templates::{contact_auto_reply, contact_notification, ContactSubmission};
use crate::mail::{open_verified_transport, MailError};
use crate::models::{ContactRequest, ContactResponse};
use crate::state::AppState;
use crate::validation::{is_valid_email, required};

const MIN_MESSAGE_CHARS: usize = 10;
const DELIVERY_FAILED_MESSAGE: &str =
    "Failed to send message. Please try again or contact us directly at hello@pupito.com";

/// Contact routes
pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact))
}

/// `#` followed by the last eight digits of the current millisecond timestamp
fn reference_id(now_millis: i64) -> String {
    format!("#{:08}", now_millis.rem_euclid(100_000_000))
}

/// POST /api/contact - Relay a contact form submission to the shop
async fn submit_contact(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<ContactResponse>> {
    let (Some(name), Some(email), Some(topic), Some(message)) = (
        required(&request.name),
        required(&request.email),
        required(&request.subject),
        required(&request.message),
    ) else {
        return Err(AppError::BadRequest(
            "Please fill in all required fields".to_string(),
        ));
    };

    if !is_valid_email(email) {
        return Err(AppError::BadRequest(
            "Please enter a valid email address".to_string(),
        ));
    }

    if message.chars().count() < MIN_MESSAGE_CHARS {
        return Err(AppError::BadRequest(
            "Please provide a more detailed message (at least 10 characters)".to_string(),
        ));
    }

    let email_env = state.email_env();
    if !email_env.has_email_config {
        return Err(AppError::EmailNotConfigured(email_env.missing_env_vars));
    }

    let now = Utc::now();
    let reference_id = reference_id(now.timestamp_millis());
    let submission = ContactSubmission {
        name,
        email,
        topic,
        message,
        reference_id: &reference_id,
        submitted_at: now,
    };

    let delivery = async {
        let transport = open_verified_transport(state.connector.as_ref(), &email_env).await?;
        transport
            .send_mail(&contact_notification(&email_env, &submission))
            .await?;
        transport
            .send_mail(&contact_auto_reply(&email_env, &submission))
            .await?;
        Ok::<_, MailError>(())
    };

    if let Err(e) = delivery.await {
        tracing::error!(
            error = %e,
            code = e.code(),
            provider = %email_env.provider,
            "Contact form email delivery failed"
        );
        return Err(AppError::DeliveryFailed(DELIVERY_FAILED_MESSAGE.to_string()));
    }

    tracing::info!(reference_id = %reference_id, topic = %topic, "Contact form emails sent");

    Ok(Json(ContactResponse {
        success: true,
        message: "Message sent successfully! We'll get back to you within 4 hours.".to_string(),
        reference_id,
    }))
}

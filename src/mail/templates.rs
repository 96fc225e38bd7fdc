//! Outgoing messages for the contact form and the newsletter.

use chrono::{DateTime, Datelike, Utc};

use super::env::EmailEnvironment;

const BRAND_FOOTER: &str = "PUPITO • Anime streetwear for every arc of you";

/// A message ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Contact form submission after validation
#[derive(Debug, Clone)]
pub struct ContactSubmission<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub topic: &'a str,
    pub message: &'a str,
    pub reference_id: &'a str,
    pub submitted_at: DateTime<Utc>,
}

pub fn topic_icon(topic: &str) -> &'static str {
    match topic {
        "order" => "📦",
        "sizing" => "📏",
        "returns" => "↩️",
        "product" => "👕",
        "feedback" => "💭",
        _ => "💬",
    }
}

fn is_high_priority(topic: &str) -> bool {
    matches!(topic, "order" | "returns")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn wrap(inner: &str, now: DateTime<Utc>) -> String {
    format!(
        r#"<div style="background: #0D0D0D; color: white; padding: 30px 20px; font-family: 'Lato', 'Segoe UI', Arial, sans-serif; max-width: 700px; margin: 0 auto; border-radius: 12px;">
  <div style="text-align: center; margin-bottom: 30px;">
    <h1 style="color: #FF69B4; margin: 0; font-size: 28px; font-weight: 900;">PUPITO</h1>
    <p style="color: #FFD700; font-size: 12px; margin: 2px 0 0 0; letter-spacing: 2px;">ANIME STREETWEAR</p>
  </div>
{inner}
  <div style="text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #333;">
    <p style="color: #555; font-size: 12px; margin: 0;">© {year} {BRAND_FOOTER}</p>
  </div>
</div>"#,
        year = now.year(),
    )
}

/// Alert sent to the shop owner for a contact form submission.
pub fn contact_notification(
    env: &EmailEnvironment,
    submission: &ContactSubmission<'_>,
) -> OutgoingMail {
    let icon = topic_icon(submission.topic);
    let topic = capitalize(submission.topic);
    let topic_html = escape_html(&topic);
    let submitted = submission.submitted_at.format("%Y-%m-%d %H:%M:%S UTC");
    let name = escape_html(submission.name);
    let email = escape_html(submission.email);
    let message = escape_html(submission.message);

    let priority = if is_high_priority(submission.topic) {
        r#"  <div style="border: 2px solid #FF4500; border-radius: 8px; padding: 15px; margin: 20px 0; text-align: center;">
    <span style="color: #FF4500; font-weight: bold;">⚠️ HIGH PRIORITY</span>
    <p style="color: #FFA500; margin: 5px 0 0 0; font-size: 14px;">Customer needs urgent assistance with order/return issue</p>
  </div>
"#
    } else {
        ""
    };

    let inner = format!(
        r#"  <h2 style="color: #FFD700; text-align: center;">{icon} New Contact Form Submission</h2>
  <div style="background: #1A1A1A; padding: 25px; border-radius: 10px; margin: 25px 0;">
    <h3 style="color: #00FFFF; margin: 0 0 20px 0;">Customer Details:</h3>
    <p><strong style="color: #FF69B4;">👤 Name:</strong> {name}</p>
    <p><strong style="color: #FF69B4;">📧 Email:</strong> <a href="mailto:{email}" style="color: #00FFFF;">{email}</a></p>
    <p><strong style="color: #FF69B4;">📂 Topic:</strong> {topic_html}</p>
    <p><strong style="color: #FF69B4;">🕒 Time:</strong> {submitted}</p>
    <p><strong style="color: #FF69B4;">🔖 Reference:</strong> {reference}</p>
  </div>
  <div style="background: #1A1A1A; padding: 25px; border-radius: 10px; margin: 25px 0;">
    <h3 style="color: #FFD700; margin: 0 0 15px 0;">💬 Message:</h3>
    <p style="white-space: pre-wrap; line-height: 1.6;">{message}</p>
  </div>
{priority}"#,
        reference = submission.reference_id,
    );

    let text = format!(
        "New contact form submission{flag}\n\nName: {}\nEmail: {}\nTopic: {topic}\nTime: {submitted}\nReference: {}\n\n{}\n",
        submission.name,
        submission.email,
        submission.reference_id,
        submission.message,
        flag = if is_high_priority(submission.topic) {
            " (HIGH PRIORITY)"
        } else {
            ""
        },
    );

    OutgoingMail {
        from_name: "PUPITO Contact Form".to_string(),
        from_address: env.user.clone(),
        to: env.notification_email.clone(),
        reply_to: Some(submission.email.to_string()),
        subject: format!("{icon} PUPITO Contact: {topic}"),
        html: wrap(&inner, submission.submitted_at),
        text,
    }
}

/// Confirmation sent back to the customer.
pub fn contact_auto_reply(
    env: &EmailEnvironment,
    submission: &ContactSubmission<'_>,
) -> OutgoingMail {
    let topic = capitalize(submission.topic);
    let topic_html = escape_html(&topic);
    let name = escape_html(submission.name);

    let inner = format!(
        r#"  <div style="background: #1A1A1A; padding: 25px; border-radius: 13px; text-align: center;">
    <h2 style="color: #32CD32; margin: 0 0 15px 0;">✅ Message Received!</h2>
    <p>Hey <strong style="color: #FFD700;">{name}</strong>! Thanks for reaching out to the PUPITO squad.</p>
  </div>
  <div style="margin: 25px 0;">
    <p>📧 Our team will read your message about <strong style="color: #FFD700;">{topic_html}</strong>.</p>
    <p>⏱️ Expect a personalized response within 4 hours (usually much faster!)</p>
    <p>🎯 A real person (not a bot!) will personally handle your inquiry.</p>
  </div>
  <div style="background: #1A1A1A; padding: 20px; border-radius: 8px; border: 1px solid #333;">
    <p style="color: #999; font-size: 13px;"><strong>Topic:</strong> {topic_html}</p>
    <p style="color: #999; font-size: 13px;"><strong>Reference ID:</strong> {reference}</p>
  </div>
"#,
        reference = submission.reference_id,
    );

    let text = format!(
        "Hey {}! Thanks for reaching out to the PUPITO squad.\n\n\
         We'll review your message about {topic} and reply within 4 hours.\n\
         Reference ID: {}\n",
        submission.name, submission.reference_id,
    );

    OutgoingMail {
        from_name: "PUPITO Support".to_string(),
        from_address: env.user.clone(),
        to: submission.email.to_string(),
        reply_to: None,
        subject: "✅ We got your message! - PUPITO Support".to_string(),
        html: wrap(&inner, submission.submitted_at),
        text,
    }
}

/// Alert sent to the shop owner when someone joins the newsletter.
pub fn newsletter_alert(
    env: &EmailEnvironment,
    subscriber: &str,
    total_subscribers: usize,
    now: DateTime<Utc>,
) -> OutgoingMail {
    let email = escape_html(subscriber);
    let signed_up = now.format("%Y-%m-%d %H:%M:%S UTC");

    let inner = format!(
        r#"  <h2 style="color: #FF69B4; text-align: center;">PUPITO Pup Squad Alert! 🚀</h2>
  <div style="background: #1A1A1A; padding: 15px; border-radius: 6px;">
    <h3 style="color: #FFD700; margin-top: 0;">New Squad Member Details:</h3>
    <p><strong style="color: #00FFFF;">Email:</strong> {email}</p>
    <p><strong style="color: #00FFFF;">Signup Date:</strong> {signed_up}</p>
    <p><strong style="color: #00FFFF;">Total Squad Members:</strong> <span style="color: #32CD32; font-weight: bold;">{total_subscribers}</span></p>
  </div>
"#
    );

    OutgoingMail {
        from_name: "PUPITO Squad Alerts".to_string(),
        from_address: env.user.clone(),
        to: env.notification_email.clone(),
        reply_to: None,
        subject: "🎯 New PUPITO Pup Squad Member!".to_string(),
        html: wrap(&inner, now),
        text: format!(
            "New Pup Squad member: {subscriber}\nSignup date: {signed_up}\nTotal squad members: {total_subscribers}\n"
        ),
    }
}

/// Welcome message for a new newsletter subscriber.
pub fn newsletter_welcome(
    env: &EmailEnvironment,
    subscriber: &str,
    now: DateTime<Utc>,
) -> OutgoingMail {
    let inner = r#"  <div style="background: #1A1A1A; padding: 30px; border-radius: 13px; text-align: center;">
    <h2 style="color: #FFD700; margin: 0 0 15px 0;">WELCOME TO THE SQUAD! 🚀</h2>
    <p style="font-size: 18px;">Your anime streetwear journey starts now. Get ready for exclusive drops and epic designs!</p>
  </div>
  <div style="margin: 30px 0;">
    <p>🎁 <strong>Early Access</strong>: first look at new collections and limited drops</p>
    <p>💎 <strong>Exclusive Deals</strong>: member-only discounts and flash sales</p>
    <p>🎨 <strong>Design Stories</strong>: behind-the-scenes content and anime inspirations</p>
  </div>
  <p style="text-align: center; color: #AAAAAA;">Use code <strong style="color: #FF69B4;">FIRSTPUP</strong> for 10% off your first order</p>
"#;

    OutgoingMail {
        from_name: "PUPITO Pup Squad".to_string(),
        from_address: env.user.clone(),
        to: subscriber.to_string(),
        reply_to: None,
        subject: "🎉 Welcome to the PUPITO Pup Squad!".to_string(),
        html: wrap(inner, now),
        text: "Welcome to the PUPITO Pup Squad!\n\n\
               Early access to new drops, member-only deals and design stories are on the way.\n\
               Use code FIRSTPUP for 10% off your first order.\n"
            .to_string(),
    }
}

/// Chat visitor asking for a person instead of the bot
#[derive(Debug, Clone)]
pub struct ChatHandoff<'a> {
    pub message: &'a str,
    pub user_name: Option<&'a str>,
    pub user_email: Option<&'a str>,
    pub requested_at: DateTime<Utc>,
}

/// Alert sent to the shop owner when a chat visitor requests a human.
pub fn chat_handoff(env: &EmailEnvironment, handoff: &ChatHandoff<'_>) -> OutgoingMail {
    let requested = handoff.requested_at.format("%Y-%m-%d %H:%M:%S UTC");
    let message = escape_html(handoff.message);

    let mut details = String::new();
    if let Some(name) = handoff.user_name {
        details.push_str(&format!(
            "    <p><strong style=\"color: #22d3ee;\">👤 Name:</strong> {}</p>\n",
            escape_html(name)
        ));
    }
    let mut reply_button = String::new();
    if let Some(email) = handoff.user_email {
        let email = escape_html(email);
        details.push_str(&format!(
            "    <p><strong style=\"color: #22d3ee;\">📧 Email:</strong> <a href=\"mailto:{email}\" style=\"color: #00FFFF;\">{email}</a></p>\n"
        ));
        reply_button = format!(
            r#"    <a href="mailto:{email}?subject=Re: PUPITO Chat Support" style="display: inline-block; background: #22d3ee; color: black; padding: 12px 25px; border-radius: 20px; text-decoration: none; font-weight: bold;">📧 Reply via Email</a>
"#
        );
    }

    let inner = format!(
        r#"  <h2 style="color: #FFD700; text-align: center;">🤖➡️👨 Human Assistance Request</h2>
  <div style="background: #1A1A1A; padding: 20px; border-radius: 9px; text-align: center;">
    <h3 style="color: #14b8a6; margin: 0 0 10px 0;">⚠️ Priority Chat Request</h3>
    <p style="margin: 0; font-size: 14px;">A customer has requested to speak with a human team member</p>
  </div>
  <div style="background: #1A1A1A; padding: 20px; border-radius: 10px; margin: 25px 0;">
    <h3 style="color: #00FFFF; margin: 0 0 15px 0;">Customer Details:</h3>
{details}    <p><strong style="color: #22d3ee;">🕒 Time:</strong> {requested}</p>
  </div>
  <div style="background: #1A1A1A; padding: 20px; border-radius: 10px; margin: 25px 0;">
    <h3 style="color: #FFD700; margin: 0 0 15px 0;">💬 Customer's Message:</h3>
    <p style="white-space: pre-wrap; line-height: 1.6;">{message}</p>
  </div>
  <div style="border: 2px solid #32CD32; border-radius: 8px; padding: 15px; margin: 20px 0; text-align: center;">
    <span style="color: #32CD32; font-weight: bold;">✨ ACTION REQUIRED</span>
    <p style="color: #98FB98; margin: 8px 0 0 0; font-size: 14px;">Customer is waiting for human assistance in the chat</p>
  </div>
  <div style="text-align: center; margin: 25px 0;">
{reply_button}  </div>
"#
    );

    let text = format!(
        "Human assistance requested in chat\n\nName: {}\nEmail: {}\nTime: {requested}\n\n{}\n",
        handoff.user_name.unwrap_or("-"),
        handoff.user_email.unwrap_or("-"),
        handoff.message,
    );

    OutgoingMail {
        from_name: "PUPITO Chat Alert".to_string(),
        from_address: env.user.clone(),
        to: env.notification_email.clone(),
        reply_to: handoff.user_email.map(str::to_string),
        subject: "🤖➡️👨 PUPITO Chat: Human Assistance Requested".to_string(),
        html: wrap(&inner, handoff.requested_at),
        text,
    }
}

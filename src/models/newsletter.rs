use serde::{Deserialize, Serialize};

use crate::newsletter::Signup;

#[derive(Debug, Default, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
    pub total_subscribers: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterStatsResponse {
    pub total_subscribers: usize,
    pub signups: Vec<Signup>,
}

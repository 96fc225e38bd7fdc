pub mod chat;
pub mod contact;
pub mod diagnostics;
pub mod newsletter;

pub use chat::{ChatRequest, ChatResponse};
pub use contact::{ContactRequest, ContactResponse};
pub use diagnostics::TestEmailResponse;
pub use newsletter::{NewsletterStatsResponse, SubscribeRequest, SubscribeResponse};

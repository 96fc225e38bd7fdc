pub mod env;
pub mod smtp;
pub mod templates;
pub mod transport;

use async_trait::async_trait;

pub use env::{resolve_email_env, EmailEnvironment, EmailProvider};
pub use smtp::SmtpConnector;
pub use templates::OutgoingMail;
pub use transport::{build_transport_config, MailTransportConfig};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Unsupported email provider: {0}")]
    UnsupportedProvider(String),

    #[error("Invalid mail configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Transport verification failed: {0}")]
    VerificationFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),
}

impl MailError {
    /// Short machine-readable code reported by the diagnostic endpoint
    pub fn code(&self) -> &'static str {
        match self {
            MailError::UnsupportedProvider(_) => "EPROVIDER",
            MailError::InvalidConfig(_) => "ECONFIG",
            MailError::InvalidAddress(_) => "EADDRESS",
            MailError::VerificationFailed(_) => "EVERIFY",
            MailError::SendFailed(_) => "ESEND",
        }
    }
}

/// A connected mail transport
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Check that the server accepts our connection and credentials.
    async fn verify(&self) -> Result<(), MailError>;

    async fn send_mail(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Turns a transport config into a live transport
pub trait TransportConnector: Send + Sync {
    fn connect(&self, config: &MailTransportConfig) -> Result<Box<dyn MailTransport>, MailError>;
}

/// Build, connect and verify a transport for `env`.
///
/// Callers must check `env.has_email_config` first.
pub async fn open_verified_transport(
    connector: &dyn TransportConnector,
    env: &EmailEnvironment,
) -> Result<Box<dyn MailTransport>, MailError> {
    let config = build_transport_config(env)?;
    let transport = connector.connect(&config)?;
    transport.verify().await?;

    tracing::debug!(provider = %env.provider, "Mail transport verified");
    Ok(transport)
}

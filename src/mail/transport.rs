//! Provider-specific transport settings.

use std::fmt;

use super::env::{EmailEnvironment, EmailProvider};
use super::MailError;

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpAuth {
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for SmtpAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpAuth")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Services the mail client knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnownService {
    Gmail,
}

impl WellKnownService {
    pub fn name(&self) -> &'static str {
        match self {
            WellKnownService::Gmail => "gmail",
        }
    }

    /// Implicit-TLS submission relay for the service
    pub fn relay_host(&self) -> &'static str {
        match self {
            WellKnownService::Gmail => "smtp.gmail.com",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMechanism {
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsOptions {
    pub ciphers: Option<String>,
    pub reject_unauthorized: bool,
}

impl TlsOptions {
    fn accept_any_certificate() -> Self {
        Self {
            ciphers: None,
            reject_unauthorized: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Implicit TLS from the first byte
    pub secure: bool,
    /// Refuse to continue without STARTTLS
    pub require_tls: bool,
    pub auth_mechanism: Option<AuthMechanism>,
    pub tls: TlsOptions,
    pub auth: SmtpAuth,
}

/// Connection parameters for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransportConfig {
    Service {
        service: WellKnownService,
        auth: SmtpAuth,
    },
    Smtp(SmtpSettings),
}

impl MailTransportConfig {
    pub fn host(&self) -> Option<&str> {
        match self {
            MailTransportConfig::Service { .. } => None,
            MailTransportConfig::Smtp(settings) => Some(&settings.host),
        }
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            MailTransportConfig::Service { .. } => None,
            MailTransportConfig::Smtp(settings) => Some(settings.port),
        }
    }

    pub fn secure(&self) -> Option<bool> {
        match self {
            MailTransportConfig::Service { .. } => None,
            MailTransportConfig::Smtp(settings) => Some(settings.secure),
        }
    }

    pub fn auth(&self) -> &SmtpAuth {
        match self {
            MailTransportConfig::Service { auth, .. } => auth,
            MailTransportConfig::Smtp(settings) => &settings.auth,
        }
    }
}

type ProviderBuilder = fn(&EmailEnvironment) -> Result<MailTransportConfig, MailError>;

const PROVIDER_BUILDERS: &[(EmailProvider, ProviderBuilder)] = &[
    (EmailProvider::Gmail, gmail),
    (EmailProvider::Outlook, outlook),
    (EmailProvider::OutlookBasic, outlook_basic),
    (EmailProvider::Hostinger, hostinger),
];

/// Build the transport config for `env.provider`.
pub fn build_transport_config(env: &EmailEnvironment) -> Result<MailTransportConfig, MailError> {
    build_from_table(PROVIDER_BUILDERS, env)
}

fn build_from_table(
    table: &[(EmailProvider, ProviderBuilder)],
    env: &EmailEnvironment,
) -> Result<MailTransportConfig, MailError> {
    if env.user.trim().is_empty() {
        return Err(MailError::InvalidConfig(
            "EMAIL_USER is required to configure the email transport".to_string(),
        ));
    }

    let builder = table
        .iter()
        .find(|(provider, _)| *provider == env.provider)
        .map(|(_, builder)| *builder)
        .ok_or_else(|| MailError::UnsupportedProvider(env.provider.to_string()))?;

    builder(env)
}

fn smtp_auth(env: &EmailEnvironment) -> Result<SmtpAuth, MailError> {
    let pass = env.password_for_transport().ok_or_else(|| {
        MailError::InvalidConfig("EMAIL_APP_PASSWORD or EMAIL_PASSWORD is required".to_string())
    })?;

    Ok(SmtpAuth {
        user: env.user.clone(),
        pass: pass.to_string(),
    })
}

fn gmail(env: &EmailEnvironment) -> Result<MailTransportConfig, MailError> {
    // Gmail only accepts app passwords
    let pass = env.app_password.clone().ok_or_else(|| {
        MailError::InvalidConfig("EMAIL_APP_PASSWORD is required for gmail".to_string())
    })?;

    Ok(MailTransportConfig::Service {
        service: WellKnownService::Gmail,
        auth: SmtpAuth {
            user: env.user.clone(),
            pass,
        },
    })
}

fn outlook(env: &EmailEnvironment) -> Result<MailTransportConfig, MailError> {
    Ok(MailTransportConfig::Smtp(SmtpSettings {
        host: "smtp-mail.outlook.com".to_string(),
        port: 587,
        secure: false,
        require_tls: true,
        auth_mechanism: Some(AuthMechanism::Plain),
        tls: TlsOptions {
            ciphers: Some("SSLv3".to_string()),
            reject_unauthorized: false,
        },
        auth: smtp_auth(env)?,
    }))
}

fn outlook_basic(env: &EmailEnvironment) -> Result<MailTransportConfig, MailError> {
    Ok(MailTransportConfig::Smtp(SmtpSettings {
        host: "smtp.office365.com".to_string(),
        port: 587,
        secure: false,
        require_tls: false,
        auth_mechanism: None,
        tls: TlsOptions::accept_any_certificate(),
        auth: smtp_auth(env)?,
    }))
}

fn hostinger(env: &EmailEnvironment) -> Result<MailTransportConfig, MailError> {
    Ok(MailTransportConfig::Smtp(SmtpSettings {
        host: env.host.clone(),
        port: env.port,
        secure: env.secure,
        require_tls: false,
        auth_mechanism: None,
        tls: TlsOptions::accept_any_certificate(),
        auth: smtp_auth(env)?,
    }))
}

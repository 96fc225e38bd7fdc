//! Email environment resolution.
//!
//! Turns raw environment variables into an [`EmailEnvironment`]. Missing configuration is
//! reported as data (`missing_env_vars`), never as an error.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::EnvSource;

pub const DEFAULT_SMTP_HOST: &str = "smtp.hostinger.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const PASSWORD_DESCRIPTOR: &str = "EMAIL_APP_PASSWORD or EMAIL_PASSWORD";

/// Supported mail providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailProvider {
    Gmail,
    #[default]
    Outlook,
    OutlookBasic,
    Hostinger,
}

impl EmailProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProvider::Gmail => "gmail",
            EmailProvider::Outlook => "outlook",
            EmailProvider::OutlookBasic => "outlook-basic",
            EmailProvider::Hostinger => "hostinger",
        }
    }
}

impl fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown email provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for EmailProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gmail" => Ok(EmailProvider::Gmail),
            "outlook" => Ok(EmailProvider::Outlook),
            "outlook-basic" => Ok(EmailProvider::OutlookBasic),
            "hostinger" => Ok(EmailProvider::Hostinger),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Resolved email settings for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailEnvironment {
    pub provider: EmailProvider,
    pub user: String,
    pub app_password: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub notification_email: String,
    pub has_email_config: bool,
    pub missing_env_vars: Vec<String>,
    /// Non-empty `EMAIL_PROVIDER` value that fell back to outlook
    pub unrecognized_provider: Option<String>,
}

impl EmailEnvironment {
    /// Credential handed to SMTP providers: app password first, then the plain password.
    pub fn password_for_transport(&self) -> Option<&str> {
        self.app_password.as_deref().or(self.password.as_deref())
    }

    /// Emit warnings for configuration an operator should look at.
    pub fn log_diagnostics(&self) {
        if let Some(raw) = &self.unrecognized_provider {
            tracing::warn!(
                value = %raw,
                fallback = %self.provider,
                "Unrecognized EMAIL_PROVIDER, falling back to default provider"
            );
        }
        if !self.has_email_config {
            tracing::warn!(
                provider = %self.provider,
                missing = ?self.missing_env_vars,
                "Email configuration incomplete"
            );
        }
    }
}

/// Resolve the email environment from `env`.
pub fn resolve_email_env(env: &(impl EnvSource + ?Sized)) -> EmailEnvironment {
    let raw_provider = env.get("EMAIL_PROVIDER");
    let (provider, unrecognized_provider) =
        match raw_provider.as_deref().map(str::parse::<EmailProvider>) {
            None => (EmailProvider::default(), None),
            Some(Ok(provider)) => (provider, None),
            Some(Err(UnknownProvider(raw))) => (EmailProvider::default(), Some(raw)),
        };

    let user = env.get("EMAIL_USER");
    let app_password = env.get("EMAIL_APP_PASSWORD");
    let password = env.get("EMAIL_PASSWORD");
    let explicit_host = env.get("EMAIL_HOST");
    // Unparsable ports are treated as unset
    let explicit_port = env
        .get("EMAIL_PORT")
        .and_then(|raw| raw.trim().parse::<u16>().ok())
        .filter(|port| *port != 0);

    let mut missing_env_vars = Vec::new();

    if user.is_none() {
        missing_env_vars.push("EMAIL_USER".to_string());
    }

    if provider == EmailProvider::Gmail {
        if app_password.is_none() {
            missing_env_vars.push("EMAIL_APP_PASSWORD".to_string());
        }
    } else if app_password.is_none() && password.is_none() {
        missing_env_vars.push(PASSWORD_DESCRIPTOR.to_string());
    }

    if provider == EmailProvider::Hostinger {
        if explicit_host.is_none() {
            missing_env_vars.push("EMAIL_HOST".to_string());
        }
        if explicit_port.is_none() {
            missing_env_vars.push("EMAIL_PORT".to_string());
        }
    }

    let notification_email = env
        .get("NOTIFICATION_EMAIL")
        .or_else(|| user.clone())
        .unwrap_or_default();

    EmailEnvironment {
        provider,
        user: user.unwrap_or_default(),
        app_password,
        password,
        host: explicit_host.unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
        port: explicit_port.unwrap_or(DEFAULT_SMTP_PORT),
        secure: env.raw("EMAIL_SECURE").as_deref() == Some("true"),
        notification_email,
        has_email_config: missing_env_vars.is_empty(),
        missing_env_vars,
        unrecognized_provider,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_user_is_reported() {
        for provider in ["gmail", "outlook", "outlook-basic", "hostinger", ""] {
            let env = resolve_email_env(&env_of(&[
                ("EMAIL_PROVIDER", provider),
                ("EMAIL_APP_PASSWORD", "x"),
            ]));
            assert!(env.missing_env_vars.contains(&"EMAIL_USER".to_string()));
            assert!(!env.has_email_config);
        }
    }

    #[test]
    fn test_gmail_requires_app_password() {
        let env = resolve_email_env(&env_of(&[
            ("EMAIL_PROVIDER", "gmail"),
            ("EMAIL_USER", "shop@gmail.com"),
            ("EMAIL_PASSWORD", "plain"),
        ]));

        assert!(!env.has_email_config);
        assert_eq!(env.missing_env_vars, vec!["EMAIL_APP_PASSWORD"]);
    }

    #[test]
    fn test_non_gmail_accepts_either_password() {
        let env = resolve_email_env(&env_of(&[
            ("EMAIL_PROVIDER", "outlook-basic"),
            ("EMAIL_USER", "shop@outlook.com"),
            ("EMAIL_PASSWORD", "plain"),
        ]));

        assert!(env.has_email_config);
        assert_eq!(env.password_for_transport(), Some("plain"));
    }

    #[test]
    fn test_app_password_wins_over_password() {
        let env = resolve_email_env(&env_of(&[
            ("EMAIL_USER", "shop@outlook.com"),
            ("EMAIL_APP_PASSWORD", "app"),
            ("EMAIL_PASSWORD", "plain"),
        ]));

        assert_eq!(env.password_for_transport(), Some("app"));
    }

    #[test]
    fn test_hostinger_requires_explicit_host_and_port() {
        let env = resolve_email_env(&env_of(&[
            ("EMAIL_PROVIDER", "hostinger"),
            ("EMAIL_USER", "hello@pupito.com"),
            ("EMAIL_PASSWORD", "plain"),
        ]));

        assert!(!env.has_email_config);
        assert_eq!(env.missing_env_vars, vec!["EMAIL_HOST", "EMAIL_PORT"]);
        assert_eq!(env.host, DEFAULT_SMTP_HOST);
        assert_eq!(env.port, DEFAULT_SMTP_PORT);
        assert!(!env.secure);
    }

    #[test]
    fn test_hostinger_overrides() {
        let env = resolve_email_env(&env_of(&[
            ("EMAIL_PROVIDER", "hostinger"),
            ("EMAIL_USER", "hello@pupito.com"),
            ("EMAIL_PASSWORD", "plain"),
            ("EMAIL_HOST", "mail.pupito.com"),
            ("EMAIL_PORT", "465"),
            ("EMAIL_SECURE", "true"),
        ]));

        assert!(env.has_email_config);
        assert_eq!(env.host, "mail.pupito.com");
        assert_eq!(env.port, 465);
        assert!(env.secure);
    }

    #[test]
    fn test_invalid_port_fails_closed() {
        let env = resolve_email_env(&env_of(&[
            ("EMAIL_PROVIDER", "hostinger"),
            ("EMAIL_USER", "hello@pupito.com"),
            ("EMAIL_PASSWORD", "plain"),
            ("EMAIL_HOST", "mail.pupito.com"),
            ("EMAIL_PORT", "smtp"),
        ]));

        assert!(!env.has_email_config);
        assert_eq!(env.missing_env_vars, vec!["EMAIL_PORT"]);
        assert_eq!(env.port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn test_secure_requires_literal_true() {
        for value in ["TRUE", "1", "yes", ""] {
            let env = resolve_email_env(&env_of(&[("EMAIL_SECURE", value)]));
            assert!(!env.secure, "EMAIL_SECURE={value:?} must not enable TLS");
        }
    }

    #[test]
    fn test_provider_defaults_to_outlook() {
        let unset = resolve_email_env(&env_of(&[]));
        assert_eq!(unset.provider, EmailProvider::Outlook);
        assert_eq!(unset.unrecognized_provider, None);

        let typo = resolve_email_env(&env_of(&[("EMAIL_PROVIDER", "gmial")]));
        assert_eq!(typo.provider, EmailProvider::Outlook);
        assert_eq!(typo.unrecognized_provider.as_deref(), Some("gmial"));
    }

    #[test]
    fn test_notification_email_fallbacks() {
        let explicit = resolve_email_env(&env_of(&[
            ("EMAIL_USER", "shop@pupito.com"),
            ("NOTIFICATION_EMAIL", "owner@pupito.com"),
        ]));
        assert_eq!(explicit.notification_email, "owner@pupito.com");

        let fallback = resolve_email_env(&env_of(&[("EMAIL_USER", "shop@pupito.com")]));
        assert_eq!(fallback.notification_email, "shop@pupito.com");

        let empty = resolve_email_env(&env_of(&[]));
        assert_eq!(empty.notification_email, "");
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let env = env_of(&[
            ("EMAIL_PROVIDER", "hostinger"),
            ("EMAIL_USER", "hello@pupito.com"),
        ]);
        assert_eq!(resolve_email_env(&env), resolve_email_env(&env));
    }

    #[test]
    fn test_outlook_scenario() {
        let env = resolve_email_env(&env_of(&[
            ("EMAIL_PROVIDER", "outlook"),
            ("EMAIL_USER", "a@b.com"),
            ("EMAIL_APP_PASSWORD", "x"),
        ]));

        assert!(env.has_email_config);
        assert!(env.missing_env_vars.is_empty());
        assert_eq!(env.notification_email, "a@b.com");
    }

    #[test]
    fn test_empty_environment() {
        let env = resolve_email_env(&env_of(&[]));

        assert!(!env.has_email_config);
        assert_eq!(env.missing_env_vars, vec!["EMAIL_USER", PASSWORD_DESCRIPTOR]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logs_of(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_diagnostics_warn_on_unrecognized_provider() {
        let env = resolve_email_env(&env_of(&[
            ("EMAIL_PROVIDER", "sendgrid"),
            ("EMAIL_USER", "a@b.com"),
            ("EMAIL_APP_PASSWORD", "x"),
        ]));

        let output = logs_of(|| env.log_diagnostics());

        assert!(output.contains("WARN"));
        assert!(output.contains("Unrecognized EMAIL_PROVIDER, falling back to default provider"));
        assert!(output.contains("sendgrid"));
        assert!(!output.contains("Email configuration incomplete"));
    }

    #[test]
    fn test_diagnostics_quiet_when_configured() {
        let env = resolve_email_env(&env_of(&[
            ("EMAIL_PROVIDER", "outlook"),
            ("EMAIL_USER", "a@b.com"),
            ("EMAIL_APP_PASSWORD", "x"),
        ]));

        assert!(logs_of(|| env.log_diagnostics()).is_empty());
    }
}

use std::sync::Arc;

use crate::config::{Config, EnvSource, ProcessEnv};
use crate::mail::{resolve_email_env, EmailEnvironment, SmtpConnector, TransportConnector};
use crate::newsletter::NewsletterStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub env: Arc<dyn EnvSource>,
    pub connector: Arc<dyn TransportConnector>,
    pub newsletter: Arc<NewsletterStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let newsletter = NewsletterStore::new(&config.data_dir);
        Self::with_parts(config, Arc::new(ProcessEnv), Arc::new(SmtpConnector), newsletter)
    }

    pub fn with_parts(
        config: Config,
        env: Arc<dyn EnvSource>,
        connector: Arc<dyn TransportConnector>,
        newsletter: NewsletterStore,
    ) -> Self {
        Self {
            config: Arc::new(config),
            env,
            connector,
            newsletter: Arc::new(newsletter),
        }
    }

    /// Resolve email settings fresh for this request.
    pub fn email_env(&self) -> EmailEnvironment {
        let env = resolve_email_env(&*self.env);
        env.log_diagnostics();
        env
    }
}

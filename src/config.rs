use std::collections::HashMap;
use std::env;

/// Source of environment variables.
///
/// Handlers resolve their configuration through this trait on every request so tests can
/// inject a plain map instead of mutating the process environment.
pub trait EnvSource: Send + Sync {
    /// Raw lookup. Implementations return `None` for unset keys.
    fn raw(&self, key: &str) -> Option<String>;

    /// Lookup treating empty values as unset.
    fn get(&self, key: &str) -> Option<String> {
        self.raw(key).filter(|value| !value.is_empty())
    }
}

/// Reads `std::env` at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn raw(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn raw(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub data_dir: String,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        Ok(Config {
            server_host: env.get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: env
                .get("SERVER_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            data_dir: env.get("DATA_DIR").unwrap_or_else(|| "data".to_string()),
            jwt_secret: resolve_jwt_secret(env)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// `JWT_SECRET` has no default; a missing secret stops startup.
pub fn resolve_jwt_secret(env: &impl EnvSource) -> Result<String, ConfigError> {
    env.get("JWT_SECRET").ok_or(ConfigError::MissingJwtSecret)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("JWT_SECRET environment variable is required")]
    MissingJwtSecret,
}

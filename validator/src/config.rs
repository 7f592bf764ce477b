//! Adapter settings read from the environment.

use std::env;

const DEFAULT_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;
const BODY_LIMIT_ENV: &str = "REQUEST_VALIDATION_BODY_LIMIT_BYTES";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got `{value}`")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Largest body, in bytes, the middleware will buffer for validation.
    pub body_limit: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ValidatorConfig {
    /// Reads the environment, falling back to defaults on missing or bad values.
    pub fn from_env() -> Self {
        let body_limit = env_usize(BODY_LIMIT_ENV, DEFAULT_BODY_LIMIT_BYTES);

        tracing::info!(body_limit, "Request validation configured");

        Self { body_limit }
    }

    /// Reads the environment, failing on values that are present but invalid.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let body_limit = match env::var(BODY_LIMIT_ENV) {
            Ok(raw) => parse_positive(BODY_LIMIT_ENV, &raw)?,
            Err(_) => DEFAULT_BODY_LIMIT_BYTES,
        };

        Ok(Self { body_limit })
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        }),
    }
}

fn env_usize(key: &'static str, default: usize) -> usize {
    match env::var(key) {
        Ok(raw) => match parse_positive(key, &raw) {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Invalid value for {key} (`{raw}`), using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}

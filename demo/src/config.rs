use std::{env, net::SocketAddr};

use anyhow::{Context, Result};
use request_validator::ValidatorConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub validation: ValidatorConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let raw = env::var("DEMO_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .parse::<SocketAddr>()
            .with_context(|| format!("DEMO_BIND_ADDR is not a socket address: `{raw}`"))?;

        let validation = ValidatorConfig::try_from_env()?;
        tracing::info!(body_limit = validation.body_limit, "Request validation configured");

        Ok(Self {
            bind_addr,
            validation,
        })
    }
}

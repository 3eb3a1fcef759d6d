//! HTTP listener configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;

/// Server environment configuration
#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("SERVER_BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("Failed to parse SERVER_PORT")?,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .context(format!(
                "Invalid listen address {}:{}",
                self.bind_address, self.port
            ))
    }
}

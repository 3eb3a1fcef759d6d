//! Configuration module for Indexcast.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Server, Model, and Observability.

mod model_config;
mod observability_config;
mod server_config;

pub use model_config::{DEFAULT_ACCURACY_METRICS_PATH, DEFAULT_MODEL_PATH, ModelEnvConfig};
pub use observability_config::ObservabilityEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
///
/// Built once at startup and handed to the components that need it; nothing
/// reads the environment after this point.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerEnvConfig,
    pub model: ModelEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let server = ServerEnvConfig::from_env().context("Failed to load server config")?;
        let model = ModelEnvConfig::from_env().context("Failed to load model config")?;
        let observability = ObservabilityEnvConfig::from_env();

        Ok(Self {
            server,
            model,
            observability,
        })
    }
}

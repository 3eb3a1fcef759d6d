//! Model configuration parsing from environment variables.
//!
//! This module handles artifact locations, fallback policy and the feature
//! scaling constant.

use crate::domain::ml::features::DEFAULT_PRICE_CHANGE_SCALE;
use anyhow::{Context, Result, ensure};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "linear_regression_model.json";
pub const DEFAULT_ACCURACY_METRICS_PATH: &str = "realistic_accuracy.json";

/// Model environment configuration
#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    /// Defaults to `model_path`, so one file is tried in both formats
    pub legacy_model_path: PathBuf,
    pub allow_stub: bool,
    pub strict_schema: bool,
    pub price_change_scale: f64,
    pub accuracy_metrics_path: PathBuf,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            legacy_model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            allow_stub: true,
            strict_schema: false,
            price_change_scale: DEFAULT_PRICE_CHANGE_SCALE,
            accuracy_metrics_path: PathBuf::from(DEFAULT_ACCURACY_METRICS_PATH),
        }
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        let model_path =
            env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
        let legacy_model_path = env::var("LEGACY_MODEL_PATH").unwrap_or_else(|_| model_path.clone());

        let price_change_scale = Self::parse_f64("PRICE_CHANGE_SCALE", DEFAULT_PRICE_CHANGE_SCALE)?;
        ensure!(
            price_change_scale.is_finite(),
            "PRICE_CHANGE_SCALE must be finite, got {}",
            price_change_scale
        );

        Ok(Self {
            model_path: PathBuf::from(model_path),
            legacy_model_path: PathBuf::from(legacy_model_path),
            allow_stub: Self::parse_bool("ALLOW_STUB_MODEL", true),
            strict_schema: Self::parse_bool("STRICT_MODEL_SCHEMA", false),
            price_change_scale,
            accuracy_metrics_path: PathBuf::from(
                env::var("ACCURACY_METRICS_PATH")
                    .unwrap_or_else(|_| DEFAULT_ACCURACY_METRICS_PATH.to_string()),
            ),
        })
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_bool(key: &str, default: bool) -> bool {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<bool>()
            .unwrap_or(default)
    }
}

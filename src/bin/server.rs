//! Indexcast Server - next-day index close predictions over HTTP
//!
//! Loads the regression model once at startup and serves `/predict`,
//! `/health` and the introspection routes until Ctrl+C.
//!
//! # Usage
//! ```sh
//! MODEL_PATH=linear_regression_model.json SERVER_PORT=5000 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `SERVER_BIND_ADDRESS` / `SERVER_PORT` - listen address (default: 0.0.0.0:5000)
//! - `MODEL_PATH` / `LEGACY_MODEL_PATH` - model artifacts
//! - `ALLOW_STUB_MODEL` - serve a fixed stub when no artifact loads (default: true)
//! - `STRICT_MODEL_SCHEMA` - refuse to start on a feature-name mismatch (default: false)
//! - `PRICE_CHANGE_SCALE` - scale for the price-change feature (default: 0.001)
//! - `ACCURACY_METRICS_PATH` - cached accuracy figures
//! - `METRICS_ENABLED` - expose `/metrics` (default: true)

use anyhow::{Context, Result};
use indexcast::application::accuracy_estimator::DEFAULT_BASE_PRICE;
use indexcast::application::ml::model_loader::load_model;
use indexcast::application::ml::predictor::Regressor;
use indexcast::application::prediction_service::PredictionService;
use indexcast::config::Config;
use indexcast::domain::ml::features::{FeatureBuilder, MarketInput};
use indexcast::infrastructure::accuracy_persistence::AccuracyPersistence;
use indexcast::infrastructure::observability::{Metrics, logging};
use indexcast::interfaces::http::{AppState, serve};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    logging::init(Level::INFO);

    info!("Indexcast Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Model={:?}, Legacy={:?}, PriceChangeScale={}, Metrics={}",
        config.model.model_path,
        config.model.legacy_model_path,
        config.model.price_change_scale,
        config.observability.metrics_enabled
    );

    let regressor: Option<Arc<dyn Regressor>> = load_model(&config.model)?
        .map(|predictor| Arc::new(predictor) as Arc<dyn Regressor>);

    match &regressor {
        Some(r) if r.provenance().is_degraded() => {
            warn!("Running DEGRADED on the stub model; /health reports model_source=stub")
        }
        Some(r) => info!("Active model: {} ({})", r.name(), r.provenance()),
        None => warn!("No model loaded; /predict will return 500"),
    }

    // Sanity probe at the nominal index level
    if let Some(r) = &regressor {
        let builder = FeatureBuilder::new(config.model.price_change_scale);
        let probe = builder.build(
            &MarketInput::new(
                DEFAULT_BASE_PRICE,
                DEFAULT_BASE_PRICE + 20.0,
                DEFAULT_BASE_PRICE - 20.0,
            ),
            chrono::Local::now().date_naive(),
        );
        match r.predict(&probe) {
            Ok(value) => info!("Probe prediction at {:.0}: {:.2}", DEFAULT_BASE_PRICE, value),
            Err(e) => warn!("Probe prediction failed: {}", e),
        }
    }

    let service = PredictionService::new(
        regressor,
        FeatureBuilder::new(config.model.price_change_scale),
    );
    let accuracy = AccuracyPersistence::new(&config.model.accuracy_metrics_path).load_or_default();
    let metrics = if config.observability.metrics_enabled {
        Some(Metrics::new()?)
    } else {
        None
    };

    let state = AppState::new(service, accuracy, metrics);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received. Exiting...");
    })
    .await
}

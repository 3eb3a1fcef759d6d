//! HTTP surface of the prediction service.
//!
//! Routes:
//! - `GET /` - input form
//! - `POST /predict` - next-day close
//! - `POST /explain` - contribution breakdown
//! - `GET /health` - liveness and model provenance
//! - `GET /model` - model introspection
//! - `GET /accuracy` - cached accuracy figures
//! - `GET /metrics` - Prometheus text (when enabled)

pub mod dto;
pub mod handlers;

use crate::application::prediction_service::PredictionService;
use crate::domain::ml::accuracy::AccuracyMetrics;
use crate::infrastructure::observability::{Metrics, PredictionOutcome};
use axum::{
    Router,
    routing::{get, post},
};
use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
    pub accuracy: Arc<AccuracyMetrics>,
    pub metrics: Option<Metrics>,
    /// Reference date for feature construction
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(
        service: PredictionService,
        accuracy: AccuracyMetrics,
        metrics: Option<Metrics>,
    ) -> Self {
        if let Some(m) = &metrics {
            m.set_model_source(service.model_status().source);
        }
        Self {
            service,
            accuracy: Arc::new(accuracy),
            metrics,
            today: local_today,
        }
    }

    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn record(&self, outcome: PredictionOutcome) {
        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(outcome);
        }
    }
}

pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict))
        .route("/explain", post(handlers::explain))
        .route("/health", get(handlers::health))
        .route("/model", get(handlers::model))
        .route("/accuracy", get(handlers::accuracy));

    if state.metrics.is_some() {
        router = router.route("/metrics", get(handlers::metrics));
    }

    router.with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

//! Prometheus metrics definitions for Indexcast
//!
//! All metrics use the `indexcast_` prefix and are read-only.

use crate::domain::ml::model::ModelProvenance;
use prometheus::{
    CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Outcome label for `indexcast_predictions_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOutcome {
    Success,
    InvalidInput,
    PredictionFailure,
    ModelUnavailable,
}

impl PredictionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionOutcome::Success => "success",
            PredictionOutcome::InvalidInput => "invalid_input",
            PredictionOutcome::PredictionFailure => "prediction_failure",
            PredictionOutcome::ModelUnavailable => "model_unavailable",
        }
    }
}

/// Prometheus metrics for the prediction service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Predictions served, by outcome
    pub predictions_total: CounterVec,
    /// Time spent building features and evaluating the model
    pub prediction_latency_seconds: HistogramVec,
    /// 1 for the provenance of the active model
    pub model_info: GaugeVec,
}

impl Metrics {
    /// Create a new Metrics instance with all collectors registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new("indexcast_predictions_total", "Predictions served by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "indexcast_prediction_latency_seconds",
                "Feature construction and model evaluation latency in seconds",
            )
            .buckets(vec![
                0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05,
            ]),
            &["endpoint"],
        )?;
        registry.register(Box::new(prediction_latency_seconds.clone()))?;

        let model_info = GaugeVec::new(
            Opts::new("indexcast_model_info", "Active model provenance (1 = active)"),
            &["source"],
        )?;
        registry.register(Box::new(model_info.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            prediction_latency_seconds,
            model_info,
        })
    }

    pub fn record_outcome(&self, outcome: PredictionOutcome) {
        self.predictions_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn observe_latency(&self, endpoint: &str, seconds: f64) {
        self.prediction_latency_seconds
            .with_label_values(&[endpoint])
            .observe(seconds);
    }

    pub fn set_model_source(&self, provenance: Option<ModelProvenance>) {
        for source in [
            ModelProvenance::Primary,
            ModelProvenance::Legacy,
            ModelProvenance::Stub,
        ] {
            let value = if Some(source) == provenance { 1.0 } else { 0.0 };
            self.model_info
                .with_label_values(&[source.as_str()])
                .set(value);
        }
    }

    /// Render in the Prometheus text exposition format
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        Ok(encoder.encode_to_string(&families)?)
    }
}

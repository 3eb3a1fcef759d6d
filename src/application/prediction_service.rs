//! Next-day close prediction: feature construction, model evaluation and
//! response shaping for one request.

use crate::application::ml::predictor::Regressor;
use crate::domain::errors::ServiceError;
use crate::domain::ml::features::{DerivedPrices, FeatureBuilder, FeatureVector, MarketInput};
use crate::domain::ml::model::{FeatureContribution, ModelProvenance};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

const TOP_CONTRIBUTORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_close: f64,
    pub input: MarketInput,
    pub prediction_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub input: MarketInput,
    pub derived: DerivedPrices,
    pub features: FeatureVector,
    pub intercept: f64,
    pub contributions: Vec<FeatureContribution>,
    /// Largest absolute contributions first
    pub top_contributors: Vec<FeatureContribution>,
    pub predicted_close: f64,
    pub prediction_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub source: Option<ModelProvenance>,
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Label date for a prediction made on `today`.
pub fn next_day(today: NaiveDate) -> NaiveDate {
    today.succ_opt().unwrap_or(today)
}

/// Stateless per request; holds the model read-only for the process lifetime.
#[derive(Clone)]
pub struct PredictionService {
    regressor: Option<Arc<dyn Regressor>>,
    builder: FeatureBuilder,
}

impl PredictionService {
    pub fn new(regressor: Option<Arc<dyn Regressor>>, builder: FeatureBuilder) -> Self {
        Self { regressor, builder }
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    pub fn regressor(&self) -> Option<&Arc<dyn Regressor>> {
        self.regressor.as_ref()
    }

    pub fn model_status(&self) -> ModelStatus {
        ModelStatus {
            loaded: self.regressor.is_some(),
            source: self.regressor.as_ref().map(|r| r.provenance()),
        }
    }

    pub fn predict(
        &self,
        input: &MarketInput,
        today: NaiveDate,
    ) -> Result<PredictionResult, ServiceError> {
        let regressor = self.regressor.as_ref().ok_or(ServiceError::ModelUnavailable)?;
        let features = self.builder.build(input, today);
        let raw = regressor.predict(&features)?;

        Ok(PredictionResult {
            predicted_close: round_to_cents(raw),
            input: *input,
            prediction_date: next_day(today),
        })
    }

    pub fn explain(&self, input: &MarketInput, today: NaiveDate) -> Result<Explanation, ServiceError> {
        let regressor = self.regressor.as_ref().ok_or(ServiceError::ModelUnavailable)?;
        let model = regressor
            .linear_model()
            .ok_or_else(|| ServiceError::NotExplainable {
                model: regressor.name().to_string(),
            })?;

        let features = self.builder.build(input, today);
        let contributions = model.contributions(&features)?;
        let raw = regressor.predict(&features)?;

        let mut top_contributors = contributions.clone();
        top_contributors.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        top_contributors.truncate(TOP_CONTRIBUTORS);

        Ok(Explanation {
            input: *input,
            derived: DerivedPrices::from_input(input),
            features,
            intercept: model.intercept(),
            contributions,
            top_contributors,
            predicted_close: round_to_cents(raw),
            prediction_date: next_day(today),
        })
    }
}

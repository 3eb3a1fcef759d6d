use crate::domain::errors::PredictionError;
use crate::domain::ml::features::FeatureVector;
use crate::domain::ml::model::{LinearModel, ModelProvenance};
use serde::Serialize;

/// Interface for the next-day close regressor
pub trait Regressor: Send + Sync {
    /// Predict the next session's close
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError>;

    /// Where the model was loaded from
    fn provenance(&self) -> ModelProvenance;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Underlying coefficients, for models that expose them
    fn linear_model(&self) -> Option<&LinearModel> {
        None
    }

    fn summary(&self) -> ModelSummary {
        let mut summary = ModelSummary {
            name: self.name().to_string(),
            source: self.provenance(),
            degraded: self.provenance().is_degraded(),
            n_features: None,
            intercept: None,
            has_feature_names: false,
            coefficients: Vec::new(),
        };

        if let Some(model) = self.linear_model() {
            summary.n_features = Some(model.n_features());
            summary.intercept = Some(model.intercept());
            summary.has_feature_names = model.feature_names().is_some();
            summary.coefficients = model
                .coefficients()
                .iter()
                .enumerate()
                .map(|(i, c)| NamedCoefficient {
                    name: model
                        .feature_names()
                        .and_then(|names| names.get(i).cloned())
                        .unwrap_or_else(|| format!("feature_{}", i)),
                    coefficient: *c,
                })
                .collect();
        }

        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedCoefficient {
    pub name: String,
    pub coefficient: f64,
}

/// Introspection view of the active model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub source: ModelProvenance,
    pub degraded: bool,
    pub n_features: Option<usize>,
    pub intercept: Option<f64>,
    pub has_feature_names: bool,
    pub coefficients: Vec<NamedCoefficient>,
}

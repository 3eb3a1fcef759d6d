use super::feature_schema::FEATURE_NAMES;
use super::features::FeatureVector;
use crate::domain::errors::{ModelLoadError, PredictionError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the active model came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvenance {
    /// Native JSON coefficients artifact
    Primary,
    /// smartcore-serialized regression
    Legacy,
    /// Fixed-coefficient fallback
    Stub,
}

impl ModelProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvenance::Primary => "primary",
            ModelProvenance::Legacy => "legacy",
            ModelProvenance::Stub => "stub",
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ModelProvenance::Stub)
    }
}

impl fmt::Display for ModelProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contribution of one feature to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub name: String,
    pub value: f64,
    pub coefficient: f64,
    pub contribution: f64,
}

/// Fitted ordinary-least-squares model: `intercept + Σ x_i * w_i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl LinearModel {
    pub fn new(
        coefficients: Vec<f64>,
        intercept: f64,
        feature_names: Option<Vec<String>>,
    ) -> Result<Self, ModelLoadError> {
        let model = Self {
            coefficients,
            intercept,
            feature_names,
        };
        model.check_shape()?;
        Ok(model)
    }

    /// Fallback used when no artifact can be read. Predictions are plausible
    /// in magnitude but carry no information.
    pub fn stub() -> Self {
        Self {
            coefficients: vec![
                0.1, 0.05, 0.02, 0.03, 0.04, 0.01, 0.01, 0.01, 0.02, 0.01, 0.001, 0.001, 0.001,
                0.001, 0.001, 0.001,
            ],
            intercept: 4500.0,
            feature_names: Some(FEATURE_NAMES.iter().map(|n| n.to_string()).collect()),
        }
    }

    /// Serde skips `new`, so deserialized artifacts are checked here.
    pub fn check_shape(&self) -> Result<(), ModelLoadError> {
        if self.coefficients.is_empty() {
            return Err(ModelLoadError::Empty);
        }
        if let Some(names) = &self.feature_names
            && names.len() != self.coefficients.len()
        {
            return Err(ModelLoadError::LengthMismatch {
                names: names.len(),
                coefficients: self.coefficients.len(),
            });
        }
        Ok(())
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Feature values in the order this model's coefficients expect.
    fn aligned(&self, features: &FeatureVector) -> Result<Vec<f64>, PredictionError> {
        match &self.feature_names {
            Some(names) => features.reindexed(names),
            None => {
                features.ensure_finite()?;
                if features.len() != self.coefficients.len() {
                    return Err(PredictionError::DimensionMismatch {
                        expected: self.coefficients.len(),
                        actual: features.len(),
                    });
                }
                Ok(features.values().to_vec())
            }
        }
    }

    /// Raw dot product against already-ordered values.
    pub fn predict_values(&self, values: &[f64]) -> Result<f64, PredictionError> {
        if values.len() != self.coefficients.len() {
            return Err(PredictionError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: values.len(),
            });
        }
        Ok(self.intercept
            + values
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>())
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let values = self.aligned(features)?;
        self.predict_values(&values)
    }

    /// Per-feature breakdown in model order.
    pub fn contributions(
        &self,
        features: &FeatureVector,
    ) -> Result<Vec<FeatureContribution>, PredictionError> {
        let values = self.aligned(features)?;
        let names: Vec<String> = match &self.feature_names {
            Some(names) => names.clone(),
            None => FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
        };

        Ok(names
            .into_iter()
            .zip(values)
            .zip(&self.coefficients)
            .map(|((name, value), coefficient)| FeatureContribution {
                name,
                value,
                coefficient: *coefficient,
                contribution: value * coefficient,
            })
            .collect())
    }
}

use super::predictor::Regressor;
use crate::domain::errors::PredictionError;
use crate::domain::ml::features::FeatureVector;
use crate::domain::ml::model::{LinearModel, ModelProvenance};

pub struct LinearPredictor {
    model: LinearModel,
    provenance: ModelProvenance,
}

impl LinearPredictor {
    pub fn new(model: LinearModel, provenance: ModelProvenance) -> Self {
        Self { model, provenance }
    }

    pub fn stub() -> Self {
        Self::new(LinearModel::stub(), ModelProvenance::Stub)
    }
}

impl Regressor for LinearPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let prediction = self.model.predict(features)?;
        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(PredictionError::Backend {
                reason: "Regression produced a non-finite value".to_string(),
            })
        }
    }

    fn provenance(&self) -> ModelProvenance {
        self.provenance
    }

    fn name(&self) -> &str {
        match self.provenance {
            ModelProvenance::Stub => "LinearRegression (stub)",
            _ => "LinearRegression",
        }
    }

    fn linear_model(&self) -> Option<&LinearModel> {
        Some(&self.model)
    }
}

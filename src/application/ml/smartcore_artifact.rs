//! Legacy model artifacts: a `smartcore` `LinearRegression` serialized with
//! serde_json. The fitted weights are lifted into a [`LinearModel`] so that
//! both artifact formats are served by the same predictor.

use crate::domain::errors::ModelLoadError;
use crate::domain::ml::model::LinearModel;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::LinearRegression;
use std::path::Path;

pub type SmartCoreLinearRegression = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

pub fn parse_smartcore_model(bytes: &[u8], path: &Path) -> Result<LinearModel, ModelLoadError> {
    let model: SmartCoreLinearRegression =
        serde_json::from_slice(bytes).map_err(|e| ModelLoadError::Parse {
            format: "smartcore",
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    from_smartcore(&model)
}

/// Weights are stored as an (n_features x 1) column.
pub fn from_smartcore(model: &SmartCoreLinearRegression) -> Result<LinearModel, ModelLoadError> {
    let weights = model.coefficients();
    let (n_features, _) = weights.shape();
    let coefficients: Vec<f64> = (0..n_features).map(|i| *weights.get((i, 0))).collect();
    let intercept: f64 = model.intercept().to_owned();

    LinearModel::new(coefficients, intercept, None)
}

use chrono::NaiveDate;
use indexcast::application::ml::model_loader::load_model;
use indexcast::application::ml::predictor::Regressor;
use indexcast::application::ml::smartcore_artifact::SmartCoreLinearRegression;
use indexcast::application::prediction_service::PredictionService;
use indexcast::config::ModelEnvConfig;
use indexcast::domain::ml::feature_schema::{FEATURE_COUNT, FEATURE_NAMES};
use indexcast::domain::ml::features::{FeatureBuilder, MarketInput};
use indexcast::domain::ml::model::ModelProvenance;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use std::path::PathBuf;
use std::sync::Arc;

struct TempFile(PathBuf);

impl TempFile {
    fn new(name: &str, contents: &[u8]) -> Self {
        let path = std::env::temp_dir().join(format!(
            "indexcast_it_{}_{}",
            uuid::Uuid::new_v4(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        Self(path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn config_for(path: &TempFile) -> ModelEnvConfig {
    ModelEnvConfig {
        model_path: path.0.clone(),
        legacy_model_path: path.0.clone(),
        allow_stub: false,
        ..ModelEnvConfig::default()
    }
}

fn reference_session() -> (MarketInput, NaiveDate) {
    (
        MarketInput::new(4500.0, 4520.0, 4480.0),
        NaiveDate::from_ymd_opt(2025, 8, 3).unwrap(),
    )
}

fn service(config: &ModelEnvConfig) -> PredictionService {
    let predictor = load_model(config).unwrap().unwrap();
    PredictionService::new(
        Some(Arc::new(predictor) as Arc<dyn Regressor>),
        FeatureBuilder::new(config.price_change_scale),
    )
}

#[test]
fn test_permuted_artifact_predicts_like_training_order() {
    let weights = [
        0.2, 0.15, 1.0, 0.1, 0.04, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ];
    let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
    order.reverse();
    order.swap(0, 7);

    let artifact = serde_json::json!({
        "coefficients": order.iter().map(|&i| weights[i]).collect::<Vec<_>>(),
        "intercept": 3773.67,
        "feature_names": order.iter().map(|&i| FEATURE_NAMES[i]).collect::<Vec<_>>(),
    });
    let file = TempFile::new("permuted.json", artifact.to_string().as_bytes());

    let (input, today) = reference_session();
    let result = service(&config_for(&file)).predict(&input, today).unwrap();

    assert!((result.predicted_close - 5940.21).abs() < 1e-9);
    assert_eq!(result.prediction_date, NaiveDate::from_ymd_opt(2025, 8, 4).unwrap());
}

#[test]
fn test_legacy_smartcore_artifact_is_served_positionally() {
    // Deterministic, well-conditioned design matrix
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    let weights: Vec<f64> = (0..FEATURE_COUNT).map(|i| 0.05 * (i as f64 + 1.0)).collect();
    let intercept = 10.0;

    let rows: Vec<Vec<f64>> = (0..64)
        .map(|_| (0..FEATURE_COUNT).map(|_| next()).collect())
        .collect();
    let y: Vec<f64> = rows
        .iter()
        .map(|row| intercept + row.iter().zip(&weights).map(|(x, w)| x * w).sum::<f64>())
        .collect();
    let x = DenseMatrix::from_2d_vec(&rows).unwrap();
    let fitted: SmartCoreLinearRegression =
        LinearRegression::fit(&x, &y, LinearRegressionParameters::default()).unwrap();

    let file = TempFile::new("legacy.json", &serde_json::to_vec(&fitted).unwrap());
    let config = config_for(&file);
    let service = service(&config);

    let regressor = service.regressor().unwrap();
    assert_eq!(regressor.provenance(), ModelProvenance::Legacy);
    assert!(!regressor.summary().has_feature_names);

    let (input, today) = reference_session();
    let features = service.builder().build(&input, today);
    let expected =
        intercept + features.iter().zip(&weights).map(|((_, v), w)| v * w).sum::<f64>();
    let result = service.predict(&input, today).unwrap();

    assert!((result.predicted_close - expected).abs() < 0.05);
}

#[test]
fn test_unusable_artifact_without_stub_leaves_service_unloaded() {
    let file = TempFile::new("garbage.json", b"not a model");

    assert!(load_model(&config_for(&file)).unwrap().is_none());
}

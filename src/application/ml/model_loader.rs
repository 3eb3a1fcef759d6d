use super::linear_predictor::LinearPredictor;
use super::smartcore_artifact::parse_smartcore_model;
use crate::config::ModelEnvConfig;
use crate::domain::errors::ModelLoadError;
use crate::domain::ml::feature_schema::{FEATURE_COUNT, FeatureSchema};
use crate::domain::ml::model::{LinearModel, ModelProvenance};
use anyhow::{Result, bail};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{error, info, warn};

fn read_artifact(path: &Path) -> Result<Vec<u8>, ModelLoadError> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ModelLoadError::NotFound {
            path: path.display().to_string(),
        },
        _ => ModelLoadError::Io {
            path: path.display().to_string(),
            source: e,
        },
    })
}

/// Primary format: `{"coefficients": [...], "intercept": f, "feature_names": [...]}`.
pub fn load_primary(path: &Path) -> Result<LinearModel, ModelLoadError> {
    let bytes = read_artifact(path)?;
    let model: LinearModel = serde_json::from_slice(&bytes).map_err(|e| ModelLoadError::Parse {
        format: "json",
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    model.check_shape()?;
    Ok(model)
}

pub fn load_legacy(path: &Path) -> Result<LinearModel, ModelLoadError> {
    let bytes = read_artifact(path)?;
    parse_smartcore_model(&bytes, path)
}

/// Named models must declare the builder's field set; unnamed ones must at
/// least have the builder's width.
pub fn check_schema(model: &LinearModel) -> Result<(), ModelLoadError> {
    match model.feature_names() {
        Some(names) => FeatureSchema.validate(names),
        None if model.n_features() != FEATURE_COUNT => Err(ModelLoadError::WidthMismatch {
            expected: FEATURE_COUNT,
            actual: model.n_features(),
        }),
        None => Ok(()),
    }
}

/// Tries the primary artifact, then the legacy one, then the stub.
///
/// Returns `Ok(None)` only when every format failed and the stub is disabled.
/// Errors only in strict-schema mode, when an artifact loads but does not
/// match the builder's fields.
pub fn load_model(config: &ModelEnvConfig) -> Result<Option<LinearPredictor>> {
    let attempts: [(ModelProvenance, &Path, fn(&Path) -> Result<LinearModel, ModelLoadError>); 2] = [
        (ModelProvenance::Primary, config.model_path.as_path(), load_primary),
        (ModelProvenance::Legacy, config.legacy_model_path.as_path(), load_legacy),
    ];

    for (provenance, path, load) in attempts {
        let model = match load(path) {
            Ok(model) => model,
            Err(e) => {
                warn!("Model load ({}) failed: {}", provenance, e);
                continue;
            }
        };

        if let Err(e) = check_schema(&model) {
            if config.strict_schema {
                bail!("Model at {:?} rejected: {}", path, e);
            }
            warn!("Model at {:?} ignored: {}", path, e);
            continue;
        }

        info!(
            "Model loaded from {:?} ({} format, {} features, intercept {:.4})",
            path,
            provenance,
            model.n_features(),
            model.intercept()
        );
        return Ok(Some(LinearPredictor::new(model, provenance)));
    }

    if config.allow_stub {
        error!("No usable model artifact. Serving STUB model; predictions are not meaningful.");
        return Ok(Some(LinearPredictor::stub()));
    }

    error!("No usable model artifact and stub fallback disabled. /predict will fail.");
    Ok(None)
}

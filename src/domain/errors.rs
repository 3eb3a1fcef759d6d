use thiserror::Error;

/// Errors raised while reading a model artifact from disk
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Model file not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} model from {path}: {reason}")]
    Parse {
        format: &'static str,
        path: String,
        reason: String,
    },

    #[error("Model declares {names} feature names but {coefficients} coefficients")]
    LengthMismatch { names: usize, coefficients: usize },

    #[error("Model has no coefficients")]
    Empty,

    #[error("Model expects {actual} positional features, builder produces {expected}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error(
        "Model schema mismatch: missing {missing:?}, unexpected {unexpected:?}, duplicated {duplicated:?}"
    )]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
        duplicated: Vec<String>,
    },
}

/// Errors caused by a malformed prediction request
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Request body is not valid JSON: {reason}")]
    MalformedBody { reason: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field {field} is not numeric: {value:?}")]
    NotNumeric { field: String, value: String },

    #[error("Field {field} must be a finite number")]
    NotFinite { field: String },
}

/// Errors raised by the regression backend on an otherwise valid request
#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("Feature vector has no field named {name}")]
    MissingFeature { name: String },

    #[error("Feature {name} is not finite")]
    NonFiniteFeature { name: String },

    #[error("Feature vector has {actual} values, model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Regression backend failed: {reason}")]
    Backend { reason: String },
}

/// Errors surfaced by the prediction service to its callers
#[derive(Debug, Error, PartialEq)]
pub enum ServiceError {
    #[error("Model not loaded properly")]
    ModelUnavailable,

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error("Model {model} does not expose coefficients")]
    NotExplainable { model: String },
}

//! Request parsing and response bodies for the HTTP API.

use crate::application::prediction_service::PredictionResult;
use crate::domain::errors::InputError;
use crate::domain::ml::features::MarketInput;
use crate::domain::ml::model::ModelProvenance;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

const PRICE_FIELDS: [&str; 3] = ["open", "high", "low"];

/// Accepts JSON numbers or numeric strings, e.g. `{"open": "4500.00", "high": 4520, "low": 4480}`.
pub fn parse_market_input(body: &[u8]) -> Result<MarketInput, InputError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| InputError::MalformedBody {
        reason: e.to_string(),
    })?;
    let object = value.as_object().ok_or_else(|| InputError::MalformedBody {
        reason: "expected a JSON object".to_string(),
    })?;

    let mut prices = [0.0; 3];
    for (slot, field) in prices.iter_mut().zip(PRICE_FIELDS) {
        let raw = object.get(field).ok_or_else(|| InputError::MissingField {
            field: field.to_string(),
        })?;
        *slot = coerce_number(field, raw)?;
    }

    let [open, high, low] = prices;
    Ok(MarketInput::new(open, high, low))
}

fn coerce_number(field: &str, raw: &Value) -> Result<f64, InputError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    let value = parsed.ok_or_else(|| InputError::NotNumeric {
        field: field.to_string(),
        value: match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    })?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NotFinite {
            field: field.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct InputData {
    pub open: f64,
    pub high: f64,
    pub low: f64,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub predicted_close: f64,
    pub input_data: InputData,
    pub prediction_date: NaiveDate,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            success: true,
            predicted_close: result.predicted_close,
            input_data: InputData {
                open: result.input.open,
                high: result.input.high,
                low: result.input.low,
            },
            prediction_date: result.prediction_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_source: Option<ModelProvenance>,
}

use super::AppState;
use super::dto::{ErrorResponse, HealthResponse, PredictResponse, parse_market_input};
use crate::domain::errors::{InputError, ServiceError};
use crate::infrastructure::observability::PredictionOutcome;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use std::time::Instant;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("../../../static/index.html");

/// Failure surfaced to an HTTP caller
#[derive(Debug)]
pub enum ApiError {
    Input(InputError),
    Service(ServiceError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Input(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(ServiceError::NotExplainable { .. }) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn outcome(&self) -> PredictionOutcome {
        match self {
            ApiError::Input(_) => PredictionOutcome::InvalidInput,
            ApiError::Service(ServiceError::ModelUnavailable) => PredictionOutcome::ModelUnavailable,
            ApiError::Service(_) => PredictionOutcome::PredictionFailure,
        }
    }
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        ApiError::Input(e)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        ApiError::Service(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Input(e) => e.to_string(),
            ApiError::Service(e) => e.to_string(),
        };
        (self.status(), Json(ErrorResponse::new(message))).into_response()
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.service.model_status();
    Json(HealthResponse {
        status: "healthy",
        model_loaded: status.loaded,
        model_source: status.source,
    })
}

/// POST /predict - next-day close for one session.
pub async fn predict(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);
    let _enter = span.enter();
    let started = Instant::now();

    let result = parse_market_input(&body)
        .map_err(ApiError::from)
        .and_then(|input| {
            let today = (state.today)();
            state
                .service
                .predict(&input, today)
                .map_err(ApiError::from)
        });

    if let Some(metrics) = &state.metrics {
        metrics.observe_latency("predict", started.elapsed().as_secs_f64());
    }

    match result {
        Ok(prediction) => {
            info!(
                "Predicted close {:.2} for {} (open={}, high={}, low={})",
                prediction.predicted_close,
                prediction.prediction_date,
                prediction.input.open,
                prediction.input.high,
                prediction.input.low
            );
            state.record(PredictionOutcome::Success);
            Json(PredictResponse::from(prediction)).into_response()
        }
        Err(e) => {
            match &e {
                ApiError::Input(inner) => warn!("Rejected prediction request: {}", inner),
                ApiError::Service(inner) => error!("Prediction failed: {}", inner),
            }
            state.record(e.outcome());
            e.into_response()
        }
    }
}

/// POST /explain - per-feature contribution breakdown.
pub async fn explain(State(state): State<AppState>, body: Bytes) -> Response {
    let started = Instant::now();
    let result = parse_market_input(&body)
        .map_err(ApiError::from)
        .and_then(|input| {
            state
                .service
                .explain(&input, (state.today)())
                .map_err(ApiError::from)
        });

    if let Some(metrics) = &state.metrics {
        metrics.observe_latency("explain", started.elapsed().as_secs_f64());
    }

    match result {
        Ok(explanation) => Json(explanation).into_response(),
        Err(e) => {
            warn!("Explain request failed: {:?}", e);
            e.into_response()
        }
    }
}

/// GET /model - coefficients and provenance of the active model.
pub async fn model(State(state): State<AppState>) -> Response {
    match state.service.regressor() {
        Some(regressor) => Json(regressor.summary()).into_response(),
        None => ApiError::Service(ServiceError::ModelUnavailable).into_response(),
    }
}

pub async fn accuracy(State(state): State<AppState>) -> Response {
    Json(state.accuracy.as_ref().clone()).into_response()
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> Response {
    let Some(metrics) = &state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match metrics.encode() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::prediction_service::PredictionService;
    use crate::domain::ml::accuracy::AccuracyMetrics;
    use crate::domain::ml::features::FeatureBuilder;

    fn unloaded_state() -> AppState {
        AppState::new(
            PredictionService::new(None, FeatureBuilder::default()),
            AccuracyMetrics::default(),
            None,
        )
    }

    #[test]
    fn test_api_error_status_mapping() {
        let input = ApiError::Input(InputError::MissingField {
            field: "open".to_string(),
        });
        assert_eq!(input.status(), StatusCode::BAD_REQUEST);

        let unavailable = ApiError::Service(ServiceError::ModelUnavailable);
        assert_eq!(unavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(unavailable.outcome().as_str(), "model_unavailable");

        let unexplainable = ApiError::Service(ServiceError::NotExplainable {
            model: "opaque".to_string(),
        });
        assert_eq!(unexplainable.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_health_without_model() {
        let Json(body) = tokio_test::block_on(health(State(unloaded_state())));

        assert_eq!(body.status, "healthy");
        assert!(!body.model_loaded);
        assert!(body.model_source.is_none());
    }

    #[test]
    fn test_model_route_without_model_is_server_error() {
        let response = tokio_test::block_on(model(State(unloaded_state())));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

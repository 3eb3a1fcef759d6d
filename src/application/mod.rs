pub mod accuracy_estimator;
pub mod ml;
pub mod prediction_service;

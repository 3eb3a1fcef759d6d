pub mod linear_predictor;
pub mod model_loader;
pub mod predictor;
pub mod smartcore_artifact;

// Feature construction, model and accuracy types
pub mod ml;

// Domain-specific error types
pub mod errors;

pub mod accuracy;
pub mod feature_schema;
pub mod features;
pub mod model;

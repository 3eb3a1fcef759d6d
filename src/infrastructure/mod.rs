pub mod accuracy_persistence;
pub mod observability;

use crate::domain::errors::ModelLoadError;

/// Ordered list of feature names.
/// This order MUST match the column order the regression model was fitted on.
/// Any change here is a breaking change for model artifacts without names.
pub const FEATURE_NAMES: &[&str] = &[
    "SMA_5_t-1",
    "SMA_10_t-1",
    "Price_Change_t-1",
    "SMA_20_t-1",
    "EMA_20_t-1",
    "MACD_t-1",
    "MACD_signal_t-1",
    "MACD_diff_t-1",
    "RSI_t-1",
    "ATR_t-1",
    "year",
    "month",
    "day",
    "day_of_week",
    "is_month_end",
    "is_month_start",
];

pub const FEATURE_COUNT: usize = 16;

/// The named-field contract shared by the feature builder and model artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSchema;

impl FeatureSchema {
    pub fn position(&self, name: &str) -> Option<usize> {
        FEATURE_NAMES.iter().position(|n| *n == name)
    }

    /// Checks that a model declares exactly the builder's fields, each once.
    /// Ordering may differ; the predictor reindexes by name.
    pub fn validate<S: AsRef<str>>(&self, model_names: &[S]) -> Result<(), ModelLoadError> {
        let missing: Vec<String> = FEATURE_NAMES
            .iter()
            .filter(|n| !model_names.iter().any(|m| m.as_ref() == **n))
            .map(|n| n.to_string())
            .collect();

        let unexpected: Vec<String> = model_names
            .iter()
            .map(|m| m.as_ref())
            .filter(|m| self.position(m).is_none())
            .map(str::to_string)
            .collect();

        let mut duplicated: Vec<String> = Vec::new();
        for (i, name) in model_names.iter().enumerate() {
            let name = name.as_ref();
            let repeated = model_names[..i].iter().any(|m| m.as_ref() == name);
            if repeated && !duplicated.iter().any(|d| d == name) {
                duplicated.push(name.to_string());
            }
        }

        if missing.is_empty() && unexpected.is_empty() && duplicated.is_empty() {
            Ok(())
        } else {
            Err(ModelLoadError::SchemaMismatch {
                missing,
                unexpected,
                duplicated,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_length() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_names_are_unique() {
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            assert_eq!(FeatureSchema.position(name), Some(i), "duplicate {}", name);
        }
    }

    #[test]
    fn test_validate_accepts_permutation() {
        let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
        names.reverse();
        assert!(FeatureSchema.validate(&names).is_ok());
    }

    #[test]
    fn test_validate_reports_missing_and_unexpected() {
        // Fifteen-name list observed in older artifacts, plus a stray column
        let mut names: Vec<&str> = FEATURE_NAMES[..15].to_vec();
        names.push("volume");

        match FeatureSchema.validate(&names) {
            Err(ModelLoadError::SchemaMismatch {
                missing,
                unexpected,
                duplicated,
            }) => {
                assert_eq!(missing, vec!["is_month_start".to_string()]);
                assert_eq!(unexpected, vec!["volume".to_string()]);
                assert!(duplicated.is_empty());
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_repeated_name() {
        // Full set plus a second SMA_5 column
        let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
        names.push("SMA_5_t-1");

        match FeatureSchema.validate(&names) {
            Err(ModelLoadError::SchemaMismatch {
                missing,
                unexpected,
                duplicated,
            }) => {
                assert!(missing.is_empty());
                assert!(unexpected.is_empty());
                assert_eq!(duplicated, vec!["SMA_5_t-1".to_string()]);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }
}

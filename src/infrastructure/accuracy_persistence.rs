use crate::domain::ml::accuracy::AccuracyMetrics;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Flat JSON cache of precomputed accuracy figures.
///
/// The server only reads it; `estimate_accuracy` is the only writer.
pub struct AccuracyPersistence {
    file_path: PathBuf,
}

impl AccuracyPersistence {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn load(&self) -> Result<Option<AccuracyMetrics>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.file_path).context("Failed to read accuracy metrics file")?;
        let metrics: AccuracyMetrics =
            serde_json::from_str(&content).context("Failed to parse accuracy metrics JSON")?;

        info!("Loaded accuracy metrics from {:?}", self.file_path);
        Ok(Some(metrics))
    }

    /// File contents, or the built-in defaults when absent or unreadable.
    pub fn load_or_default(&self) -> AccuracyMetrics {
        match self.load() {
            Ok(Some(metrics)) => metrics,
            Ok(None) => {
                info!(
                    "No accuracy metrics at {:?}, using default metrics",
                    self.file_path
                );
                AccuracyMetrics::default()
            }
            Err(e) => {
                warn!("{:#}, using default metrics", e);
                AccuracyMetrics::default()
            }
        }
    }

    pub fn save(&self, metrics: &AccuracyMetrics) -> Result<()> {
        let content =
            serde_json::to_string_pretty(metrics).context("Failed to serialize accuracy metrics")?;

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).context("Failed to write temp accuracy metrics file")?;
        fs::rename(&temp_path, &self.file_path)
            .context("Failed to rename accuracy metrics file")?;

        info!("Saved accuracy metrics to {:?}", self.file_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::accuracy::ConfidenceLevel;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "indexcast_accuracy_{}_{}",
            uuid::Uuid::new_v4(),
            name
        ))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let store = AccuracyPersistence::new(temp_path("absent.json"));
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.load_or_default(), AccuracyMetrics::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("saved.json");
        let store = AccuracyPersistence::new(&path);
        let metrics = AccuracyMetrics {
            r2_score: 0.41,
            confidence_level: ConfidenceLevel::Low,
            test_samples: Some(200),
            ..AccuracyMetrics::default()
        };

        store.save(&metrics).unwrap();
        assert_eq!(store.load().unwrap(), Some(metrics));
        assert!(!path.with_extension("tmp").exists());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let path = temp_path("corrupt.json");
        fs::write(&path, "{ not json").unwrap();

        let store = AccuracyPersistence::new(&path);
        assert!(store.load().is_err());
        assert_eq!(store.load_or_default(), AccuracyMetrics::default());

        fs::remove_file(&path).ok();
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io;

/// Hyperparameters and output location for a `train_loop` run.
///
/// Every field has a default, so a JSON config file only needs to name the
/// values it changes.
///
/// # Fields
/// - `learning_rate`         — SGD step size
/// - `n_epochs`              — upper bound on full passes over the training batches
/// - `batch_size`            — rows per mini-batch; trailing rows are dropped
/// - `patience`              — initial number of iterations before early stopping
/// - `patience_increase`     — multiplier applied to the iteration index on a
///                             significant improvement
/// - `improvement_threshold` — a validation loss below `best * threshold`
///                             counts as significant
/// - `save_path`             — where the best model is written; `None` keeps it in memory only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub learning_rate: f32,
    pub n_epochs: usize,
    pub batch_size: usize,
    pub patience: usize,
    pub patience_increase: usize,
    pub improvement_threshold: f64,
    pub save_path: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 0.13,
            n_epochs: 1000,
            batch_size: 600,
            patience: 5000,
            patience_increase: 2,
            improvement_threshold: 0.995,
            save_path: Some(PathBuf::from("best_model.json")),
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if self.patience == 0 {
            return Err(Error::InvalidConfig("patience must be at least 1".into()));
        }
        if !(self.improvement_threshold > 0.0 && self.improvement_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "improvement_threshold must lie in (0, 1], got {}",
                self.improvement_threshold
            )));
        }
        Ok(())
    }

    /// Serializes the config to a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        io::write_json(path, self)
    }

    /// Deserializes a `TrainConfig` from a JSON file; missing keys take their defaults.
    pub fn load_json(path: &Path) -> Result<TrainConfig> {
        io::read_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_run() {
        let c = TrainConfig::default();
        assert_eq!(c.learning_rate, 0.13);
        assert_eq!(c.n_epochs, 1000);
        assert_eq!(c.batch_size, 600);
        assert_eq!(c.patience, 5000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.json");
        std::fs::write(&path, r#"{"batch_size": 20, "save_path": null}"#).unwrap();
        let c = TrainConfig::load_json(&path).unwrap();
        assert_eq!(c.batch_size, 20);
        assert_eq!(c.save_path, None);
        assert_eq!(c.learning_rate, 0.13);
    }

    #[test]
    fn rejects_degenerate_values() {
        let bad = [
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { learning_rate: 0.0, ..TrainConfig::default() },
            TrainConfig { learning_rate: f32::NAN, ..TrainConfig::default() },
            TrainConfig { patience: 0, ..TrainConfig::default() },
            TrainConfig { improvement_threshold: 1.5, ..TrainConfig::default() },
        ];
        for c in bad {
            assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))), "{:?}", c);
        }
    }
}

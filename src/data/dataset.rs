use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::idx;
use crate::data::split::Split;
use crate::error::{Error, Result};
use crate::io;

/// The three splits a model is trained, selected and reported on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub train: Split,
    pub valid: Split,
    pub test: Split,
}

impl Dataset {
    /// Loads a dataset from `path`, failing fast when it does not exist.
    ///
    /// - a directory is read as the four raw MNIST IDX files;
    /// - any other path is read as a dataset container (JSON, gzip when `.gz`).
    pub fn load(path: &Path) -> Result<Dataset> {
        if !path.exists() {
            return Err(Error::NotFound { path: path.to_path_buf() });
        }
        let dataset = if path.is_dir() {
            log::info!("loading IDX files from {}", path.display());
            idx::load_idx_dir(path, idx::DEFAULT_VALIDATION_SIZE)?
        } else {
            log::info!("loading dataset container {}", path.display());
            io::read_json::<Dataset>(path)?
        };
        dataset.check_consistent()?;
        log::info!(
            "dataset: {} train, {} valid, {} test rows of {} features",
            dataset.train.len(),
            dataset.valid.len(),
            dataset.test.len(),
            dataset.n_features()
        );
        Ok(dataset)
    }

    /// Writes the dataset container read back by [`Dataset::load`].
    pub fn save(&self, path: &Path) -> Result<()> {
        io::write_json(path, self)
    }

    pub fn n_features(&self) -> usize {
        self.train.n_features()
    }

    /// Checks every split for matching rows/labels and a shared feature width.
    pub fn check_consistent(&self) -> Result<()> {
        for (name, split) in self.named_splits() {
            split.validate(u8::MAX as usize + 1)?;
            if split.n_features() != self.n_features() {
                return Err(Error::ShapeMismatch(format!(
                    "split `{}` has {} features, train has {}",
                    name,
                    split.n_features(),
                    self.n_features()
                )));
            }
        }
        Ok(())
    }

    /// Checks every label against the model's class count.
    pub fn check_labels(&self, n_classes: usize) -> Result<()> {
        for (_, split) in self.named_splits() {
            split.validate(n_classes)?;
        }
        Ok(())
    }

    /// Highest label seen in any split, plus one.
    pub fn n_classes(&self) -> usize {
        self.named_splits()
            .iter()
            .flat_map(|(_, s)| s.labels.iter())
            .max()
            .map(|&m| m as usize + 1)
            .unwrap_or(0)
    }

    pub fn named_splits(&self) -> [(&'static str, &Split); 3] {
        [("train", &self.train), ("valid", &self.valid), ("test", &self.test)]
    }
}

/// Loads a single-split container, used for inference on custom data.
pub fn load_split(path: &Path) -> Result<Split> {
    if !path.exists() {
        return Err(Error::NotFound { path: path.to_path_buf() });
    }
    let split: Split = io::read_json(path)?;
    split.validate(u8::MAX as usize + 1)?;
    Ok(split)
}

pub fn save_split(split: &Split, path: &Path) -> Result<()> {
    io::write_json(path, split)
}

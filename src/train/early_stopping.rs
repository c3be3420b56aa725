use crate::train::train_config::TrainConfig;

/// Outcome of feeding one validation score to [`EarlyStopping::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// The score beat every earlier one.
    pub improved: bool,
    /// The improvement was significant and patience was recomputed.
    pub patience_extended: bool,
}

/// Patience-based stopping rule.
///
/// Training may run until the global iteration index reaches `patience`.
/// A validation loss below `best * improvement_threshold` raises patience to
/// `max(patience, iter * patience_increase)`; patience never shrinks.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    patience_increase: usize,
    improvement_threshold: f64,
    validation_frequency: usize,
    best_loss: f64,
    best_iter: Option<usize>,
}

impl EarlyStopping {
    /// Validation runs every `min(n_train_batches, patience / 2)` iterations
    /// (at least every iteration).
    pub fn new(config: &TrainConfig, n_train_batches: usize) -> EarlyStopping {
        let validation_frequency = n_train_batches.min(config.patience / 2).max(1);
        EarlyStopping {
            patience: config.patience,
            patience_increase: config.patience_increase,
            improvement_threshold: config.improvement_threshold,
            validation_frequency,
            best_loss: f64::INFINITY,
            best_iter: None,
        }
    }

    pub fn validation_frequency(&self) -> usize {
        self.validation_frequency
    }

    pub fn patience(&self) -> usize {
        self.patience
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    pub fn best_iter(&self) -> Option<usize> {
        self.best_iter
    }

    /// Whether iteration `iter` (0-based, global) ends with a validation check.
    pub fn is_check(&self, iter: usize) -> bool {
        (iter + 1) % self.validation_frequency == 0
    }

    pub fn observe(&mut self, iter: usize, loss: f64) -> Observation {
        if !(loss < self.best_loss) {
            return Observation { improved: false, patience_extended: false };
        }

        let significant = loss < self.best_loss * self.improvement_threshold;
        if significant {
            self.patience = self.patience.max(iter.saturating_mul(self.patience_increase));
        }
        self.best_loss = loss;
        self.best_iter = Some(iter);
        Observation { improved: true, patience_extended: significant }
    }

    pub fn should_stop(&self, iter: usize) -> bool {
        self.patience <= iter
    }
}

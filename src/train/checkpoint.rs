use serde::{Deserialize, Serialize};

/// Progress record emitted by `train_loop` at every validation check.
///
/// When a progress sender is passed to `train_loop`, one `Checkpoint` is sent
/// per check; receivers can chart the run or assert on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// 1-based epoch number.
    pub epoch: usize,
    /// 1-based minibatch index within the epoch.
    pub minibatch: usize,
    /// Training batches per epoch.
    pub n_train_batches: usize,
    /// 0-based global iteration index.
    pub iter: usize,
    /// Mean zero-one error over the validation batches, in [0, 1].
    pub validation_error: f64,
    /// Mean test error, only recomputed when validation improved.
    pub test_error: Option<f64>,
    /// Patience after this check.
    pub patience: usize,
    pub improved: bool,
}

/// What a finished `train_loop` run reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSummary {
    pub best_validation_error: f64,
    /// Global iteration at which the best validation error was seen.
    pub best_iter: Option<usize>,
    /// Test error of the best model, if a check ever improved.
    pub test_error: Option<f64>,
    pub epochs_run: usize,
    /// Total gradient steps taken.
    pub iterations: usize,
    /// True when patience ran out before `n_epochs`.
    pub stopped_early: bool,
    pub patience: usize,
    pub elapsed_ms: u64,
}

use std::sync::mpsc;
use std::time::Instant;

use crate::data::dataset::Dataset;
use crate::data::split::Split;
use crate::error::{Error, Result};
use crate::model::logistic::LogisticRegression;
use crate::optim::sgd::Sgd;
use crate::train::checkpoint::{Checkpoint, TrainSummary};
use crate::train::early_stopping::EarlyStopping;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `model` in place with mini-batch SGD and patience-based early stopping.
///
/// Each epoch walks the training batches in order. Every
/// `validation_frequency` iterations the mean validation error is computed;
/// when it beats the best so far the test error is recomputed and, if
/// `config.save_path` is set, the model is written there (overwriting the
/// previous best).
///
/// # Arguments
/// - `model`    — parameters to optimise; modified in place
/// - `dataset`  — train / valid / test splits
/// - `config`   — hyperparameters and save location
/// - `progress` — optional channel receiving one `Checkpoint` per validation check
///
/// # Early termination
/// The loop stops once the global iteration index reaches the current patience,
/// or after `config.n_epochs` epochs. A dropped progress receiver does not stop training.
///
/// # Errors
/// Fails before the first step on an invalid config, a feature-width or label
/// mismatch, or a split with fewer rows than one batch. Fails mid-run only if
/// saving the best model fails.
pub fn train_loop(
    model: &mut LogisticRegression,
    dataset: &Dataset,
    config: &TrainConfig,
    progress: Option<&mpsc::Sender<Checkpoint>>,
) -> Result<TrainSummary> {
    config.validate()?;
    model.check_input_width(dataset.n_features())?;
    dataset.check_labels(model.n_out)?;

    let batch_size = config.batch_size;
    for (name, split) in dataset.named_splits() {
        if split.n_batches(batch_size) == 0 {
            return Err(Error::EmptySplit { name, rows: split.len(), batch_size });
        }
    }

    let n_train_batches = dataset.train.n_batches(batch_size);
    let optimizer = Sgd::new(config.learning_rate);
    let mut stopping = EarlyStopping::new(config, n_train_batches);

    log::info!(
        "training: {} train / {} valid / {} test batches of {}, lr {}, validation every {} iterations",
        n_train_batches,
        dataset.valid.n_batches(batch_size),
        dataset.test.n_batches(batch_size),
        batch_size,
        config.learning_rate,
        stopping.validation_frequency()
    );

    let t_start = Instant::now();
    let mut test_error = None;
    let mut epoch = 0;
    let mut iterations = 0;
    let mut done_looping = false;

    while epoch < config.n_epochs && !done_looping {
        epoch += 1;
        let mut epoch_cost = 0.0;

        for minibatch in 0..n_train_batches {
            let (x, y) = dataset.train.batch(minibatch, batch_size);
            let (grads, cost) = model.gradients(x, y);
            optimizer.step(model, &grads);
            epoch_cost += cost;

            let iter = (epoch - 1) * n_train_batches + minibatch;
            iterations += 1;

            if stopping.is_check(iter) {
                let validation_error = mean_error(model, &dataset.valid, batch_size);
                let observation = stopping.observe(iter, validation_error);

                log::info!(
                    "epoch {}, minibatch {}/{}, validation error {:.6} %",
                    epoch,
                    minibatch + 1,
                    n_train_batches,
                    validation_error * 100.0
                );

                let mut checkpoint_test = None;
                if observation.improved {
                    let score = mean_error(model, &dataset.test, batch_size);
                    test_error = Some(score);
                    checkpoint_test = Some(score);
                    log::info!(
                        "     epoch {}, minibatch {}/{}, test error of best model {:.6} %",
                        epoch,
                        minibatch + 1,
                        n_train_batches,
                        score * 100.0
                    );
                    if let Some(ref path) = config.save_path {
                        model.save_json(path)?;
                        log::debug!("saved best model to {}", path.display());
                    }
                }

                if let Some(tx) = progress {
                    // A dropped receiver only means nobody is watching.
                    let _ = tx.send(Checkpoint {
                        epoch,
                        minibatch: minibatch + 1,
                        n_train_batches,
                        iter,
                        validation_error,
                        test_error: checkpoint_test,
                        patience: stopping.patience(),
                        improved: observation.improved,
                    });
                }
            }

            if stopping.should_stop(iter) {
                done_looping = true;
                break;
            }
        }

        log::debug!(
            "epoch {} mean training cost {:.6}",
            epoch,
            epoch_cost / n_train_batches as f64
        );
    }

    let elapsed = t_start.elapsed();
    let summary = TrainSummary {
        best_validation_error: stopping.best_loss(),
        best_iter: stopping.best_iter(),
        test_error,
        epochs_run: epoch,
        iterations,
        stopped_early: done_looping,
        patience: stopping.patience(),
        elapsed_ms: elapsed.as_millis() as u64,
    };

    log::info!(
        "Optimization complete with best validation score of {:.6} %, with test performance {:.6} %",
        summary.best_validation_error * 100.0,
        summary.test_error.unwrap_or(f64::NAN) * 100.0
    );
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        log::info!(
            "The code ran for {} epochs, with {:.4} epochs/sec",
            epoch,
            epoch as f64 / secs
        );
    }

    Ok(summary)
}

/// Mean zero-one error over every full batch of `split`.
///
/// A split with no full batch has no score and yields `f64::NAN`.
pub fn mean_error(model: &LogisticRegression, split: &Split, batch_size: usize) -> f64 {
    let n_batches = split.n_batches(batch_size);
    if n_batches == 0 {
        return f64::NAN;
    }
    let total: f64 = (0..n_batches)
        .map(|i| {
            let (x, y) = split.batch(i, batch_size);
            model.errors(x, y)
        })
        .sum();
    total / n_batches as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic;

    #[test]
    fn mean_error_covers_full_batches_only() {
        let split = synthetic::blobs(5, 4, 2, 0.1, 3);
        let model = LogisticRegression::new(4, 2);
        // Zero model always answers class 0; classes alternate by row.
        assert_eq!(mean_error(&model, &split, 2), 0.5);
        assert_eq!(mean_error(&model, &split, 10), 0.5);
    }

    #[test]
    fn mean_error_of_a_split_without_full_batches_is_nan() {
        let split = synthetic::blobs(2, 4, 2, 0.1, 3);
        let model = LogisticRegression::new(4, 2);
        assert!(mean_error(&model, &split, 5).is_nan());
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activation::softmax::softmax_rows;
use crate::error::{Error, Result};
use crate::io;
use crate::loss::nll::NllLoss;
use crate::math::matrix::{Matrix, MatrixView};
use crate::model::metadata::ModelMetadata;

/// Multinomial logistic regression: `softmax(X·W + b)`.
///
/// `weights` has shape `n_in × n_out`, `biases` has length `n_out`. Both start
/// at zero, so an untrained model assigns every class the same probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub n_in: usize,
    pub n_out: usize,
    pub weights: Matrix,
    pub biases: Vec<f32>,
    #[serde(default)]
    pub metadata: ModelMetadata,
}

/// Gradients of the mean batch loss w.r.t. each parameter.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub weights: Matrix,
    pub biases: Vec<f32>,
}

impl LogisticRegression {
    pub fn new(n_in: usize, n_out: usize) -> LogisticRegression {
        LogisticRegression {
            n_in,
            n_out,
            weights: Matrix::zeros(n_in, n_out),
            biases: vec![0.0; n_out],
            metadata: ModelMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> LogisticRegression {
        self.metadata = metadata;
        self
    }

    /// `X·W + b`, one row of class scores per input row.
    pub fn logits(&self, x: MatrixView<'_>) -> Matrix {
        let mut z = x.matmul(&self.weights);
        z.add_row(&self.biases);
        z
    }

    /// Class-membership probabilities, one distribution per input row.
    pub fn probabilities(&self, x: MatrixView<'_>) -> Matrix {
        softmax_rows(self.logits(x))
    }

    /// Most probable class of every input row.
    pub fn predict(&self, x: MatrixView<'_>) -> Vec<usize> {
        self.probabilities(x).argmax_rows()
    }

    /// Mean negative log likelihood of `labels` under the model.
    pub fn negative_log_likelihood(&self, x: MatrixView<'_>, labels: &[u8]) -> f64 {
        NllLoss::loss(&self.probabilities(x), labels)
    }

    /// Zero-one loss: fraction of rows that are misclassified.
    pub fn errors(&self, x: MatrixView<'_>, labels: &[u8]) -> f64 {
        NllLoss::error_rate(&self.probabilities(x), labels)
    }

    /// Computes the batch loss and its gradients in one forward pass.
    ///
    /// With `δ = (P − Y) / n`: `dW = Xᵀ·δ`, `db = Σ_rows δ`.
    pub fn gradients(&self, x: MatrixView<'_>, labels: &[u8]) -> (Gradients, f64) {
        let probs = self.probabilities(x);
        let loss = NllLoss::loss(&probs, labels);
        let delta = NllLoss::derivative(&probs, labels);

        let weights = x.t_matmul(&delta);
        // delta already carries the 1/n factor, so the bias gradient is a plain column sum.
        let biases = delta.column_sums();

        (Gradients { weights, biases }, loss)
    }

    /// Returns `ShapeMismatch` unless `cols` equals the model's input width.
    pub fn check_input_width(&self, cols: usize) -> Result<()> {
        if cols != self.n_in {
            return Err(Error::ShapeMismatch(format!(
                "model expects {} input features, got {}",
                self.n_in, cols
            )));
        }
        Ok(())
    }

    fn check_shapes(&self) -> Result<()> {
        if self.weights.rows != self.n_in
            || self.weights.cols != self.n_out
            || self.weights.data.len() != self.n_in * self.n_out
            || self.biases.len() != self.n_out
        {
            return Err(Error::ShapeMismatch(format!(
                "weights {}x{} ({} values) and {} biases do not match a {}→{} model",
                self.weights.rows,
                self.weights.cols,
                self.weights.data.len(),
                self.biases.len(),
                self.n_in,
                self.n_out
            )));
        }
        Ok(())
    }

    /// Serializes the parameters and metadata to JSON (gzip when the path ends in `.gz`).
    pub fn save_json(&self, path: &Path) -> Result<()> {
        io::write_json(path, self)
    }

    /// Loads a model previously written by `save_json`.
    pub fn load_json(path: &Path) -> Result<LogisticRegression> {
        let model: LogisticRegression = io::read_json(path)?;
        model.check_shapes()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_batch() -> (Matrix, Vec<u8>) {
        let x = Matrix::from_rows(vec![
            vec![1.0, 0.0],
            vec![0.9, 0.1],
            vec![0.0, 1.0],
            vec![0.2, 0.8],
        ]);
        (x, vec![0, 0, 1, 1])
    }

    #[test]
    fn zero_model_is_uniform() {
        let model = LogisticRegression::new(2, 4);
        let (x, labels) = toy_batch();
        let p = model.probabilities(x.view());
        assert!(p.data.iter().all(|&v| (v - 0.25).abs() < 1e-6));
        assert!((model.negative_log_likelihood(x.view(), &labels) - 4f64.ln()).abs() < 1e-6);
        // All-equal scores resolve to class 0.
        assert_eq!(model.predict(x.view()), vec![0, 0, 0, 0]);
    }

    #[test]
    fn gradients_match_finite_differences() {
        let mut model = LogisticRegression::new(2, 2);
        model.weights.data = vec![0.3, -0.2, 0.1, 0.4];
        model.biases = vec![0.05, -0.05];
        let (x, labels) = toy_batch();
        let (grads, _) = model.gradients(x.view(), &labels);

        let h = 1e-3f32;
        for k in 0..model.weights.data.len() {
            let mut plus = model.clone();
            plus.weights.data[k] += h;
            let mut minus = model.clone();
            minus.weights.data[k] -= h;
            let numeric = (plus.negative_log_likelihood(x.view(), &labels)
                - minus.negative_log_likelihood(x.view(), &labels))
                / (2.0 * h as f64);
            assert!((numeric - grads.weights.data[k] as f64).abs() < 1e-3, "dW[{}]", k);
        }
        for k in 0..model.biases.len() {
            let mut plus = model.clone();
            plus.biases[k] += h;
            let mut minus = model.clone();
            minus.biases[k] -= h;
            let numeric = (plus.negative_log_likelihood(x.view(), &labels)
                - minus.negative_log_likelihood(x.view(), &labels))
                / (2.0 * h as f64);
            assert!((numeric - grads.biases[k] as f64).abs() < 1e-3, "db[{}]", k);
        }
    }

    #[test]
    fn save_and_load_preserve_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model.json.gz");

        let mut model = LogisticRegression::new(2, 2).with_metadata(ModelMetadata::mnist());
        model.weights.data = vec![1.25, -0.5, -0.75, 2.0];
        model.biases = vec![0.1, -0.1];
        model.save_json(&path).unwrap();

        let loaded = LogisticRegression::load_json(&path).unwrap();
        let (x, _) = toy_batch();
        assert_eq!(loaded, model);
        assert_eq!(loaded.predict(x.view()), model.predict(x.view()));
    }

    #[test]
    fn inconsistent_shapes_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let mut model = LogisticRegression::new(3, 2);
        model.biases.push(0.0);
        model.save_json(&path).unwrap();
        assert!(matches!(
            LogisticRegression::load_json(&path),
            Err(Error::ShapeMismatch(_))
        ));
    }
}

use crate::math::matrix::{argmax, Matrix};

/// Negative log likelihood of the true class, averaged over a batch.
pub struct NllLoss;

/// Floor applied to probabilities inside `ln()`; f32 softmax can underflow to 0.
const EPS: f64 = 1e-12;

impl NllLoss {
    /// `-mean(log(probs[row, labels[row]]))`
    ///
    /// `probs` — row-wise softmax output, shape [n, n_classes]
    /// `labels` — true class index of every row
    pub fn loss(probs: &Matrix, labels: &[u8]) -> f64 {
        assert_eq!(probs.rows, labels.len(), "one label per row");
        if labels.is_empty() {
            return 0.0;
        }
        let total: f64 = labels.iter().enumerate()
            .map(|(i, &y)| -(probs.row(i)[y as usize] as f64).max(EPS).ln())
            .sum();
        total / labels.len() as f64
    }

    /// Gradient of the mean loss w.r.t. the pre-softmax logits:
    ///   ∂L/∂z = (probs - onehot(labels)) / n
    pub fn derivative(probs: &Matrix, labels: &[u8]) -> Matrix {
        assert_eq!(probs.rows, labels.len(), "one label per row");
        let inv_n = 1.0 / labels.len().max(1) as f32;
        let mut delta = probs.clone();
        for (i, &y) in labels.iter().enumerate() {
            let row = delta.row_mut(i);
            row[y as usize] -= 1.0;
            row.iter_mut().for_each(|d| *d *= inv_n);
        }
        delta
    }

    /// Fraction of rows whose arg-max class differs from the label.
    pub fn error_rate(probs: &Matrix, labels: &[u8]) -> f64 {
        assert_eq!(probs.rows, labels.len(), "one label per row");
        if labels.is_empty() {
            return 0.0;
        }
        let wrong = labels.iter().enumerate()
            .filter(|&(i, &y)| argmax(probs.row(i)) != y as usize)
            .count();
        wrong as f64 / labels.len() as f64
    }
}

use crate::math::matrix::Matrix;

/// Softmax over a single vector, in place.
///
/// The maximum is subtracted before exponentiating so large logits cannot
/// overflow; the result is unchanged because softmax is shift-invariant.
pub fn softmax_in_place(v: &mut [f32]) {
    let max = v.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for x in v.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    for x in v.iter_mut() {
        *x /= sum;
    }
}

/// Row-wise softmax: every row of the result is a probability distribution.
pub fn softmax_rows(mut logits: Matrix) -> Matrix {
    let cols = logits.cols;
    if cols == 0 {
        return logits;
    }
    for row in logits.data.chunks_exact_mut(cols) {
        softmax_in_place(row);
    }
    logits
}

use crate::model::logistic::{Gradients, LogisticRegression};

/// Plain gradient descent with a fixed learning rate.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    pub learning_rate: f32,
}

impl Sgd {
    pub fn new(learning_rate: f32) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update in place: `param -= learning_rate * gradient`.
    pub fn step(&self, model: &mut LogisticRegression, grads: &Gradients) {
        model.weights.sub_scaled(&grads.weights, self.learning_rate);
        for (b, g) in model.biases.iter_mut().zip(&grads.biases) {
            *b -= self.learning_rate * g;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;

    #[test]
    fn step_moves_against_the_gradient() {
        let mut model = LogisticRegression::new(2, 2);
        let grads = Gradients {
            weights: Matrix::from_rows(vec![vec![1.0, -2.0], vec![0.0, 4.0]]),
            biases: vec![0.5, -0.5],
        };
        Sgd::new(0.5).step(&mut model, &grads);
        assert_eq!(model.weights.data, vec![-0.5, 1.0, 0.0, -2.0]);
        assert_eq!(model.biases, vec![-0.25, 0.25]);
    }
}

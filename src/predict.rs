use std::path::Path;

use crate::data::image::image_to_grayscale_input;
use crate::data::split::Split;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::model::logistic::LogisticRegression;
use crate::model::metadata::InputType;

/// Inference-only wrapper around a persisted model.
#[derive(Debug, Clone)]
pub struct Predictor {
    model: LogisticRegression,
}

impl Predictor {
    pub fn new(model: LogisticRegression) -> Predictor {
        Predictor { model }
    }

    /// Loads the model written by the trainer.
    pub fn from_file(path: &Path) -> Result<Predictor> {
        let model = LogisticRegression::load_json(path)?;
        log::info!(
            "loaded {}→{} model from {}",
            model.n_in,
            model.n_out,
            path.display()
        );
        Ok(Predictor { model })
    }

    pub fn model(&self) -> &LogisticRegression {
        &self.model
    }

    /// Predicted class of every row of `inputs`.
    pub fn predict(&self, inputs: &Matrix) -> Result<Vec<usize>> {
        self.model.check_input_width(inputs.cols)?;
        Ok(self.model.predict(inputs.view()))
    }

    /// Predictions for every row of `split` and the fraction that miss their label.
    pub fn predict_split(&self, split: &Split) -> Result<(Vec<usize>, f64)> {
        let predictions = self.predict(&split.inputs)?;
        let wrong = predictions
            .iter()
            .zip(&split.labels)
            .filter(|&(&p, &y)| p != y as usize)
            .count();
        let error = if split.is_empty() { 0.0 } else { wrong as f64 / split.len() as f64 };
        Ok((predictions, error))
    }

    /// Classifies a single image file, prepared according to the model's `InputType`.
    ///
    /// Returns the class index and its probability.
    pub fn predict_image(&self, path: &Path, invert: bool) -> Result<(usize, f32)> {
        let (width, height) = match self.model.metadata.input_type {
            Some(InputType::ImageGrayscale { width, height }) => (width, height),
            _ => {
                return Err(Error::ShapeMismatch(
                    "model metadata does not describe an image input".into(),
                ))
            }
        };
        let pixels = image_to_grayscale_input(path, width, height, invert)?;
        let mean = pixels.iter().sum::<f32>() / pixels.len().max(1) as f32;
        if mean > 0.5 {
            log::warn!(
                "{} is mostly bright (mean {:.2}); the model expects light strokes on black",
                path.display(),
                mean
            );
        }
        let input = Matrix::from_vec(1, pixels.len(), pixels);
        self.model.check_input_width(input.cols)?;

        let probs = self.model.probabilities(input.view());
        let class = probs.argmax_rows()[0];
        Ok((class, probs.row(0)[class]))
    }

    /// Human-readable label for a predicted class.
    pub fn label(&self, class: usize) -> String {
        self.model.metadata.label_for(class)
    }
}

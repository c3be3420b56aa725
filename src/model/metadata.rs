use serde::{Deserialize, Serialize};

/// Describes how to interpret the input fed to a model.
/// Stored in the model JSON; the predictor reads this to prepare image input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputType {
    /// Raw feature rows, already normalized.
    Numeric,
    /// Grayscale image resized to width×height, normalized to [0, 1].
    ImageGrayscale { width: u32, height: u32 },
}

/// Optional annotations attached to a saved model.
/// All fields are Option<> so models saved without metadata deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    pub description: Option<String>,
    pub input_type: Option<InputType>,
    /// Human-readable class labels (e.g. ["0","1",...,"9"]).
    pub output_labels: Option<Vec<String>>,
}

impl ModelMetadata {
    /// Annotations for a 28×28 handwritten-digit classifier.
    pub fn mnist() -> Self {
        ModelMetadata {
            description: Some("MNIST multinomial logistic regression".to_owned()),
            input_type: Some(InputType::ImageGrayscale { width: 28, height: 28 }),
            output_labels: Some((0..10).map(|d| d.to_string()).collect()),
        }
    }

    /// Label for class `index`, falling back to the index itself.
    pub fn label_for(&self, index: usize) -> String {
        self.output_labels
            .as_ref()
            .and_then(|labels| labels.get(index).cloned())
            .unwrap_or_else(|| index.to_string())
    }
}

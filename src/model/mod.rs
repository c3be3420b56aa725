pub mod logistic;
pub mod metadata;

pub use logistic::{Gradients, LogisticRegression};
pub use metadata::{InputType, ModelMetadata};

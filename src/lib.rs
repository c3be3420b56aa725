pub mod activation;
pub mod data;
pub mod error;
pub mod io;
pub mod loss;
pub mod math;
pub mod model;
pub mod optim;
pub mod predict;
pub mod train;

// Convenience re-exports
pub use data::{Dataset, Split};
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use model::logistic::LogisticRegression;
pub use model::metadata::ModelMetadata;
pub use optim::sgd::Sgd;
pub use predict::Predictor;
pub use train::{train_loop, Checkpoint, TrainConfig, TrainSummary};

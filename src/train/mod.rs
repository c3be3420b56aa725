pub mod checkpoint;
pub mod early_stopping;
pub mod loop_fn;
pub mod train_config;

pub use checkpoint::{Checkpoint, TrainSummary};
pub use early_stopping::{EarlyStopping, Observation};
pub use loop_fn::{mean_error, train_loop};
pub use train_config::TrainConfig;

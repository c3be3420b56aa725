pub mod dataset;
pub mod idx;
pub mod image;
pub mod split;
pub mod synthetic;

pub use dataset::{load_split, save_split, Dataset};
pub use split::Split;

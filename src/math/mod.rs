pub mod matrix;

pub use matrix::{argmax, Matrix, MatrixView};

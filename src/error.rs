use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by dataset loading, model persistence and training setup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed IDX data: {0}")]
    Idx(String),

    #[error("cannot decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("label {label} at row {row} is out of range for {n_classes} classes")]
    LabelOutOfRange { row: usize, label: u8, n_classes: usize },

    #[error("split `{name}` has {rows} rows, fewer than one batch of {batch_size}")]
    EmptySplit { name: &'static str, rows: usize, batch_size: usize },

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound { path }
        } else {
            Error::Io { path, source }
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        // serde_json wraps reader failures (including gzip corruption) as I/O errors.
        if source.is_io() {
            let io = std::io::Error::new(std::io::ErrorKind::InvalidData, source.to_string());
            return Error::Io { path: path.into(), source: io };
        }
        Error::Json { path: path.into(), source }
    }
}

//! Domain-specific error types for vqa-bench

use thiserror::Error;

/// Main error type for the benchmark harness
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("Image error: {message}")]
    Image { message: String },

    #[error("Inference error: {message}")]
    Inference { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Index {index} out of bounds for dataset of size {len}")]
    OutOfBounds { index: usize, len: usize },
}

impl From<anyhow::Error> for BenchError {
    fn from(err: anyhow::Error) -> Self {
        BenchError::Inference {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::Io {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for BenchError {
    fn from(err: csv::Error) -> Self {
        BenchError::Dataset {
            message: format!("CSV parsing failed: {}", err),
        }
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for BenchError {
    fn from(err: toml::de::Error) -> Self {
        BenchError::Config {
            message: format!("Invalid TOML: {}", err),
        }
    }
}

impl From<image::ImageError> for BenchError {
    fn from(err: image::ImageError) -> Self {
        BenchError::Image {
            message: err.to_string(),
        }
    }
}

impl From<crate::clients::ModelError> for BenchError {
    fn from(err: crate::clients::ModelError) -> Self {
        BenchError::Inference {
            message: err.to_string(),
        }
    }
}

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

//! Error types for the SGD toolkit core.
//!
//! Every failure the learning engine can report is one of a small number of
//! fatal categories: bad configuration before training starts, a feature
//! index outside the model width while scoring, or a malformed model
//! artifact while loading.

use thiserror::Error;

/// The main error type for sgdtk-core operations.
#[derive(Debug, Error)]
pub enum SgdError {
    /// Invalid learner or model configuration (loss name, lambda, width).
    #[error("Configuration error: {message}")]
    Configuration {
        /// A description of the configuration error.
        message: String,
    },

    /// A feature index does not fit inside the model width.
    #[error("Feature index {index} out of bounds for model width {width}")]
    Dimension {
        /// The offending feature index.
        index: usize,
        /// The width of the model being scored.
        width: usize,
    },

    /// A feature vector could not be constructed.
    #[error("Invalid feature vector: {message}")]
    InvalidFeature {
        /// A description of why the vector is invalid.
        message: String,
    },

    /// A model artifact is truncated or malformed.
    #[error("Model format error: {message}")]
    Format {
        /// A description of the format error.
        message: String,
    },

    /// An I/O error while reading or writing a model artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SgdError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SgdError::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        SgdError::Format {
            message: message.into(),
        }
    }
}

/// A specialized Result type for sgdtk-core operations.
pub type Result<T> = std::result::Result<T, SgdError>;

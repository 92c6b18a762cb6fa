//! Model artifact persistence for the SGD toolkit.
//!
//! This crate moves trained [`LinearModel`]s between memory and disk:
//!
//! - **Binary**: the versioned artifact written by [`LinearModel::save`],
//!   bit-exact for every weight
//! - **JSON**: a human-readable [`ModelSnapshot`], good for inspection
//!
//! Either format can be wrapped in gzip. Format and compression are inferred
//! from the file name (`model.bin`, `model.json`, `model.bin.gz`) unless set
//! explicitly.
//!
//! # Example
//!
//! ```no_run
//! use sgdtk_checkpoint::{ModelReader, ModelWriter};
//! use sgdtk_core::LinearModel;
//! use std::path::Path;
//!
//! fn main() -> sgdtk_checkpoint::Result<()> {
//!     let model = LinearModel::new(1024)?;
//!     let path = Path::new("/tmp/sgdtk/model.bin.gz");
//!
//!     ModelWriter::for_path(path).write_to_file(path, &model)?;
//!     let restored = ModelReader::for_path(path).read_from_file(path)?;
//!     assert_eq!(restored.width(), 1024);
//!     Ok(())
//! }
//! ```
//!
//! [`LinearModel`]: sgdtk_core::LinearModel
//! [`LinearModel::save`]: sgdtk_core::LinearModel::save

pub mod serialization;
pub mod snapshot;

pub use serialization::{CompressionType, ModelFormat, ModelReader, ModelWriter};
pub use snapshot::ModelSnapshot;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting or restoring a model.
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// I/O error during checkpoint operations.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Model file not found.
    #[error("Model not found: {0}")]
    NotFound(PathBuf),

    /// Error during JSON serialization.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Error during JSON deserialization.
    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Snapshot format version mismatch.
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version.
        expected: u32,
        /// Found version.
        found: u32,
    },

    /// The model artifact or snapshot is malformed.
    #[error(transparent)]
    Model(#[from] sgdtk_core::SgdError),
}

/// Result type for checkpoint operations.
pub type Result<T> = std::result::Result<T, CheckpointError>;

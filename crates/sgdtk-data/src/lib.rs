//! Dataset loading for the SGD toolkit.
//!
//! This crate turns SVM-Light text files into ordered sequences of
//! [`FeatureVector`]s for the learner:
//!
//! - [`find_dims`] scans a file once to find the feature-space width and the
//!   number of examples.
//! - [`SvmLightReader`] loads every example of a file in file order, checking
//!   indices against a fixed width.
//!
//! # Example
//!
//! ```
//! use sgdtk_data::{find_dims_from, SvmLightReader};
//!
//! let text = "+1 0:1.0 3:0.5\n-1 1:2.0 # negative\n";
//! let dims = find_dims_from(text.as_bytes()).unwrap();
//! assert_eq!((dims.width, dims.height), (4, 2));
//!
//! let examples = SvmLightReader::new(dims.width)
//!     .load_from(text.as_bytes())
//!     .unwrap();
//! assert_eq!(examples.len(), 2);
//! assert_eq!(examples[1].label(), -1.0);
//! ```
//!
//! [`FeatureVector`]: sgdtk_core::FeatureVector

pub mod svmlight;

pub use svmlight::{find_dims, find_dims_from, Dims, OutOfRange, SvmLightReader};

use thiserror::Error;

/// Errors that can occur while loading a dataset.
#[derive(Error, Debug)]
pub enum DataError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// A description of the problem.
        message: String,
    },

    /// A feature index does not fit the configured width.
    #[error("Feature index {index} on line {line} out of bounds for width {width}")]
    IndexOutOfRange {
        /// 1-based line number.
        line: usize,
        /// The offending feature index.
        index: usize,
        /// The configured width.
        width: usize,
    },

    /// The parsed features do not form a valid feature vector.
    #[error("Invalid example on line {line}: {source}")]
    InvalidExample {
        /// 1-based line number.
        line: usize,
        /// The underlying validation error.
        #[source]
        source: sgdtk_core::SgdError,
    },
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DataError>;

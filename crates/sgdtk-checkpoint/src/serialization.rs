//! Model file formats and I/O utilities.
//!
//! # Formats
//!
//! - [`ModelFormat::Binary`]: the compact little-endian artifact produced by
//!   [`LinearModel::save`]
//! - [`ModelFormat::Json`]: a [`ModelSnapshot`] rendered as JSON
//!
//! # I/O Utilities
//!
//! - [`ModelWriter`]: write a model to a file with optional compression
//! - [`ModelReader`]: read a model back
//!
//! # Example
//!
//! ```no_run
//! use sgdtk_checkpoint::{CompressionType, ModelFormat, ModelReader, ModelWriter};
//! use sgdtk_core::LinearModel;
//! use std::path::Path;
//!
//! fn main() -> sgdtk_checkpoint::Result<()> {
//!     let model = LinearModel::new(16)?;
//!     let path = Path::new("/tmp/model.json.gz");
//!
//!     let writer = ModelWriter::new(ModelFormat::Json)
//!         .with_compression(CompressionType::Gzip);
//!     writer.write_to_file(path, &model)?;
//!
//!     let reader = ModelReader::new(ModelFormat::Json)
//!         .with_compression(CompressionType::Gzip);
//!     let restored = reader.read_from_file(path)?;
//!     assert_eq!(restored.width(), 16);
//!     Ok(())
//! }
//! ```
//!
//! [`LinearModel::save`]: sgdtk_core::LinearModel::save

use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sgdtk_core::{LinearModel, SgdError};

use crate::snapshot::ModelSnapshot;
use crate::{CheckpointError, Result};

/// On-disk encoding of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Versioned little-endian binary artifact.
    #[default]
    Binary,
    /// JSON snapshot of the resolved weights.
    Json,
}

impl ModelFormat {
    /// Picks the format from a file name: `.json` (optionally followed by
    /// `.gz`) selects JSON, anything else binary.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let stem = name.strip_suffix(".gz").unwrap_or(&name);
        if stem.ends_with(".json") {
            ModelFormat::Json
        } else {
            ModelFormat::Binary
        }
    }
}

impl FromStr for ModelFormat {
    type Err = CheckpointError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(ModelFormat::Binary),
            "json" => Ok(ModelFormat::Json),
            other => Err(SgdError::Configuration {
                message: format!("unknown model format '{}'", other),
            }
            .into()),
        }
    }
}

/// Compression applied on top of the model encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    /// No compression.
    #[default]
    None,
    /// Gzip compression at the default level.
    Gzip,
}

impl CompressionType {
    /// `Gzip` for names ending in `.gz`, `None` otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => CompressionType::Gzip,
            _ => CompressionType::None,
        }
    }

    /// Check if compression is enabled.
    pub fn is_compressed(&self) -> bool {
        !matches!(self, CompressionType::None)
    }
}

impl FromStr for CompressionType {
    type Err = CheckpointError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CompressionType::None),
            "gzip" | "gz" => Ok(CompressionType::Gzip),
            other => Err(SgdError::Configuration {
                message: format!("unknown compression '{}'", other),
            }
            .into()),
        }
    }
}

/// Writer for model files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelWriter {
    format: ModelFormat,
    compression: CompressionType,
}

impl ModelWriter {
    /// Create a writer for the given format, uncompressed.
    pub fn new(format: ModelFormat) -> Self {
        Self {
            format,
            compression: CompressionType::None,
        }
    }

    /// Create a writer whose format and compression follow the file name.
    pub fn for_path(path: &Path) -> Self {
        Self::new(ModelFormat::from_path(path)).with_compression(CompressionType::from_path(path))
    }

    /// Set the encoding for writing.
    pub fn with_format(mut self, format: ModelFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the compression type for writing.
    pub fn with_compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }

    /// Returns the configured format.
    pub fn format(&self) -> ModelFormat {
        self.format
    }

    /// Returns the configured compression.
    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    /// Encodes `model` into bytes, compressed if configured.
    ///
    /// # Errors
    ///
    /// The JSON format refuses models with NaN or infinite values; the
    /// binary format stores them as-is.
    pub fn encode(&self, model: &LinearModel) -> Result<Vec<u8>> {
        let data = match self.format {
            ModelFormat::Binary => {
                let mut bytes = Vec::with_capacity(25 + 8 * model.width());
                model.save(&mut bytes)?;
                bytes
            }
            ModelFormat::Json => {
                let snapshot = ModelSnapshot::from_model(model);
                snapshot.ensure_finite()?;
                serde_json::to_vec(&snapshot).map_err(CheckpointError::Serialization)?
            }
        };

        if !self.compression.is_compressed() {
            return Ok(data);
        }
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data).map_err(SgdError::Io)?;
        Ok(encoder.finish().map_err(SgdError::Io)?)
    }

    /// Write a model to a file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or I/O fails.
    pub fn write_to_file(&self, path: &Path, model: &LinearModel) -> Result<()> {
        tracing::info!(
            path = %path.display(),
            width = model.width(),
            format = ?self.format,
            compression = ?self.compression,
            "Writing model"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CheckpointError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let data = self.encode(model)?;
        std::fs::write(path, &data).map_err(|e| CheckpointError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), size = data.len(), "Model written");
        Ok(())
    }
}

/// Reader for model files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelReader {
    format: ModelFormat,
    compression: CompressionType,
}

impl ModelReader {
    /// Create a reader for the given format, uncompressed.
    pub fn new(format: ModelFormat) -> Self {
        Self {
            format,
            compression: CompressionType::None,
        }
    }

    /// Create a reader whose format and compression follow the file name.
    pub fn for_path(path: &Path) -> Self {
        Self::new(ModelFormat::from_path(path)).with_compression(CompressionType::from_path(path))
    }

    /// Set the encoding for reading.
    pub fn with_format(mut self, format: ModelFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the compression type for reading.
    pub fn with_compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }

    /// Decodes a model from bytes produced by [`ModelWriter::encode`].
    ///
    /// # Errors
    ///
    /// Malformed input of any kind, including a corrupt gzip stream, is
    /// reported as a format error.
    pub fn decode(&self, raw: &[u8]) -> Result<LinearModel> {
        let decompressed;
        let data = if self.compression.is_compressed() {
            let mut buf = Vec::new();
            GzDecoder::new(raw)
                .read_to_end(&mut buf)
                .map_err(|e| SgdError::Format {
                    message: format!("invalid gzip stream: {}", e),
                })?;
            decompressed = buf;
            decompressed.as_slice()
        } else {
            raw
        };

        match self.format {
            ModelFormat::Binary => Ok(LinearModel::load(data)?),
            ModelFormat::Json => {
                let snapshot: ModelSnapshot =
                    serde_json::from_slice(data).map_err(CheckpointError::Deserialization)?;
                snapshot.into_model()
            }
        }
    }

    /// Read a model from a file.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::NotFound`] if `path` does not exist.
    pub fn read_from_file(&self, path: &Path) -> Result<LinearModel> {
        tracing::info!(path = %path.display(), format = ?self.format, "Reading model");

        if !path.exists() {
            return Err(CheckpointError::NotFound(path.to_path_buf()));
        }

        let raw = std::fs::read(path).map_err(|e| CheckpointError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let model = self.decode(&raw)?;

        tracing::info!(
            path = %path.display(),
            width = model.width(),
            bias = model.has_bias(),
            "Model read"
        );
        Ok(model)
    }
}

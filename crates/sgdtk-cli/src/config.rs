//! Training configuration.
//!
//! A [`TrainConfig`] can be read from a JSON file; every field is optional in
//! the file and falls back to its default. Command-line flags are applied on
//! top by [`TrainCommand`](crate::TrainCommand).
//!
//! ```json
//! {
//!     "train": "data/train.svm",
//!     "eval": "data/test.svm",
//!     "model": "out/model.bin.gz",
//!     "loss": "log",
//!     "lambda": 1e-4,
//!     "epochs": 10
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sgdtk_checkpoint::{CompressionType, ModelFormat};
use sgdtk_core::{LearnerConfig, DEFAULT_LAMBDA};

/// Default number of passes over the training set.
pub const DEFAULT_EPOCHS: usize = 5;

/// Everything a training run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// SVM-Light training file.
    pub train: Option<PathBuf>,
    /// Optional held-out SVM-Light file, evaluated after every epoch.
    pub eval: Option<PathBuf>,
    /// Where to save the trained model.
    pub model: Option<PathBuf>,
    /// Loss name, matched leniently (`hinge`, `log`, `square`).
    pub loss: String,
    /// L2 regularization strength.
    pub lambda: f64,
    /// Number of passes over the training set.
    pub epochs: usize,
    /// Feature-space width; scanned from the training file when unset.
    pub width: Option<usize>,
    /// Whether the model has a bias term.
    pub use_bias: bool,
    /// Whether L2 shrinkage also applies to the bias.
    pub regularize_bias: bool,
    /// Model file encoding; inferred from the model path when unset.
    pub format: Option<ModelFormat>,
    /// Model file compression; inferred from the model path when unset.
    pub compression: Option<CompressionType>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train: None,
            eval: None,
            model: None,
            loss: "hinge".to_string(),
            lambda: DEFAULT_LAMBDA,
            epochs: DEFAULT_EPOCHS,
            width: None,
            use_bias: true,
            regularize_bias: false,
            format: None,
            compression: None,
        }
    }
}

impl TrainConfig {
    /// Reads a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config JSON {}", path.display()))
    }

    /// Checks the settings that can be checked before any data is read.
    pub fn validate(&self) -> Result<()> {
        if self.train.is_none() {
            bail!("a training file is required (--train or \"train\" in the config file)");
        }
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if self.width == Some(0) {
            bail!("width must be at least 1");
        }
        self.learner_config()
            .validate()
            .context("Invalid learner configuration")?;
        Ok(())
    }

    /// The learner settings carried by this configuration.
    pub fn learner_config(&self) -> LearnerConfig {
        LearnerConfig {
            lambda: self.lambda,
            use_bias: self.use_bias,
            regularize_bias: self.regularize_bias,
        }
    }
}

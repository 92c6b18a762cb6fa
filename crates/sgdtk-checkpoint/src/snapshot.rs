//! Serializable view of a linear model.

use serde::{Deserialize, Serialize};
use sgdtk_core::{LinearModel, MODEL_FORMAT_VERSION};

use crate::{CheckpointError, Result};

/// Resolved weights and bias of a [`LinearModel`].
///
/// Used for the JSON format. `bias` is `None` for models without a bias
/// term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Format version for backward compatibility.
    pub format_version: u32,

    /// Width of the feature space.
    pub width: usize,

    /// The bias term, if the model has one.
    pub bias: Option<f64>,

    /// Resolved weights, one per feature index.
    pub weights: Vec<f64>,
}

impl ModelSnapshot {
    /// Captures the resolved state of `model`.
    pub fn from_model(model: &LinearModel) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            width: model.width(),
            bias: model.has_bias().then(|| model.bias()),
            weights: model.weights(),
        }
    }

    /// Fails if the bias or any weight is NaN or infinite, which JSON
    /// cannot represent.
    pub fn ensure_finite(&self) -> Result<()> {
        if let Some(bias) = self.bias.filter(|b| !b.is_finite()) {
            return Err(non_finite(format!("bias is {}", bias)));
        }
        if let Some((index, w)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite())
        {
            return Err(non_finite(format!("weight {} is {}", index, w)));
        }
        Ok(())
    }

    /// Rebuilds a model, checking the version and shape.
    pub fn into_model(self) -> Result<LinearModel> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: MODEL_FORMAT_VERSION,
                found: self.format_version,
            });
        }
        if self.weights.len() != self.width {
            return Err(sgdtk_core::SgdError::Format {
                message: format!(
                    "snapshot declares width {} but holds {} weights",
                    self.width,
                    self.weights.len()
                ),
            }
            .into());
        }
        Ok(LinearModel::from_parts(self.weights, self.bias)?)
    }
}

fn non_finite(detail: String) -> CheckpointError {
    sgdtk_core::SgdError::Format {
        message: format!("{}; use the binary format for diverged models", detail),
    }
    .into()
}

impl From<&LinearModel> for ModelSnapshot {
    fn from(model: &LinearModel) -> Self {
        Self::from_model(model)
    }
}

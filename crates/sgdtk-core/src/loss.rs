//! Loss functions and their sub-gradient coefficients.
//!
//! Every loss is evaluated on the raw model score `s = w·x + b` and the true
//! label `y`. [`Loss::grad_coeff`] returns `d loss / d s`; the learner scales
//! each touched feature by it, so a positive coefficient pushes the score
//! down and a negative one pushes it up.
//!
//! # Available Losses
//!
//! - [`Loss::Hinge`] - `max(0, 1 - y·s)`, the linear SVM loss
//! - [`Loss::Log`] - `log(1 + exp(-y·s))`, logistic regression
//! - [`Loss::Square`] - `(s - y)²`, least squares
//!
//! # Example
//!
//! ```
//! use sgdtk_core::Loss;
//!
//! let loss = Loss::from_name("sq");
//! assert_eq!(loss, Loss::Square);
//! assert_eq!(loss.grad_coeff(0.5, 1.0), -1.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SgdError;

/// Stateless loss strategy.
///
/// The variant set is closed, so the learner matches on it inline in the
/// update loop instead of dispatching through a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loss {
    /// Hinge loss.
    #[default]
    Hinge,
    /// Logistic loss.
    Log,
    /// Squared error loss.
    Square,
}

impl Loss {
    /// Selects a loss by name, falling back to [`Loss::Hinge`].
    ///
    /// Matching is case-insensitive: names starting with `log` select
    /// [`Loss::Log`], names starting with `sq` select [`Loss::Square`], and
    /// anything else (including `hinge`) selects [`Loss::Hinge`].
    pub fn from_name(name: &str) -> Self {
        match Self::parse_prefix(name) {
            Some(loss) => loss,
            None => {
                tracing::warn!(name, "Unrecognized loss name, using hinge loss");
                Loss::Hinge
            }
        }
    }

    fn parse_prefix(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name.starts_with("log") {
            Some(Loss::Log)
        } else if name.starts_with("sq") {
            Some(Loss::Square)
        } else if name.starts_with("hinge") {
            Some(Loss::Hinge)
        } else {
            None
        }
    }

    /// Returns the canonical name of the loss.
    pub fn name(&self) -> &'static str {
        match self {
            Loss::Hinge => "hinge",
            Loss::Log => "log",
            Loss::Square => "square",
        }
    }

    /// Computes the non-negative loss for score `s` and label `y`.
    #[inline]
    pub fn loss(&self, s: f64, y: f64) -> f64 {
        match self {
            Loss::Hinge => (1.0 - y * s).max(0.0),
            Loss::Log => log_one_plus_exp(-y * s),
            Loss::Square => {
                let d = s - y;
                d * d
            }
        }
    }

    /// Computes the derivative of the loss with respect to the score.
    ///
    /// Hinge returns exactly `-y` inside the margin and `0` on or beyond it.
    #[inline]
    pub fn grad_coeff(&self, s: f64, y: f64) -> f64 {
        match self {
            Loss::Hinge => {
                if y * s < 1.0 {
                    -y
                } else {
                    0.0
                }
            }
            Loss::Log => -y / (1.0 + (y * s).exp()),
            Loss::Square => 2.0 * (s - y),
        }
    }
}

/// `log(1 + exp(z))` without overflow for large `|z|`.
#[inline]
fn log_one_plus_exp(z: f64) -> f64 {
    if z > 18.0 {
        z + (-z).exp()
    } else if z < -18.0 {
        z.exp()
    } else {
        z.exp().ln_1p()
    }
}

impl fmt::Display for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strict parsing: unknown names are a configuration error.
impl FromStr for Loss {
    type Err = SgdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_prefix(s).ok_or_else(|| SgdError::Configuration {
            message: format!("unsupported loss function '{}'", s),
        })
    }
}

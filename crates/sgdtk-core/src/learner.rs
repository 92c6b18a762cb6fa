//! Regularized SGD learner with a Pegasos learning-rate schedule.
//!
//! The learner owns the loss, the regularization strength `λ` and a global
//! step counter `t`. Each example performs one update with learning rate
//! `η = 1 / (λ·t)`:
//!
//! 1. `s = w·x + b`
//! 2. `w ← (1 - η·λ)·w` (a constant-time scale on the model)
//! 3. `g = loss'(s, y)`
//! 4. if `g ≠ 0`: `w[i] ← w[i] - η·g·x[i]` for every non-zero `x[i]`, and
//!    `b ← b - η·g`
//! 5. `t ← t + 1`
//!
//! `t` starts at 1 and keeps counting across epochs, so the schedule decays
//! over the whole run rather than restarting with each pass.
//!
//! # Example
//!
//! ```
//! use sgdtk_core::{FeatureVector, Learner, LearnerConfig, Loss, Metrics, SgdLearner};
//!
//! let examples = vec![
//!     FeatureVector::from_pairs(1.0, [(0, 1.0)]).unwrap(),
//!     FeatureVector::from_pairs(-1.0, [(1, 1.0)]).unwrap(),
//! ];
//!
//! let config = LearnerConfig {
//!     lambda: 0.1,
//!     use_bias: false,
//!     ..LearnerConfig::default()
//! };
//! let mut learner = SgdLearner::with_config(Loss::Hinge, config).unwrap();
//! let mut model = learner.create_model(2).unwrap();
//! learner.train_epoch(&mut model, &examples).unwrap();
//!
//! let mut metrics = Metrics::new();
//! learner.eval(&model, &examples, &mut metrics).unwrap();
//! assert_eq!(metrics.error(), 0.0);
//! assert_eq!(learner.step(), 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SgdError};
use crate::feature::FeatureVector;
use crate::loss::Loss;
use crate::metrics::Metrics;
use crate::model::LinearModel;

/// Default regularization strength.
pub const DEFAULT_LAMBDA: f64 = 1e-5;

/// Configuration for [`SgdLearner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// L2 regularization strength `λ`; must be positive and finite.
    pub lambda: f64,
    /// Whether models created by the learner carry a bias term.
    pub use_bias: bool,
    /// Whether the L2 shrinkage is also applied to the bias.
    pub regularize_bias: bool,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            use_bias: true,
            regularize_bias: false,
        }
    }
}

impl LearnerConfig {
    /// Creates a configuration with the given `λ` and default bias handling.
    pub fn with_lambda(lambda: f64) -> Self {
        Self {
            lambda,
            ..Self::default()
        }
    }

    /// Checks that `λ` is usable for the `1 / (λ·t)` schedule.
    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() || self.lambda <= 0.0 {
            return Err(SgdError::config(format!(
                "lambda must be positive and finite, got {}",
                self.lambda
            )));
        }
        Ok(())
    }
}

/// Interface between a training driver and a learning algorithm.
pub trait Learner {
    /// Creates a fresh model for a feature space of `width` features.
    fn create_model(&self, width: usize) -> Result<LinearModel>;

    /// Runs one pass over `examples` in the given order, updating `model`.
    ///
    /// # Errors
    ///
    /// Fails fast with [`SgdError::Dimension`] if an example does not fit the
    /// model; updates from earlier examples in the pass are kept.
    fn train_epoch(&mut self, model: &mut LinearModel, examples: &[FeatureVector]) -> Result<()>;

    /// Evaluates `model` on `examples`, accumulating into `metrics`.
    fn eval(
        &self,
        model: &LinearModel,
        examples: &[FeatureVector],
        metrics: &mut Metrics,
    ) -> Result<()>;
}

/// Stochastic gradient descent with L2 regularization.
#[derive(Debug, Clone)]
pub struct SgdLearner {
    loss: Loss,
    config: LearnerConfig,
    /// Global step counter, starting at 1.
    t: u64,
}

impl SgdLearner {
    /// Creates a learner with the given loss and regularization strength.
    ///
    /// # Errors
    ///
    /// Returns [`SgdError::Configuration`] if `lambda` is not positive.
    pub fn new(loss: Loss, lambda: f64) -> Result<Self> {
        Self::with_config(loss, LearnerConfig::with_lambda(lambda))
    }

    /// Creates a learner from a full configuration.
    pub fn with_config(loss: Loss, config: LearnerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { loss, config, t: 1 })
    }

    /// Returns the loss used for updates and evaluation.
    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// Returns the regularization strength.
    pub fn lambda(&self) -> f64 {
        self.config.lambda
    }

    /// Returns the learner configuration.
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Returns the step counter: one more than the number of examples seen.
    pub fn step(&self) -> u64 {
        self.t
    }

    /// Returns the learning rate for the next update, `1 / (λ·t)`.
    pub fn learning_rate(&self) -> f64 {
        1.0 / (self.config.lambda * self.t as f64)
    }

    /// Applies a single SGD update for one example.
    pub fn train_example(&mut self, model: &mut LinearModel, fv: &FeatureVector) -> Result<()> {
        let lambda = self.config.lambda;
        let s = model.score(fv)?;
        let eta = self.learning_rate();

        let shrink = 1.0 - eta * lambda;
        model.scale_weights(shrink);
        if self.config.regularize_bias {
            model.scale_bias(shrink);
        }

        let g = self.loss.grad_coeff(s, fv.label());
        if g != 0.0 {
            model.add_scaled(fv, -eta * g)?;
            model.add_bias(-eta * g);
        }

        self.t += 1;
        Ok(())
    }
}

impl Learner for SgdLearner {
    fn create_model(&self, width: usize) -> Result<LinearModel> {
        LinearModel::with_bias(width, self.config.use_bias)
    }

    fn train_epoch(&mut self, model: &mut LinearModel, examples: &[FeatureVector]) -> Result<()> {
        let start_step = self.t;
        for fv in examples {
            self.train_example(model, fv)?;
        }
        tracing::debug!(
            loss = %self.loss,
            examples = examples.len(),
            start_step,
            step = self.t,
            eta = self.learning_rate(),
            "Finished training epoch"
        );
        Ok(())
    }

    fn eval(
        &self,
        model: &LinearModel,
        examples: &[FeatureVector],
        metrics: &mut Metrics,
    ) -> Result<()> {
        // The model is fixed for the whole pass, so the penalty is too.
        let penalty = 0.5 * self.config.lambda * model.squared_norm();
        for fv in examples {
            let s = model.score(fv)?;
            let y = fv.label();
            let loss = self.loss.loss(s, y);
            metrics.add(loss, loss + penalty, sign(s) != sign(y));
        }
        tracing::debug!(
            examples = examples.len(),
            loss = metrics.loss(),
            cost = metrics.cost(),
            error = metrics.error(),
            "Finished evaluation pass"
        );
        Ok(())
    }
}

/// Three-way sign with `sign(0) = 0`, so a zero score only matches a zero
/// label. NaN maps to 0.
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

//! Linear models trained by stochastic gradient descent over sparse features.
//!
//! This crate is the learning engine of the SGD toolkit:
//!
//! - **Sparse examples**: [`FeatureVector`] holds the non-zero `(index, value)`
//!   pairs of one example and its label.
//! - **Losses**: [`Loss`] is the closed set of hinge, logistic and squared
//!   losses together with their sub-gradients.
//! - **Models**: [`LinearModel`] is a dense weight vector plus bias, with a
//!   lazily applied L2 scale factor and a versioned binary artifact format.
//! - **Training**: [`SgdLearner`] runs Pegasos-style SGD epochs with an
//!   `η = 1/(λ·t)` schedule behind the [`Learner`] trait.
//! - **Evaluation**: [`Metrics`] accumulates mean loss, regularized cost and
//!   error rate over a dataset pass.
//!
//! # Example
//!
//! ```
//! use sgdtk_core::{FeatureVector, Learner, LinearModel, Loss, Metrics, SgdLearner};
//!
//! let train = vec![
//!     FeatureVector::from_pairs(1.0, [(0, 1.0), (2, 0.5)]).unwrap(),
//!     FeatureVector::from_pairs(-1.0, [(1, 1.0), (2, 0.5)]).unwrap(),
//! ];
//!
//! let mut learner = SgdLearner::new(Loss::from_name("log"), 1e-2).unwrap();
//! let mut model = learner.create_model(3).unwrap();
//! for _ in 0..5 {
//!     learner.train_epoch(&mut model, &train).unwrap();
//! }
//!
//! let mut metrics = Metrics::new();
//! learner.eval(&model, &train, &mut metrics).unwrap();
//! assert_eq!(metrics.error(), 0.0);
//!
//! let mut bytes = Vec::new();
//! model.save(&mut bytes).unwrap();
//! let restored = LinearModel::load(bytes.as_slice()).unwrap();
//! assert_eq!(restored.weights(), model.weights());
//! ```

pub mod error;
pub mod feature;
pub mod learner;
pub mod loss;
pub mod metrics;
pub mod model;

pub use error::{Result, SgdError};
pub use feature::FeatureVector;
pub use learner::{Learner, LearnerConfig, SgdLearner, DEFAULT_LAMBDA};
pub use loss::Loss;
pub use metrics::Metrics;
pub use model::{LinearModel, MODEL_FORMAT_VERSION, MODEL_MAGIC};

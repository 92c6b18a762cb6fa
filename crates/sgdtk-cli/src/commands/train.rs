//! Train Command Implementation
//!
//! Loads an SVM-Light training set (and optionally a held-out set), runs the
//! requested number of SGD epochs, reports loss, cost and error after each
//! one, and saves the model. Settings come from a JSON config file and
//! command-line flags, flags taking precedence.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sgdtk_checkpoint::{CompressionType, ModelFormat, ModelWriter};
use sgdtk_core::{FeatureVector, Learner, LinearModel, Loss, Metrics, SgdLearner};
use sgdtk_data::{find_dims, OutOfRange, SvmLightReader};
use tracing::info;

use crate::config::TrainConfig;

/// Train a linear model with SGD
///
/// # Example
///
/// ```bash
/// sgdtk train \
///     --train data/train.svm \
///     --eval data/test.svm \
///     --loss log --lambda 1e-4 --epochs 10 \
///     --model out/model.bin
/// ```
#[derive(Args, Debug, Clone, Default)]
pub struct TrainCommand {
    /// SVM-Light training file
    #[arg(long, short = 't')]
    pub train: Option<PathBuf>,

    /// SVM-Light held-out file, evaluated after every epoch
    #[arg(long, short = 'e')]
    pub eval: Option<PathBuf>,

    /// Where to save the trained model (`.json` selects JSON, `.gz` gzip)
    #[arg(long, short = 'm')]
    pub model: Option<PathBuf>,

    /// Loss function: hinge, log or square [default: hinge]
    #[arg(long)]
    pub loss: Option<String>,

    /// L2 regularization strength [default: 1e-5]
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Number of passes over the training set [default: 5]
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Feature-space width; scanned from the training file when omitted
    #[arg(long)]
    pub width: Option<usize>,

    /// Train without a bias term
    #[arg(long)]
    pub no_bias: bool,

    /// Apply L2 shrinkage to the bias as well
    #[arg(long)]
    pub regularize_bias: bool,

    /// Model file encoding (binary or json)
    #[arg(long)]
    pub format: Option<ModelFormat>,

    /// Model file compression (none or gzip)
    #[arg(long)]
    pub compression: Option<CompressionType>,

    /// Path to a JSON training configuration
    #[arg(long, short = 'c', env = "SGDTK_CONFIG")]
    pub config: Option<PathBuf>,
}

impl TrainCommand {
    /// Execute the train command, returning one report per epoch.
    pub fn run(&self) -> Result<Vec<EpochReport>> {
        let config = self.resolve_config()?;
        config.validate()?;
        train(&config)
    }

    /// Merges the config file (if any) with the command-line flags.
    pub fn resolve_config(&self) -> Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!(path = %path.display(), "Loading config");
                TrainConfig::from_file(path)?
            }
            None => TrainConfig::default(),
        };

        if let Some(train) = &self.train {
            config.train = Some(train.clone());
        }
        if let Some(eval) = &self.eval {
            config.eval = Some(eval.clone());
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(loss) = &self.loss {
            config.loss = loss.clone();
        }
        if let Some(lambda) = self.lambda {
            config.lambda = lambda;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(width) = self.width {
            config.width = Some(width);
        }
        if self.no_bias {
            config.use_bias = false;
        }
        if self.regularize_bias {
            config.regularize_bias = true;
        }
        if let Some(format) = self.format {
            config.format = Some(format);
        }
        if let Some(compression) = self.compression {
            config.compression = Some(compression);
        }

        Ok(config)
    }
}

/// Metrics recorded after one epoch.
#[derive(Debug, Clone, Serialize)]
pub struct EpochReport {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Seconds spent in the training pass.
    pub elapsed_secs: f64,
    /// Metrics on the training set.
    pub train: Metrics,
    /// Metrics on the held-out set, if one was given.
    pub eval: Option<Metrics>,
}

/// Runs a full training job described by `config`.
pub fn train(config: &TrainConfig) -> Result<Vec<EpochReport>> {
    let train_path = config
        .train
        .as_deref()
        .context("A training file is required")?;

    let width = match config.width {
        Some(width) => width,
        None => {
            let dims = find_dims(train_path)
                .with_context(|| format!("Failed to scan {}", train_path.display()))?;
            info!(
                width = dims.width,
                height = dims.height,
                "Dataset dimensions {} x {}",
                dims.width,
                dims.height
            );
            dims.width
        }
    };

    let load_start = Instant::now();
    let train_set = SvmLightReader::new(width)
        .load(train_path)
        .with_context(|| format!("Failed to load training data {}", train_path.display()))?;
    let eval_set = match &config.eval {
        Some(path) => Some(
            SvmLightReader::new(width)
                .with_out_of_range(OutOfRange::Drop)
                .load(path)
                .with_context(|| format!("Failed to load eval data {}", path.display()))?,
        ),
        None => None,
    };
    info!(
        elapsed_secs = load_start.elapsed().as_secs_f64(),
        "Finished loading data"
    );

    let loss = Loss::from_name(&config.loss);
    let mut learner = SgdLearner::with_config(loss, config.learner_config())?;
    let mut model = learner.create_model(width)?;
    info!(
        loss = %loss,
        lambda = config.lambda,
        epochs = config.epochs,
        width,
        "Starting training"
    );

    let reports = run_epochs(
        &mut learner,
        &mut model,
        &train_set,
        eval_set.as_deref(),
        config.epochs,
    )?;

    if let Some(path) = &config.model {
        save_model(config, path, &model)?;
    }

    Ok(reports)
}

/// Trains for `epochs` passes, evaluating after each one.
pub fn run_epochs<L: Learner>(
    learner: &mut L,
    model: &mut LinearModel,
    train_set: &[FeatureVector],
    eval_set: Option<&[FeatureVector]>,
    epochs: usize,
) -> Result<Vec<EpochReport>> {
    let mut reports = Vec::with_capacity(epochs);
    let mut metrics = Metrics::new();
    let mut total_secs = 0.0;

    for epoch in 1..=epochs {
        let start = Instant::now();
        learner
            .train_epoch(model, train_set)
            .with_context(|| format!("Training failed in epoch {}", epoch))?;
        let elapsed_secs = start.elapsed().as_secs_f64();
        total_secs += elapsed_secs;
        info!(epoch, elapsed_secs, total_secs, "Trained epoch");

        learner.eval(model, train_set, &mut metrics)?;
        log_metrics(epoch, "train", &metrics);
        let train = metrics.clone();
        metrics.clear();

        let eval = match eval_set {
            Some(examples) => {
                learner.eval(model, examples, &mut metrics)?;
                log_metrics(epoch, "eval", &metrics);
                let eval = metrics.clone();
                metrics.clear();
                Some(eval)
            }
            None => None,
        };

        reports.push(EpochReport {
            epoch,
            elapsed_secs,
            train,
            eval,
        });
    }

    Ok(reports)
}

fn log_metrics(epoch: usize, dataset: &str, metrics: &Metrics) {
    info!(
        epoch,
        dataset,
        examples = metrics.count(),
        loss = metrics.loss(),
        cost = metrics.cost(),
        error_pct = metrics.error() * 100.0,
        "Epoch metrics"
    );
}

fn save_model(config: &TrainConfig, path: &Path, model: &LinearModel) -> Result<()> {
    let mut writer = ModelWriter::for_path(path);
    if let Some(format) = config.format {
        writer = writer.with_format(format);
    }
    if let Some(compression) = config.compression {
        writer = writer.with_compression(compression);
    }
    writer
        .write_to_file(path, model)
        .with_context(|| format!("Failed to save model to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgdtk_core::{LearnerConfig, SgdError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn examples() -> Vec<FeatureVector> {
        vec![
            FeatureVector::from_pairs(1.0, [(0, 1.0)]).unwrap(),
            FeatureVector::from_pairs(-1.0, [(1, 1.0)]).unwrap(),
        ]
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "train": "file.svm", "loss": "log", "lambda": 0.5, "epochs": 7 }}"#
        )
        .unwrap();

        let cmd = TrainCommand {
            config: Some(file.path().to_path_buf()),
            lambda: Some(0.01),
            no_bias: true,
            ..TrainCommand::default()
        };
        let config = cmd.resolve_config().unwrap();
        assert_eq!(config.train, Some(PathBuf::from("file.svm")));
        assert_eq!(config.loss, "log");
        assert_eq!(config.lambda, 0.01);
        assert_eq!(config.epochs, 7);
        assert!(!config.use_bias);
    }

    #[test]
    fn test_defaults_without_config_file() {
        let cmd = TrainCommand {
            train: Some(PathBuf::from("a.svm")),
            ..TrainCommand::default()
        };
        let config = cmd.resolve_config().unwrap();
        assert_eq!(config.loss, "hinge");
        assert_eq!(config.epochs, 5);
        assert!(config.use_bias);
    }

    #[test]
    fn test_run_requires_train_file() {
        assert!(TrainCommand::default().run().is_err());
    }

    #[test]
    fn test_run_epochs_reports_every_epoch() {
        let config = LearnerConfig {
            lambda: 0.1,
            use_bias: false,
            ..LearnerConfig::default()
        };
        let mut learner = SgdLearner::with_config(Loss::Hinge, config).unwrap();
        let mut model = learner.create_model(2).unwrap();
        let train_set = examples();

        let reports =
            run_epochs(&mut learner, &mut model, &train_set, Some(&train_set), 3).unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(learner.step(), 7);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.epoch, i + 1);
            assert_eq!(report.train.count(), 2);
            assert_eq!(report.train.error(), 0.0);
            assert_eq!(report.eval.as_ref(), Some(&report.train));
        }
    }

    #[test]
    fn test_run_epochs_surfaces_dimension_error() {
        let mut learner = SgdLearner::new(Loss::Hinge, 0.1).unwrap();
        let mut model = learner.create_model(1).unwrap();
        let err = run_epochs(&mut learner, &mut model, &examples(), None, 2)
            .expect_err("index 1 is outside width 1");
        assert!(matches!(
            err.downcast_ref::<SgdError>(),
            Some(SgdError::Dimension { index: 1, width: 1 })
        ));
    }
}

//! Eval Command Implementation
//!
//! Scores a saved model against an SVM-Light file. Features beyond the
//! model width are dropped.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sgdtk_checkpoint::{CompressionType, ModelFormat, ModelReader};
use sgdtk_core::{Learner, Loss, Metrics, SgdLearner, DEFAULT_LAMBDA};
use sgdtk_data::{OutOfRange, SvmLightReader};
use tracing::info;

/// Evaluate a saved model on a dataset
///
/// # Example
///
/// ```bash
/// sgdtk eval --model out/model.bin --data data/test.svm --loss log
/// ```
#[derive(Args, Debug, Clone)]
pub struct EvalCommand {
    /// Saved model file
    #[arg(long, short = 'm')]
    pub model: PathBuf,

    /// SVM-Light file to evaluate on
    #[arg(long, short = 'd')]
    pub data: PathBuf,

    /// Loss used for the reported loss and cost
    #[arg(long, default_value = "hinge")]
    pub loss: String,

    /// L2 strength used for the reported cost
    #[arg(long, default_value_t = DEFAULT_LAMBDA)]
    pub lambda: f64,

    /// Model file encoding; inferred from the file name when omitted
    #[arg(long)]
    pub format: Option<ModelFormat>,

    /// Model file compression; inferred from the file name when omitted
    #[arg(long)]
    pub compression: Option<CompressionType>,
}

impl EvalCommand {
    /// Execute the eval command.
    pub fn run(&self) -> Result<Metrics> {
        let mut reader = ModelReader::for_path(&self.model);
        if let Some(format) = self.format {
            reader = reader.with_format(format);
        }
        if let Some(compression) = self.compression {
            reader = reader.with_compression(compression);
        }
        let model = reader
            .read_from_file(&self.model)
            .with_context(|| format!("Failed to load model {}", self.model.display()))?;

        let examples = SvmLightReader::new(model.width())
            .with_out_of_range(OutOfRange::Drop)
            .load(&self.data)
            .with_context(|| format!("Failed to load data {}", self.data.display()))?;

        let learner = SgdLearner::new(Loss::from_name(&self.loss), self.lambda)?;
        let mut metrics = Metrics::new();
        learner.eval(&model, &examples, &mut metrics)?;

        info!(
            examples = metrics.count(),
            loss = metrics.loss(),
            cost = metrics.cost(),
            error_pct = metrics.error() * 100.0,
            "Evaluation metrics"
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgdtk_checkpoint::ModelWriter;
    use sgdtk_core::LinearModel;
    use tempfile::tempdir;

    #[test]
    fn test_eval_saved_model() {
        let dir = tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let data_path = dir.path().join("data.svm");

        let model = LinearModel::from_parts(vec![1.5, -1.5], None).unwrap();
        ModelWriter::for_path(&model_path)
            .write_to_file(&model_path, &model)
            .unwrap();
        // Index 7 is outside the model and is dropped.
        std::fs::write(&data_path, "+1 0:1.0 7:3.0\n+1 1:1.0\n").unwrap();

        let cmd = EvalCommand {
            model: model_path,
            data: data_path,
            loss: "hinge".to_string(),
            lambda: 1.0,
            format: None,
            compression: None,
        };
        let metrics = cmd.run().unwrap();
        assert_eq!(metrics.count(), 2);
        assert_eq!(metrics.error(), 0.5);
        assert!((metrics.loss() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_eval_missing_model() {
        let dir = tempdir().unwrap();
        let cmd = EvalCommand {
            model: dir.path().join("absent.bin"),
            data: dir.path().join("data.svm"),
            loss: "hinge".to_string(),
            lambda: DEFAULT_LAMBDA,
            format: None,
            compression: None,
        };
        let err = cmd.run().expect_err("model does not exist");
        assert!(err.to_string().contains("Failed to load model"));
    }
}

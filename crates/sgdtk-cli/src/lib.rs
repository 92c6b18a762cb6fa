//! sgdtk CLI Library
//!
//! This crate provides the command-line interface for the SGD toolkit:
//!
//! - **Train**: fit a linear model on an SVM-Light file for a number of epochs
//! - **Eval**: score a saved model against another SVM-Light file
//!
//! # Example
//!
//! ```bash
//! # Train with log loss, report held-out metrics every epoch, save the model
//! sgdtk train --train rcv1.train.svm --eval rcv1.test.svm \
//!     --loss log --lambda 1e-5 --epochs 5 --model rcv1.bin
//!
//! # Evaluate the saved model on new data
//! sgdtk eval --model rcv1.bin --data rcv1.test.svm --loss log
//! ```

pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};

pub use commands::{EpochReport, EvalCommand, TrainCommand};
pub use config::TrainConfig;

/// sgdtk - stochastic gradient descent for sparse linear models
///
/// Trains hinge, logistic, or squared-loss linear models with L2
/// regularization on SVM-Light data.
#[derive(Parser, Debug)]
#[command(name = "sgdtk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model, reporting metrics after every epoch
    Train(TrainCommand),

    /// Evaluate a saved model on a dataset
    Eval(EvalCommand),
}

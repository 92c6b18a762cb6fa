//! CLI Command Implementations
//!
//! - [`TrainCommand`]: epoch-based training with per-epoch metrics
//! - [`EvalCommand`]: scoring a saved model against a dataset

mod eval;
mod train;

pub use eval::EvalCommand;
pub use train::{run_epochs, train, EpochReport, TrainCommand};

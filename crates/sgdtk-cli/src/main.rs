//! sgdtk - command-line driver for training and evaluating SGD linear models.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sgdtk_cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("sgdtk=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(cmd) => {
            let reports = cmd.run()?;
            info!(epochs = reports.len(), "Training finished");
        }
        Commands::Eval(cmd) => {
            cmd.run()?;
        }
    }

    Ok(())
}

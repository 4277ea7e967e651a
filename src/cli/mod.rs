// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes to the use case.
// The subcommand is the run mode; it is decided here once and
// never re-checked further down.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Commands;

use crate::application::{
    driver::DriverOutcome,
    run_use_case::{RunMode, RunUseCase},
};

#[derive(Parser, Debug)]
#[command(
    name = "c2-lstm",
    version,
    about = "Train an LSTM on Codec 2 frames, then sample synthetic frame files."
)]
/// Top-level command line.
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch the chosen subcommand.
    pub fn run(self) -> Result<()> {
        let (mode, options) = match self.command {
            Commands::Train(args)    => (RunMode::Train, args.into()),
            Commands::Generate(args) => (RunMode::Generate, args.into()),
        };

        tracing::info!("Starting {:?} run", mode);
        let summary = RunUseCase::new(mode, options).execute()?;

        match (mode, summary.outcome) {
            (RunMode::Train, Some(DriverOutcome::Interrupted { next_iteration })) => {
                println!("Training stopped before iteration {next_iteration}; rerun to resume.")
            }
            (RunMode::Train, _) => {
                println!("Training finished (started at iteration {}).", summary.start_iteration)
            }
            (RunMode::Generate, _) => match summary.loaded_from {
                Some(iteration) => println!("Sample written from the iteration {iteration} checkpoint."),
                None            => println!("Sample written."),
            },
        }
        Ok(())
    }
}

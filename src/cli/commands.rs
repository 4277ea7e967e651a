// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Two subcommands, `train` and `generate`. Model and dataset
// hyperparameters live in <model_dir>/config.json; the flags
// here only pick paths and generation settings.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::run_use_case::RunOptions;
use crate::ml::generator::SeedStart;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the frame model, sampling and checkpointing on schedule
    Train(TrainArgs),

    /// Write one sample from the latest checkpoint and exit
    Generate(GenerateArgs),
}

/// Flags shared by both subcommands.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Directory holding config.json, checkpoints and samples
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,

    /// Corpus of concatenated Codec 2 frames (overrides test_data_fn)
    #[arg(long)]
    pub testdata: Option<PathBuf>,

    /// Frame index to seed generation from, or "random"
    #[arg(long, default_value = "0")]
    pub seed_start: SeedStart,

    /// Number of frames per generated sample (overrides generate_len)
    #[arg(long)]
    pub generate_len: Option<usize>,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Last iteration to train (overrides num_iterations)
    #[arg(long)]
    pub num_iterations: Option<usize>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommonArgs {
    fn into_options(self, num_iterations: Option<usize>) -> RunOptions {
        RunOptions {
            model_dir:    self.model_dir,
            testdata:     self.testdata,
            seed_start:   self.seed_start,
            generate_len: self.generate_len,
            num_iterations,
        }
    }
}

impl From<TrainArgs> for RunOptions {
    fn from(a: TrainArgs) -> Self {
        a.common.into_options(a.num_iterations)
    }
}

impl From<GenerateArgs> for RunOptions {
    fn from(a: GenerateArgs) -> Self {
        a.common.into_options(None)
    }
}

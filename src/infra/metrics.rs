// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per training iteration:
//
//   iteration,loss,learning_rate,seconds
//   0,0.412031,0.001000,3.204
//   1,0.287550,0.001000,3.118
//
// The file is appended to across resumed runs, so a restarted
// iteration shows up twice; the later row wins.
//
// Output file: <model_dir>/training.csv

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationMetrics {
    pub iteration:     usize,
    /// Mean MSE over all batches of the epoch
    pub loss:          f64,
    pub learning_rate: f64,
    /// Wall time of the fit call
    pub seconds:       f64,
}

impl IterationMetrics {
    pub fn new(iteration: usize, loss: f64, learning_rate: f64, seconds: f64) -> Self {
        Self { iteration, loss, learning_rate, seconds }
    }
}

/// Appender for `<model_dir>/training.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the header only when the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("training.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "iteration,loss,learning_rate,seconds")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one row for a finished iteration.
    pub fn log(&self, m: &IterationMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.3}",
            m.iteration, m.loss, m.learning_rate, m.seconds,
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

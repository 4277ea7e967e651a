// ============================================================
// Layer 6 — Sample Writer
// ============================================================
// Writes generated frames as a raw Codec 2 frame file, the same
// layout as the training corpus, so it can be fed straight to
// a Codec 2 decoder.
//
//   <model_dir>/samples/out-c2cb-<iteration>

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::traits::SampleSink;

/// Writes generated samples under `<model_dir>/samples`.
pub struct SampleWriter {
    dir: PathBuf,
}

impl SampleWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create samples directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// `out-c2cb-<iteration>` inside the samples directory.
    pub fn sample_path(&self, iteration: usize) -> PathBuf {
        self.dir.join(format!("out-c2cb-{iteration}"))
    }
}

impl SampleSink for SampleWriter {
    fn write_sample(&self, iteration: usize, frames: &[Vec<u8>]) -> Result<()> {
        let path  = self.sample_path(iteration);
        let bytes = frames.concat();
        fs::write(&path, &bytes)
            .with_context(|| format!("Cannot write sample '{}'", path.display()))?;
        tracing::info!("Wrote {} bytes to '{}'", bytes.len(), path.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_written_back_to_back() {
        let dir    = tempfile::tempdir().unwrap();
        let writer = SampleWriter::new(dir.path().join("samples")).unwrap();
        writer.write_sample(20, &[vec![1, 2], vec![3, 4]]).unwrap();
        let bytes = fs::read(writer.sample_path(20)).unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }
}

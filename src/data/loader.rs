// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads the raw Codec 2 frame file into memory in one go. The
// file has no header: it is just framelen-byte frames laid end
// to end, so the whole thing is read as bytes.
//
// Reference: Rust Book §9 (Error Handling), §12 (Reading a File)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

/// Loads a corpus file of concatenated frames.
pub struct CorpusLoader {
    path: PathBuf,
}

impl CorpusLoader {
    /// Nothing is read until `load`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every byte of the corpus.
    pub fn load(&self) -> Result<Vec<u8>> {
        tracing::info!("Loading test data from '{}'", self.path.display());
        let bytes = fs::read(&self.path).with_context(|| {
            format!("Cannot read corpus file '{}'", self.path.display())
        })?;
        tracing::info!("Corpus length (bytes): {}", bytes.len());
        Ok(bytes)
    }
}

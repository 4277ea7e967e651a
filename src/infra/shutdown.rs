// ============================================================
// Layer 6 — Shutdown Flag
// ============================================================
// SIGINT / SIGTERM flip an atomic flag (ctrlc with the
// `termination` feature). The training driver polls it between
// iterations so an interrupt never lands mid-checkpoint.

use anyhow::{Context, Result};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::domain::traits::ShutdownSignal;

#[derive(Clone, Default)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Register the process-wide signal handler. Can only be done once.
    pub fn install() -> Result<Self> {
        let shutdown = Self::default();
        let flag     = shutdown.flag.clone();
        ctrlc::set_handler(move || {
            if flag.swap(true, Ordering::SeqCst) {
                // second interrupt: stop waiting for the iteration to finish
                std::process::exit(130);
            }
            eprintln!("\nInterrupt received, stopping after this iteration...");
        })
        .context("Cannot install signal handler")?;
        Ok(shutdown)
    }

    #[cfg(test)]
    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl ShutdownSignal for ShutdownFlag {
    fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

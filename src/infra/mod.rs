// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Side-effecting collaborators of the training driver:
//
//   checkpoint.rs — model structure/weights, iteration counter
//                   and run config in the model directory
//   metrics.rs    — per-iteration CSV log
//   samples.rs    — generated Codec 2 frame files
//   shutdown.rs   — SIGINT/SIGTERM flag
//
// Each implements a Layer 3 trait, so the driver can be tested
// without touching the filesystem or real signals.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Generated sample files
pub mod samples;

/// Signal-driven shutdown flag
pub mod shutdown;

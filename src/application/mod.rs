// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only:
//   - No tensor code here (Layer 5)
//   - No printing here (Layer 1)
//   - File access goes through Layer 6
//
// Reference: Clean Architecture pattern

/// Run settings persisted in the model directory
pub mod config;

/// The iteration loop: fit, sample, checkpoint
pub mod driver;

/// Train / generate entry points
pub mod run_use_case;

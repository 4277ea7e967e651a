// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types for frames and training windows, plus the
// traits the training driver is written against.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Normalised Codec 2 frames and corpus slicing
pub mod frame;

/// Input windows and their targets
pub mod window;

/// Collaborator abstractions used by the training driver
pub mod traits;

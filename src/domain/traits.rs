// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training driver only talks to these traits. The burn
// model, the on-disk checkpoint directory and the Ctrl-C flag
// implement them in Layers 5 and 6; tests implement them with
// in-memory fakes.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::frame::Frame;

// ─── FrameLearner ─────────────────────────────────────────────────────────────
/// A sequence model that can be fitted on the frame dataset and
/// asked to continue a run of frames.
pub trait FrameLearner {
    /// Hook run before each training iteration (learning-rate schedule).
    fn before_iteration(&mut self, iteration: usize);

    /// One full pass over the training data. Returns the mean loss.
    fn fit_epoch(&mut self) -> Result<f64>;

    /// Predict what follows `window`: one frame in next-step mode,
    /// a full window in sequence mode.
    fn predict(&self, window: &[Frame]) -> Result<Vec<Frame>>;

    /// Learning rate the next fit will use.
    fn learning_rate(&self) -> f64;
}

// ─── Checkpointer ─────────────────────────────────────────────────────────────
/// Persists a learner together with the iteration it reached.
pub trait Checkpointer<L> {
    /// Write model structure, weights, optimiser state and the
    /// iteration counter.
    fn save_checkpoint(&self, learner: &L, iteration: usize) -> Result<()>;
}

// ─── SampleSink ───────────────────────────────────────────────────────────────
/// Receives generated frames, already scaled back to bytes.
pub trait SampleSink {
    /// Store the sample produced at `iteration`.
    fn write_sample(&self, iteration: usize, frames: &[Vec<u8>]) -> Result<()>;
}

// ─── ShutdownSignal ───────────────────────────────────────────────────────────
/// Lets an external interrupt stop the loop between iterations.
pub trait ShutdownSignal {
    /// True once an interrupt has arrived.
    fn is_requested(&self) -> bool;
}

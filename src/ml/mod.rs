// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model and optimiser code lives here.
//
//   model.rs     — stacked LSTM + linear frame head
//   trainer.rs   — Adam fit loop over the frame DataLoader,
//                  learning-rate schedule, predict()
//   generator.rs — autoregressive sampling through the
//                  FrameLearner trait (no Burn types)
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Hochreiter & Schmidhuber (1997) LSTM

/// Stacked LSTM frame model
pub mod model;

/// Epoch fitting and prediction
pub mod trainer;

/// Seeded autoregressive sample generation
pub mod generator;

// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From the raw corpus file to tensor batches:
//
//   corpus file
//       │
//       ▼
//   CorpusLoader      → raw bytes
//       │
//       ▼
//   frames_from_corpus + window_frames   (Layer 3)
//       │
//       ▼
//   FrameDataset      → dense X / y buffers, Burn Dataset
//       │
//       ▼
//   FrameBatcher      → [batch, seq, framelen] tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the trainer
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the corpus file
pub mod loader;

/// Assembles windows into the training dataset
pub mod dataset;

/// Stacks samples into tensor batches
pub mod batcher;

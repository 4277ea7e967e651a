// ============================================================
// Layer 4 — Frame Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks a Vec<FrameSample>
// into 3-D float tensors.
//
//   inputs:  [batch, frame_seq_len, framelen]
//   targets: [batch, target_steps,  framelen]
//
// target_steps is 1 in next-step mode and frame_seq_len in
// sequence mode, so the model output and the target always
// line up for the MSE loss.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::FrameSample;

/// A batch of windows ready for the forward pass.
#[derive(Debug, Clone)]
pub struct FrameBatch<B: Backend> {
    pub inputs:  Tensor<B, 3>,
    pub targets: Tensor<B, 3>,
}

#[derive(Clone, Debug)]
pub struct FrameBatcher<B: Backend> {
    device:        B::Device,
    frame_seq_len: usize,
    target_steps:  usize,
    framelen:      usize,
}

impl<B: Backend> FrameBatcher<B> {
    /// `target_steps` is 1 in next-step mode, `frame_seq_len` otherwise.
    pub fn new(device: B::Device, frame_seq_len: usize, target_steps: usize, framelen: usize) -> Self {
        Self { device, frame_seq_len, target_steps, framelen }
    }
}

impl<B: Backend> Batcher<FrameSample, FrameBatch<B>> for FrameBatcher<B> {
    fn batch(&self, items: Vec<FrameSample>) -> FrameBatch<B> {
        let batch_size = items.len();

        let input_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.input.iter().copied())
            .collect();
        let target_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.target.iter().copied())
            .collect();

        let inputs = Tensor::<B, 1>::from_floats(input_flat.as_slice(), &self.device)
            .reshape([batch_size, self.frame_seq_len, self.framelen]);
        let targets = Tensor::<B, 1>::from_floats(target_flat.as_slice(), &self.device)
            .reshape([batch_size, self.target_steps, self.framelen]);

        FrameBatch { inputs, targets }
    }
}

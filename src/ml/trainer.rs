// ============================================================
// Layer 5 — Frame Trainer
// ============================================================
// Wraps the LSTM, its Adam optimiser and a Burn DataLoader
// over the full frame dataset. The training driver calls
// fit_epoch() once per iteration; the generator calls
// predict() on the validation (non-autodiff) copy of the model.
//
// Key points:
//   - Training runs on Autodiff<B> for gradients
//   - model.valid() drops to the inner backend for sampling,
//     which also disables dropout
//   - the learning rate is recomputed in before_iteration()
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{
    batcher::{FrameBatch, FrameBatcher},
    dataset::FrameDataset,
};
use crate::domain::{frame::Frame, traits::FrameLearner};
use crate::ml::model::{FrameLstm, FrameLstmConfig};

/// Step decay: lr = base * decay^(iteration / every_nth).
#[derive(Debug, Clone, Copy)]
pub struct LrSchedule {
    pub base:      f64,
    pub decay:     f64,
    pub every_nth: usize,
}

impl LrSchedule {
    /// Learning rate in effect for `iteration`.
    pub fn rate_at(&self, iteration: usize) -> f64 {
        if self.every_nth == 0 {
            return self.base;
        }
        let steps = (iteration / self.every_nth) as i32;
        self.base * self.decay.powi(steps)
    }
}

/// Model, optimiser and data loader for one training run.
pub struct FrameTrainer<B: AutodiffBackend, O> {
    model:        FrameLstm<B>,
    model_config: FrameLstmConfig,
    optim:        O,
    loader:       Arc<dyn DataLoader<FrameBatch<B>>>,
    schedule:     LrSchedule,
    lr:           f64,
    device:       B::Device,
}

/// Build a trainer around an initialised (or checkpoint-restored) model.
pub fn build_trainer<B: AutodiffBackend>(
    model_config: FrameLstmConfig,
    model:        FrameLstm<B>,
    dataset:      FrameDataset,
    batch_size:   usize,
    schedule:     LrSchedule,
    device:       B::Device,
) -> FrameTrainer<B, impl Optimizer<FrameLstm<B>, B>> {
    let [_, frame_seq_len, framelen] = dataset.x_shape();
    let target_steps = dataset.mode().target_steps(frame_seq_len);

    let batcher = FrameBatcher::<B>::new(device.clone(), frame_seq_len, target_steps, framelen);
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .shuffle(42)
        .num_workers(1)
        .build(dataset);

    let optim = AdamConfig::new().with_epsilon(1e-8).init();

    FrameTrainer {
        model,
        model_config,
        optim,
        loader,
        schedule,
        lr: schedule.base,
        device,
    }
}

impl<B: AutodiffBackend, O: Optimizer<FrameLstm<B>, B>> FrameTrainer<B, O> {
    /// The model being trained (autodiff backend).
    pub fn model(&self) -> &FrameLstm<B> {
        &self.model
    }

    /// Structure the model was built from; saved next to the weights.
    pub fn model_config(&self) -> &FrameLstmConfig {
        &self.model_config
    }

    /// Adam moment estimates, for checkpointing.
    pub fn optimizer_record(&self) -> O::Record {
        self.optim.to_record()
    }

    /// Continue from saved Adam moments instead of cold ones.
    pub fn with_optimizer_record(mut self, record: O::Record) -> Self {
        self.optim = self.optim.load_record(record);
        self
    }
}

impl<B: AutodiffBackend, O: Optimizer<FrameLstm<B>, B>> FrameLearner for FrameTrainer<B, O> {
    fn before_iteration(&mut self, iteration: usize) {
        self.lr = self.schedule.rate_at(iteration);
        tracing::debug!("Iteration {} learning rate {:.3e}", iteration, self.lr);
    }

    fn fit_epoch(&mut self) -> Result<f64> {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in self.loader.iter() {
            let loss = self.model.forward_loss(batch.inputs, batch.targets);
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &self.model);
            self.model = self.optim.step(self.lr, self.model.clone(), grads);
        }

        ensure!(batches > 0, "training dataset produced no batches");
        Ok(loss_sum / batches as f64)
    }

    fn predict(&self, window: &[Frame]) -> Result<Vec<Frame>> {
        let framelen = self.model_config.framelen;
        ensure!(!window.is_empty(), "cannot predict from an empty window");
        ensure!(
            window.iter().all(|f| f.len() == framelen),
            "every frame in the window must have {} values",
            framelen
        );

        let flat: Vec<f32> = window
            .iter()
            .flat_map(|f| f.values().iter().copied())
            .collect();

        let model = self.model.valid();
        let input = Tensor::<B::InnerBackend, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([1, window.len(), framelen]);

        let output: Vec<f32> = model
            .forward(input)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read prediction tensor: {e:?}"))?;

        Ok(output
            .chunks_exact(framelen)
            .map(|values| Frame::from_values(values.to_vec()))
            .collect())
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }
}

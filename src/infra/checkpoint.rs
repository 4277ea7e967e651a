// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Everything the model directory holds between runs:
//
//   model/
//     config.json              ← RunConfig of the last train run
//     model-40.json            ← model structure at iteration 40
//     weights-40.mpk.gz        ← weights at iteration 40
//     optim-40.mpk.gz          ← Adam moments at iteration 40
//     iteration_count.json     ← last saved iteration (resume point)
//
// Weights go through Burn's CompactRecorder (MessagePack +
// gzip). Loading fails if the structure file and weights
// disagree, which is why both are written together.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    optim::Optimizer,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::config::RunConfig;
use crate::domain::traits::Checkpointer;
use crate::ml::model::{FrameLstm, FrameLstmConfig};
use crate::ml::trainer::FrameTrainer;

const CONFIG_FILE:    &str = "config.json";
const ITERATION_FILE: &str = "iteration_count.json";

/// Owns the model directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create model directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Root of the model directory.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn structure_path(&self, iteration: usize) -> PathBuf {
        self.dir.join(format!("model-{iteration}.json"))
    }

    // CompactRecorder appends .mpk.gz itself
    fn weights_path(&self, iteration: usize) -> PathBuf {
        self.dir.join(format!("weights-{iteration}"))
    }

    fn optimizer_path(&self, iteration: usize) -> PathBuf {
        self.dir.join(format!("optim-{iteration}"))
    }

    /// Write the model structure file for `iteration`.
    pub fn save_structure(&self, config: &FrameLstmConfig, iteration: usize) -> Result<()> {
        let path = self.structure_path(iteration);
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write model structure to '{}'", path.display()))?;
        tracing::debug!("Saved model structure: '{}'", path.display());
        Ok(())
    }

    /// Write the weights file for `iteration`.
    pub fn save_weights<B: Backend>(&self, model: &FrameLstm<B>, iteration: usize) -> Result<()> {
        let path = self.weights_path(iteration);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save weights to '{}'", path.display()))?;
        tracing::debug!("Saved weights: iteration {}", iteration);
        Ok(())
    }

    /// Rebuild the model saved at `iteration` on `device`.
    pub fn load_model<B: Backend>(
        &self,
        iteration: usize,
        device:    &B::Device,
    ) -> Result<(FrameLstmConfig, FrameLstm<B>)> {
        let structure = self.structure_path(iteration);
        let json = fs::read_to_string(&structure).with_context(|| {
            format!("Cannot read model structure '{}'", structure.display())
        })?;
        let config: FrameLstmConfig = serde_json::from_str(&json)
            .with_context(|| format!("Malformed model structure '{}'", structure.display()))?;

        let path   = self.weights_path(iteration);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load weights '{}'", path.display()))?;

        tracing::info!("Loaded model from iteration {}", iteration);
        let model = config.init::<B>(device).load_record(record);
        Ok((config, model))
    }

    /// Write the optimiser state of `trainer` for `iteration`.
    pub fn save_optimizer<B, O>(&self, trainer: &FrameTrainer<B, O>, iteration: usize) -> Result<()>
    where
        B: AutodiffBackend,
        O: Optimizer<FrameLstm<B>, B>,
    {
        let path = self.optimizer_path(iteration);
        <CompactRecorder as Recorder<B>>::record(
            &CompactRecorder::new(),
            trainer.optimizer_record(),
            path.clone(),
        )
        .with_context(|| format!("Failed to save optimizer state to '{}'", path.display()))?;
        tracing::debug!("Saved optimizer state: iteration {}", iteration);
        Ok(())
    }

    /// Hand the optimiser state saved at `iteration` to `trainer`.
    /// Checkpoints written without one leave the optimiser cold.
    pub fn restore_optimizer<B, O>(
        &self,
        trainer:   FrameTrainer<B, O>,
        iteration: usize,
        device:    &B::Device,
    ) -> Result<FrameTrainer<B, O>>
    where
        B: AutodiffBackend,
        O: Optimizer<FrameLstm<B>, B>,
    {
        let path = self.optimizer_path(iteration);
        if !path.with_extension("mpk.gz").exists() {
            tracing::warn!("No optimizer state for iteration {}, starting Adam cold", iteration);
            return Ok(trainer);
        }
        let record: O::Record = <CompactRecorder as Recorder<B>>::load(
            &CompactRecorder::new(),
            path.clone(),
            device,
        )
        .with_context(|| format!("Cannot load optimizer state '{}'", path.display()))?;
        tracing::info!("Restored optimizer state from iteration {}", iteration);
        Ok(trainer.with_optimizer_record(record))
    }

    /// Record `iteration` as the resume point.
    pub fn write_iteration_count(&self, iteration: usize) -> Result<()> {
        let path = self.dir.join(ITERATION_FILE);
        fs::write(&path, serde_json::to_string(&iteration)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        Ok(())
    }

    /// `None` when no checkpoint has been saved yet.
    pub fn read_iteration_count(&self) -> Result<Option<usize>> {
        let path = self.dir.join(ITERATION_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        let iteration = serde_json::from_str::<usize>(s.trim())
            .with_context(|| format!("Malformed iteration counter in '{}'", path.display()))?;
        Ok(Some(iteration))
    }

    /// Persist the resolved run config as `config.json`.
    pub fn save_config(&self, cfg: &RunConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }

    /// `None` when the directory has no config yet; malformed JSON is an error.
    pub fn load_config(&self) -> Result<Option<RunConfig>> {
        let path = self.dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let cfg = serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))?;
        Ok(Some(cfg))
    }
}

impl<B, O> Checkpointer<FrameTrainer<B, O>> for CheckpointManager
where
    B: AutodiffBackend,
    O: Optimizer<FrameLstm<B>, B>,
{
    fn save_checkpoint(&self, trainer: &FrameTrainer<B, O>, iteration: usize) -> Result<()> {
        tracing::info!("Saving model structure and weights for iteration {}", iteration);
        self.save_structure(trainer.model_config(), iteration)?;
        self.save_weights(trainer.model(), iteration)?;
        self.save_optimizer(trainer, iteration)?;
        self.write_iteration_count(iteration)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::data::dataset::FrameDataset;
    use crate::domain::{
        frame::frames_from_corpus,
        traits::FrameLearner,
        window::{window_frames, TargetMode},
    };
    use crate::ml::trainer::{build_trainer, LrSchedule};

    type TestBackend = NdArray;
    type TrainBackend = Autodiff<NdArray>;

    fn small_dataset() -> FrameDataset {
        let corpus: Vec<u8> = (0..160).map(|i| ((i % 5) * 20) as u8).collect();
        let frames  = frames_from_corpus(&corpus, 4);
        let windows = window_frames(frames.len(), 4, 2, TargetMode::NextStep);
        FrameDataset::assemble(&frames, &windows, 4, 4, TargetMode::NextStep)
    }

    fn schedule() -> LrSchedule {
        LrSchedule { base: 1e-2, decay: 1.0, every_nth: 0 }
    }

    #[test]
    fn test_iteration_counter_absent_then_present() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = CheckpointManager::new(dir.path()).unwrap();
        assert_eq!(mgr.read_iteration_count().unwrap(), None);
        mgr.write_iteration_count(30).unwrap();
        assert_eq!(mgr.read_iteration_count().unwrap(), Some(30));
    }

    #[test]
    fn test_malformed_counter_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = CheckpointManager::new(dir.path()).unwrap();
        fs::write(dir.path().join(ITERATION_FILE), "not a number").unwrap();
        assert!(mgr.read_iteration_count().is_err());
    }

    #[test]
    fn test_config_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = CheckpointManager::new(dir.path()).unwrap();
        assert!(mgr.load_config().unwrap().is_none());

        let cfg = RunConfig { frame_seq_len: 17, ..RunConfig::default() };
        mgr.save_config(&cfg).unwrap();
        let loaded = mgr.load_config().unwrap().unwrap();
        assert_eq!(loaded.frame_seq_len, 17);
    }

    #[test]
    fn test_model_reloads_with_same_outputs() {
        let dir    = tempfile::tempdir().unwrap();
        let mgr    = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        let cfg   = FrameLstmConfig::new(3, 5, 2);
        let model = cfg.init::<TestBackend>(&device);
        mgr.save_structure(&cfg, 7).unwrap();
        mgr.save_weights(&model, 7).unwrap();

        let (loaded_cfg, loaded) = mgr.load_model::<TestBackend>(7, &device).unwrap();
        assert_eq!(loaded_cfg.hidden_size, 5);
        assert_eq!(loaded_cfg.num_layers, 2);

        let input = Tensor::<TestBackend, 3>::ones([1, 4, 3], &device);
        let a = model.forward(input.clone()).into_data().to_vec::<f32>().unwrap();
        let b = loaded.forward(input).into_data().to_vec::<f32>().unwrap();
        // CompactRecorder stores half precision
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 5e-2, "{} vs {}", x, y);
        }
    }

    #[test]
    fn test_checkpoint_writes_optimizer_state_and_restores_it() {
        let dir    = tempfile::tempdir().unwrap();
        let mgr    = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        let cfg   = FrameLstmConfig::new(4, 6, 1);
        let model = cfg.init::<TrainBackend>(&device);
        let mut trainer = build_trainer(cfg, model, small_dataset(), 8, schedule(), device);
        trainer.fit_epoch().unwrap();
        mgr.save_checkpoint(&trainer, 3).unwrap();

        assert!(dir.path().join("optim-3.mpk.gz").exists());
        assert!(dir.path().join("weights-3.mpk.gz").exists());
        assert_eq!(mgr.read_iteration_count().unwrap(), Some(3));

        let (cfg, model) = mgr.load_model::<TrainBackend>(3, &device).unwrap();
        let resumed = build_trainer(cfg, model, small_dataset(), 8, schedule(), device);
        let mut resumed = mgr.restore_optimizer(resumed, 3, &device).unwrap();
        assert!(resumed.fit_epoch().unwrap().is_finite());
    }

    #[test]
    fn test_missing_optimizer_state_keeps_trainer() {
        let dir    = tempfile::tempdir().unwrap();
        let mgr    = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        let cfg     = FrameLstmConfig::new(4, 6, 1);
        let model   = cfg.init::<TrainBackend>(&device);
        let trainer = build_trainer(cfg, model, small_dataset(), 8, schedule(), device);
        let mut trainer = mgr.restore_optimizer(trainer, 9, &device).unwrap();
        assert!(trainer.fit_epoch().unwrap().is_finite());
    }

    #[test]
    fn test_missing_weights_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = CheckpointManager::new(dir.path()).unwrap();
        assert!(mgr.load_model::<TestBackend>(3, &Default::default()).is_err());
    }
}

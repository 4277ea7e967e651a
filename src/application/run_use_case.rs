// ============================================================
// Layer 2 — RunUseCase
// ============================================================
// Shared setup for both modes, then one branch:
//
//   Step 1: Load / override / validate the run config   (Layer 6)
//   Step 2: Read the resume counter                     (Layer 6)
//   Step 3: Load the corpus and cut it into frames      (Layers 4, 3)
//   Step 4: Window the frames and assemble the dataset  (Layers 3, 4)
//   Step 5: Define a fresh model or load the checkpoint (Layers 5, 6)
//           (a resumed train run also gets its Adam state back)
//   Step 6: Build the generator and sample writer       (Layers 5, 6)
//   Step 7: Generate once, or run the training driver
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, ensure, Context, Result};
use std::path::PathBuf;

use crate::application::{
    config::RunConfig,
    driver::{DriverOutcome, Schedule, TrainingDriver},
};
use burn::{prelude::*, tensor::backend::AutodiffBackend};

use crate::data::{dataset::FrameDataset, loader::CorpusLoader};
use crate::domain::{
    frame::{frame_count, frames_from_corpus},
    traits::ShutdownSignal,
    window::window_frames,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    samples::SampleWriter,
    shutdown::ShutdownFlag,
};
use crate::ml::{
    generator::{Generator, SeedStart},
    model::{FrameLstm, FrameLstmConfig},
    trainer::build_trainer,
};

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Fit the model, sampling and checkpointing on schedule.
    Train,
    /// Load the latest checkpoint, write one sample, exit.
    Generate,
}

/// Settings that come from the command line rather than config.json.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub model_dir:      PathBuf,
    pub testdata:       Option<PathBuf>,
    pub seed_start:     SeedStart,
    pub generate_len:   Option<usize>,
    pub num_iterations: Option<usize>,
}

/// What a run did, for the caller to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// First iteration of the schedule after applying the resume counter.
    pub start_iteration: usize,
    /// Checkpoint the model was loaded from, if any.
    pub loaded_from:     Option<usize>,
    /// Driver result; `None` in generate mode.
    pub outcome:         Option<DriverOutcome>,
}

/// One invocation of `train` or `generate`.
pub struct RunUseCase {
    mode:    RunMode,
    options: RunOptions,
}

impl RunUseCase {
    pub fn new(mode: RunMode, options: RunOptions) -> Self {
        Self { mode, options }
    }

    /// Run on the WGPU device. Train mode installs the signal handler.
    pub fn execute(&self) -> Result<RunSummary> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        let shutdown = match self.mode {
            RunMode::Train    => ShutdownFlag::install()?,
            RunMode::Generate => ShutdownFlag::default(),
        };
        self.execute_on::<TrainBackend>(device, &shutdown)
    }

    /// The whole run on any autodiff backend.
    pub fn execute_on<B: AutodiffBackend>(
        &self,
        device:   B::Device,
        shutdown: &dyn ShutdownSignal,
    ) -> Result<RunSummary> {
        let opts = &self.options;

        // ── Step 1: Config ────────────────────────────────────────────────────
        let ckpt    = CheckpointManager::new(&opts.model_dir)?;
        let mut cfg = ckpt.load_config()?.unwrap_or_default();
        if let Some(n) = opts.generate_len   { cfg.generate_len   = n; }
        if let Some(n) = opts.num_iterations { cfg.num_iterations = n; }
        cfg.resolve();
        cfg.validate().context("Invalid run configuration")?;

        // ── Step 2: Resume counter ────────────────────────────────────────────
        let counter  = ckpt.read_iteration_count()?;
        let schedule = Schedule::from_config(&cfg).resume_from(counter);
        cfg.start_iteration = schedule.start_iteration;
        if let Some(c) = counter {
            tracing::info!("Found iteration counter {}, resuming from iteration {}", c, schedule.start_iteration);
        }

        let testdata = match (&opts.testdata, &cfg.test_data_fn) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) => PathBuf::from(path),
            (None, None) => bail!("No corpus given: pass --testdata or set test_data_fn in config.json"),
        };
        cfg.test_data_fn = Some(testdata.to_string_lossy().into_owned());

        // ── Step 3: Corpus → frames ───────────────────────────────────────────
        let corpus = CorpusLoader::new(&testdata).load()?;
        tracing::info!("Corpus length (frames): {}", frame_count(corpus.len(), cfg.framelen));
        tracing::info!("Scanning test data into frames and frame sequences");
        let frames = frames_from_corpus(&corpus, cfg.framelen);
        tracing::info!("Actual number of frames: {}", frames.len());
        cfg.log_attrs();

        // ── Step 4: Windows → dataset ─────────────────────────────────────────
        let mode    = cfg.target_mode();
        let windows = window_frames(frames.len(), cfg.frame_seq_len, cfg.seq_step(), mode);
        let dataset = FrameDataset::assemble(&frames, &windows, cfg.frame_seq_len, cfg.framelen, mode);
        tracing::info!("Dataset X shape {:?}, y shape {:?}", dataset.x_shape(), dataset.y_shape());
        if self.mode == RunMode::Train {
            ensure!(
                dataset.sample_count() > 0,
                "Corpus of {} frames is too short for frame_seq_len {} (needs more than {} frames)",
                frames.len(),
                cfg.frame_seq_len,
                2 * cfg.frame_seq_len
            );
            ckpt.save_config(&cfg)?;
        }

        // ── Step 5: Model ─────────────────────────────────────────────────────
        let (model_cfg, model) = define_or_load_model::<B>(&ckpt, &cfg, counter, self.mode, &device)?;
        let mut trainer = build_trainer(
            model_cfg, model, dataset, cfg.fit_batch_size, cfg.lr_schedule(), device.clone(),
        );
        if let (RunMode::Train, Some(iteration)) = (self.mode, counter) {
            trainer = ckpt.restore_optimizer(trainer, iteration, &device)?;
        }

        // ── Step 6: Generator ─────────────────────────────────────────────────
        let mut generator = Generator::new(frames, cfg.seed_seq_len, cfg.generate_len);
        generator.set_seed_start(opts.seed_start);
        let sink = SampleWriter::new(ckpt.dir().join("samples"))?;

        // ── Step 7: Mode branch ───────────────────────────────────────────────
        let outcome = match self.mode {
            RunMode::Generate => {
                tracing::info!("Generating samples");
                generator.generate(&trainer, &sink, 0)?;
                None
            }
            RunMode::Train => {
                let metrics = MetricsLogger::new(ckpt.dir())?;
                let driver  = TrainingDriver {
                    schedule,
                    generator:    &generator,
                    sink:         &sink,
                    checkpointer: &ckpt,
                    shutdown,
                    metrics:      Some(&metrics),
                };
                let outcome = driver.run(&mut trainer)?;
                match outcome {
                    DriverOutcome::Completed { last_iteration } => {
                        tracing::info!("Training complete (last iteration {:?})", last_iteration);
                    }
                    DriverOutcome::Interrupted { next_iteration } => {
                        tracing::warn!("Training interrupted before iteration {}", next_iteration);
                    }
                }
                Some(outcome)
            }
        };

        Ok(RunSummary {
            start_iteration: schedule.start_iteration,
            loaded_from:     counter,
            outcome,
        })
    }
}

/// Load the checkpointed model when a counter exists, otherwise build
/// a fresh one from the config. Generate mode requires a checkpoint.
fn define_or_load_model<B: Backend>(
    ckpt:    &CheckpointManager,
    cfg:     &RunConfig,
    counter: Option<usize>,
    mode:    RunMode,
    device:  &B::Device,
) -> Result<(FrameLstmConfig, FrameLstm<B>)> {
    match counter {
        Some(iteration) => {
            let (model_cfg, model) = ckpt.load_model::<B>(iteration, device)?;
            ensure!(
                model_cfg.framelen == cfg.framelen && model_cfg.learn_next_step == cfg.learn_next_step,
                "Checkpoint at iteration {} was trained with framelen={} learn_next_step={}, config has framelen={} learn_next_step={}",
                iteration, model_cfg.framelen, model_cfg.learn_next_step, cfg.framelen, cfg.learn_next_step
            );
            Ok((model_cfg, model))
        }
        None if mode == RunMode::Generate => {
            bail!("No saved model in '{}'; run 'train' first", ckpt.dir().display())
        }
        None => {
            let model_cfg = cfg.model_config();
            let model     = model_cfg.init::<B>(device);
            tracing::info!(
                "Defined new model: {} LSTM layers, hidden_size={}",
                model_cfg.num_layers, model_cfg.hidden_size
            );
            Ok((model_cfg, model))
        }
    }
}

// ============================================================
// Layer 2 — Run Configuration
// ============================================================
// Every setting for a run, loaded from <model_dir>/config.json
// when present and written back at the start of each training
// run so the directory always describes how its checkpoints
// were produced. Missing keys fall back to the defaults below.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::domain::window::TargetMode;
use crate::ml::{model::FrameLstmConfig, trainer::LrSchedule};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Bytes per Codec 2 frame
    pub framelen:             usize,
    /// Frames per training window
    pub frame_seq_len:        usize,
    /// Frames between window starts; None or 0 means frame_seq_len
    pub seq_step:             Option<usize>,
    /// Frames of corpus used to seed generation
    pub seed_seq_len:         usize,
    pub fit_batch_size:       usize,
    pub start_iteration:      usize,
    pub num_iterations:       usize,
    pub gen_every_nth:        usize,
    pub save_model_every_nth: usize,
    /// true: predict the next frame; false: predict the next window
    pub learn_next_step:      bool,
    pub test_data_fn:         Option<String>,
    /// Frames written per generated sample
    pub generate_len:         usize,
    pub hidden_size:          usize,
    pub num_layers:           usize,
    pub dropout:              f64,
    pub learning_rate:        f64,
    pub lr_decay:             f64,
    pub lr_decay_every_nth:   usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            framelen:             13,
            frame_seq_len:        50,
            seq_step:             None,
            seed_seq_len:         50,
            fit_batch_size:       200,
            start_iteration:      0,
            num_iterations:       1000,
            gen_every_nth:        10,
            save_model_every_nth: 10,
            learn_next_step:      true,
            test_data_fn:         None,
            generate_len:         500,
            hidden_size:          256,
            num_layers:           3,
            dropout:              0.0,
            learning_rate:        1e-3,
            lr_decay:             1.0,
            lr_decay_every_nth:   100,
        }
    }
}

impl RunConfig {
    /// Effective window step.
    pub fn seq_step(&self) -> usize {
        match self.seq_step {
            Some(step) if step > 0 => step,
            _ => self.frame_seq_len,
        }
    }

    /// Pin derived values so the saved config records them.
    pub fn resolve(&mut self) {
        self.seq_step = Some(self.seq_step());
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.framelen > 0,             "framelen must be greater than zero");
        ensure!(self.frame_seq_len > 0,        "frame_seq_len must be greater than zero");
        ensure!(self.seed_seq_len > 0,         "seed_seq_len must be greater than zero");
        ensure!(self.fit_batch_size > 0,       "fit_batch_size must be greater than zero");
        ensure!(self.gen_every_nth > 0,        "gen_every_nth must be greater than zero");
        ensure!(self.save_model_every_nth > 0, "save_model_every_nth must be greater than zero");
        ensure!(self.hidden_size > 0,          "hidden_size must be greater than zero");
        ensure!(self.num_layers > 0,           "num_layers must be greater than zero");
        ensure!(
            (0.0..1.0).contains(&self.dropout),
            "dropout must be in [0, 1), got {}",
            self.dropout
        );
        ensure!(self.learning_rate > 0.0, "learning_rate must be positive");
        Ok(())
    }

    /// Next-step or sequence targets, from `learn_next_step`.
    pub fn target_mode(&self) -> TargetMode {
        TargetMode::from_learn_next_step(self.learn_next_step)
    }

    /// Network structure for a freshly defined model.
    pub fn model_config(&self) -> FrameLstmConfig {
        FrameLstmConfig::new(self.framelen, self.hidden_size, self.num_layers)
            .with_dropout(self.dropout)
            .with_learn_next_step(self.learn_next_step)
    }

    /// Learning-rate schedule derived from the three lr settings.
    pub fn lr_schedule(&self) -> LrSchedule {
        LrSchedule {
            base:      self.learning_rate,
            decay:     self.lr_decay,
            every_nth: self.lr_decay_every_nth,
        }
    }

    /// Log every setting, one line each.
    pub fn log_attrs(&self) {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => {
                for (key, value) in map {
                    tracing::info!("config {} = {}", key, value);
                }
            }
            _ => tracing::info!("config {:?}", self),
        }
    }
}

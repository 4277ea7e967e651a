// ============================================================
// Layer 5 — Sample Generator
// ============================================================
// Autoregressive sampling:
//
//   seed = corpus frames [start .. start + seed_seq_len]
//   loop:
//     prediction = learner.predict(last seed_seq_len frames)
//     append prediction to the running window and the output
//   until generate_len frames have been produced
//
// In next-step mode each predict() adds one frame; in sequence
// mode it adds a whole window. Output frames are scaled back to
// bytes and handed to a SampleSink.

use anyhow::{ensure, Result};
use rand::Rng;

use crate::domain::{
    frame::Frame,
    traits::{FrameLearner, SampleSink},
};

/// Where in the corpus the seed window begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStart {
    At(usize),
    Random,
}

impl std::str::FromStr for SeedStart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("random") {
            return Ok(SeedStart::Random);
        }
        s.parse::<usize>()
            .map(SeedStart::At)
            .map_err(|_| format!("seed start must be a frame index or 'random', got '{s}'"))
    }
}

/// Seeds the model with real frames and lets it continue on its own output.
pub struct Generator {
    all_frames:   Vec<Frame>,
    seed_seq_len: usize,
    generate_len: usize,
    seed_start:   SeedStart,
}

impl Generator {
    pub fn new(all_frames: Vec<Frame>, seed_seq_len: usize, generate_len: usize) -> Self {
        Self {
            all_frames,
            seed_seq_len,
            generate_len,
            seed_start: SeedStart::At(0),
        }
    }

    /// Where the next sample takes its seed window from.
    pub fn set_seed_start(&mut self, seed_start: SeedStart) {
        self.seed_start = seed_start;
    }

    /// Resolve the seed position, clamped so the seed window fits.
    fn seed_index(&self) -> usize {
        let max_start = self.all_frames.len().saturating_sub(self.seed_seq_len);
        match self.seed_start {
            SeedStart::At(i) => i.min(max_start),
            SeedStart::Random => rand::thread_rng().gen_range(0..=max_start),
        }
    }

    /// Sample `generate_len` frames from the learner.
    pub fn sample<L: FrameLearner>(&self, learner: &L) -> Result<Vec<Frame>> {
        ensure!(self.seed_seq_len > 0, "seed_seq_len must be greater than zero");
        ensure!(
            self.all_frames.len() >= self.seed_seq_len,
            "corpus has {} frames, fewer than seed_seq_len ({})",
            self.all_frames.len(),
            self.seed_seq_len
        );

        let start = self.seed_index();
        tracing::debug!("Seeding generator from frame {}", start);
        let mut window: Vec<Frame> = self.all_frames[start..start + self.seed_seq_len].to_vec();
        let mut output: Vec<Frame> = Vec::with_capacity(self.generate_len);

        while output.len() < self.generate_len {
            let predicted = learner.predict(&window)?;
            ensure!(!predicted.is_empty(), "model returned no frames");

            window.extend(predicted.iter().cloned());
            let excess = window.len() - self.seed_seq_len;
            window.drain(..excess);

            output.extend(predicted);
        }

        output.truncate(self.generate_len);
        Ok(output)
    }

    /// Sample and hand the byte frames to `sink`.
    pub fn generate<L: FrameLearner, S: SampleSink + ?Sized>(
        &self,
        learner:   &L,
        sink:      &S,
        iteration: usize,
    ) -> Result<()> {
        let frames = self.sample(learner)?;
        let bytes: Vec<Vec<u8>> = frames.iter().map(Frame::to_bytes).collect();
        sink.write_sample(iteration, &bytes)?;
        tracing::info!("Generated {} frames for iteration {}", bytes.len(), iteration);
        Ok(())
    }
}

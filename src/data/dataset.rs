use burn::data::dataset::Dataset;

use crate::domain::{
    frame::Frame,
    window::{TargetMode, Window},
};

/// One training example, flattened row-major.
/// `input` is frame_seq_len * framelen values; `target` is
/// target_steps * framelen values.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub input:  Vec<f32>,
    pub target: Vec<f32>,
}

/// Dense X / y buffers for the whole corpus.
///
/// X has shape (N, frame_seq_len, framelen). y has shape
/// (N, framelen) in next-step mode and (N, frame_seq_len, framelen)
/// in sequence mode.
pub struct FrameDataset {
    x:             Vec<f32>,
    y:             Vec<f32>,
    num_sequences: usize,
    frame_seq_len: usize,
    framelen:      usize,
    mode:          TargetMode,
}

impl FrameDataset {
    /// Pack windows into buffers allocated to the exact window count.
    pub fn assemble(
        frames:        &[Frame],
        windows:       &[Window],
        frame_seq_len: usize,
        framelen:      usize,
        mode:          TargetMode,
    ) -> Self {
        let num_sequences = windows.len();
        let input_len     = frame_seq_len * framelen;
        let target_len    = mode.target_steps(frame_seq_len) * framelen;

        let mut x = vec![0.0f32; num_sequences * input_len];
        let mut y = vec![0.0f32; num_sequences * target_len];

        for (i, window) in windows.iter().enumerate() {
            let x_row = &mut x[i * input_len..(i + 1) * input_len];
            for (slot, frame) in x_row.chunks_exact_mut(framelen).zip(&frames[window.input.clone()]) {
                slot.copy_from_slice(frame.values());
            }
            let y_row = &mut y[i * target_len..(i + 1) * target_len];
            for (slot, frame) in y_row.chunks_exact_mut(framelen).zip(&frames[window.target.clone()]) {
                slot.copy_from_slice(frame.values());
            }
        }

        tracing::info!("Number of frame sequences: {}", num_sequences);
        Self { x, y, num_sequences, frame_seq_len, framelen, mode }
    }

    /// `[N, frame_seq_len, framelen]`
    pub fn x_shape(&self) -> [usize; 3] {
        [self.num_sequences, self.frame_seq_len, self.framelen]
    }

    /// `[N, framelen]` for next-step targets, `[N, frame_seq_len, framelen]` otherwise.
    pub fn y_shape(&self) -> Vec<usize> {
        match self.mode {
            TargetMode::NextStep => vec![self.num_sequences, self.framelen],
            TargetMode::Sequence => vec![self.num_sequences, self.frame_seq_len, self.framelen],
        }
    }

    pub fn sample_count(&self) -> usize {
        self.num_sequences
    }

    /// Target layout the dataset was assembled with.
    pub fn mode(&self) -> TargetMode {
        self.mode
    }

    fn input_len(&self) -> usize {
        self.frame_seq_len * self.framelen
    }

    fn target_len(&self) -> usize {
        self.mode.target_steps(self.frame_seq_len) * self.framelen
    }
}

impl Dataset<FrameSample> for FrameDataset {
    fn get(&self, index: usize) -> Option<FrameSample> {
        if index >= self.num_sequences {
            return None;
        }
        let (il, tl) = (self.input_len(), self.target_len());
        Some(FrameSample {
            input:  self.x[index * il..(index + 1) * il].to_vec(),
            target: self.y[index * tl..(index + 1) * tl].to_vec(),
        })
    }

    fn len(&self) -> usize {
        self.num_sequences
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{frame::frames_from_corpus, window::window_frames};

    fn build(mode: TargetMode) -> (Vec<Frame>, FrameDataset) {
        let corpus: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();
        let frames  = frames_from_corpus(&corpus, 10);
        let windows = window_frames(frames.len(), 5, 5, mode);
        let ds      = FrameDataset::assemble(&frames, &windows, 5, 10, mode);
        (frames, ds)
    }

    #[test]
    fn test_next_step_shapes() {
        let (_, ds) = build(TargetMode::NextStep);
        assert_eq!(ds.x_shape(), [18, 5, 10]);
        assert_eq!(ds.y_shape(), vec![18, 10]);
        assert_eq!(ds.len(), 18);
    }

    #[test]
    fn test_sequence_shapes() {
        let (_, ds) = build(TargetMode::Sequence);
        assert_eq!(ds.x_shape(), [18, 5, 10]);
        assert_eq!(ds.y_shape(), vec![18, 5, 10]);
    }

    #[test]
    fn test_sample_contents_follow_windows() {
        let (frames, ds) = build(TargetMode::NextStep);
        let sample = ds.get(2).unwrap();
        // window 2 starts at frame 10; its target is frame 15
        assert_eq!(&sample.input[..10], frames[10].values());
        assert_eq!(&sample.input[40..], frames[14].values());
        assert_eq!(sample.target.as_slice(), frames[15].values());
    }

    #[test]
    fn test_sequence_target_is_following_window() {
        let (frames, ds) = build(TargetMode::Sequence);
        let sample = ds.get(0).unwrap();
        assert_eq!(sample.target.len(), 50);
        assert_eq!(&sample.target[..10], frames[5].values());
        assert_eq!(&sample.target[40..], frames[9].values());
    }

    #[test]
    fn test_out_of_range_index_is_none() {
        let (_, ds) = build(TargetMode::NextStep);
        assert!(ds.get(18).is_none());
    }
}

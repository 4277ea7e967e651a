// ============================================================
// Layer 3 — Frame Windowing
// ============================================================
// Slices the frame list into fixed-length input windows, each
// paired with a training target that sits immediately after it.
//
// Example with frame_seq_len=3, seq_step=2, 10 frames:
//   stop bound = 10 - 2*3 = 4  → starts 0, 2
//   window 0: frames 0..3   target: frame 3   (next-step)
//                            target: 3..6     (sequence)
//   window 1: frames 2..5   target: frame 5 / 5..8
//
// The last 2*frame_seq_len frames never start a window, so a
// sequence-mode target always fits inside the corpus.
//
// Reference: Rust Book §8 (Slices), §13 (Iterators)

use std::ops::Range;

/// What the model learns to predict for each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// The single frame following the window.
    NextStep,
    /// The whole window of frames following the window.
    Sequence,
}

impl TargetMode {
    /// Map the config flag onto a mode.
    pub fn from_learn_next_step(learn_next_step: bool) -> Self {
        if learn_next_step {
            TargetMode::NextStep
        } else {
            TargetMode::Sequence
        }
    }

    /// Number of frames in one target.
    pub fn target_steps(&self, frame_seq_len: usize) -> usize {
        match self {
            TargetMode::NextStep => 1,
            TargetMode::Sequence => frame_seq_len,
        }
    }
}

/// Index ranges into the frame list for one training example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub input:  Range<usize>,
    pub target: Range<usize>,
}

/// Start indices for every window: range(0, n - 2*len, step).
pub fn window_starts(num_frames: usize, frame_seq_len: usize, seq_step: usize) -> Vec<usize> {
    let stop = num_frames.saturating_sub(2 * frame_seq_len);
    (0..stop).step_by(seq_step.max(1)).collect()
}

/// Build every window and its target range.
pub fn window_frames(
    num_frames:    usize,
    frame_seq_len: usize,
    seq_step:      usize,
    mode:          TargetMode,
) -> Vec<Window> {
    let target_len = mode.target_steps(frame_seq_len);
    window_starts(num_frames, frame_seq_len, seq_step)
        .into_iter()
        .map(|i| {
            let j = i + frame_seq_len;
            Window {
                input:  i..j,
                target: j..j + target_len,
            }
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_example_counts() {
        // 1000 bytes / framelen 10 = 100 frames
        let windows = window_frames(100, 5, 5, TargetMode::NextStep);
        assert_eq!(windows.len(), 18);
        assert_eq!(windows.first().unwrap().input, 0..5);
        assert_eq!(windows.last().unwrap().input, 85..90);
        assert_eq!(windows.last().unwrap().target, 90..91);
    }

    #[test]
    fn test_count_matches_range_semantics() {
        for &(n, len, step) in &[(100usize, 5usize, 5usize), (100, 5, 3), (37, 4, 1), (21, 10, 7), (20, 10, 1)] {
            let expected = (0..n.saturating_sub(2 * len)).step_by(step).count();
            assert_eq!(window_frames(n, len, step, TargetMode::Sequence).len(), expected);
        }
    }

    #[test]
    fn test_every_window_is_full_and_in_bounds() {
        let n = 53;
        for mode in [TargetMode::NextStep, TargetMode::Sequence] {
            for w in window_frames(n, 6, 4, mode) {
                assert_eq!(w.input.len(), 6);
                assert_eq!(w.target.start, w.input.end);
                assert_eq!(w.target.len(), mode.target_steps(6));
                assert!(w.target.end <= n);
            }
        }
    }

    #[test]
    fn test_short_corpus_gives_no_windows() {
        assert!(window_frames(10, 5, 1, TargetMode::NextStep).is_empty());
        assert!(window_frames(3, 5, 1, TargetMode::NextStep).is_empty());
    }

    #[test]
    fn test_one_frame_past_threshold_gives_one_window() {
        let windows = window_frames(11, 5, 5, TargetMode::Sequence);
        assert_eq!(windows, vec![Window { input: 0..5, target: 5..10 }]);
    }
}

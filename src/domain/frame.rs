// ============================================================
// Layer 3 — Frame Domain Type
// ============================================================
// A Codec 2 corpus is a flat run of bytes; every `framelen`
// bytes make up one frame of encoder parameters. The network
// works on floats, so each byte is divided by a fixed scale
// on the way in and multiplied back on the way out.
//
//   bytes:  [ 12 | 200 | 7 | ... ]   (framelen bytes)
//   frame:  [ 0.094, 1.575, 0.055, ... ]
//
// Reference: Rust Book §5 (Structs), §8 (Slices)

/// Divisor applied to each raw byte of a frame.
pub const FRAME_PROPERTY_SCALEUP: f32 = 127.0;

/// One normalised frame of codec parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    values: Vec<f32>,
}

impl Frame {
    /// Normalise a raw byte frame.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let values = bytes
            .iter()
            .map(|&b| b as f32 / FRAME_PROPERTY_SCALEUP)
            .collect();
        Self { values }
    }

    /// Wrap model output values that are already in normalised space.
    pub fn from_values(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Normalised values, one per codec parameter.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of parameters in the frame (`framelen`).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Scale back to byte space. Predictions can land outside the
    /// byte range, so values are rounded and clamped to 0..=255.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.values
            .iter()
            .map(|&v| (v * FRAME_PROPERTY_SCALEUP).round().clamp(0.0, 255.0) as u8)
            .collect()
    }
}

/// Number of whole frames in a corpus. Trailing bytes that do not
/// fill a frame are ignored.
pub fn frame_count(corpus_len: usize, framelen: usize) -> usize {
    if framelen == 0 {
        return 0;
    }
    corpus_len / framelen
}

/// Split a corpus into normalised frames.
pub fn frames_from_corpus(corpus: &[u8], framelen: usize) -> Vec<Frame> {
    let num_frames = frame_count(corpus.len(), framelen);
    // chunks_exact never yields the short tail, so no byte past
    // num_frames * framelen is read
    corpus
        .chunks_exact(framelen.max(1))
        .take(num_frames)
        .map(Frame::from_bytes)
        .collect()
}

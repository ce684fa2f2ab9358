//! Error types for the animation codec.
//!
//! Every failure is terminal for the call that raises it. A malformed stream
//! means a corrupt asset or a format mismatch between producer and consumer,
//! so nothing here is retried or partially recovered.

use thiserror::Error;

/// Top-level error type for all codec operations.
///
/// Each variant corresponds to one failure domain:
/// - Config: header fields or geometry out of range
/// - Encode: a frame that breaks the stream's invariants
/// - Bit I/O: truncated input, or a value too wide for its field
/// - Framing: a run that does not fit the current frame
/// - Trailing data: bytes left over after the declared frames
#[derive(Debug, Error)]
pub enum Error {
    /// Header field out of range, or palette length mismatch
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Frame rejected by the encoder
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Bit-level read/write failure (e.g. input exhausted mid-field)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Run sequence does not tile the frame
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Unconsumed bytes after the declared frame count
    #[error("{remaining} trailing bytes after {frames} frames")]
    TrailingData { frames: usize, remaining: usize },
}

impl Error {
    /// True when the input ended in the middle of a field.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::BitIo(BitIoError::UnexpectedEof { .. }))
    }
}

/// Header and geometry validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Frame count must be in 1..=255
    #[error("frame count {0} out of range 1..=255")]
    FrameCount(u32),

    /// Interval must be in 1..=255
    #[error("interval {0} out of range 1..=255")]
    Interval(u32),

    /// Bits per pixel must be in 1..=7
    #[error("bits per pixel {0} out of range 1..=7")]
    Bpp(u32),

    /// Palette must hold exactly 2^bpp RGB triples
    #[error("palette length {actual} does not match {expected} (3 * 2^bpp)")]
    PaletteLength { expected: usize, actual: usize },

    /// Width and height must both be non-zero
    #[error("invalid geometry {width}x{height}")]
    Geometry { width: usize, height: usize },
}

/// Encoder invariant violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Frame length differs from width * height
    #[error("frame length mismatch: expected {expected}, got {actual}")]
    FrameLength { expected: usize, actual: usize },

    /// Pixel index does not fit in bpp bits
    #[error("pixel {value} at offset {offset} does not fit in {bpp} bits")]
    PixelOutOfRange { offset: usize, value: u8, bpp: u8 },

    /// A frame was written before the header
    #[error("header must be written before any frame")]
    HeaderNotWritten,

    /// The header was written twice
    #[error("header already written")]
    HeaderAlreadyWritten,

    /// More frames than the header declared
    #[error("header declares {declared} frames, refusing frame {index}")]
    TooManyFrames { declared: usize, index: usize },

    /// Stream finished before every declared frame was written
    #[error("header declares {declared} frames, only {written} written")]
    FrameCountMismatch { declared: usize, written: usize },
}

/// Bit-level I/O errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitIoError {
    /// Input exhausted before the requested bits were available
    #[error("unexpected end of input: requested {requested} bits, available {available}")]
    UnexpectedEof { requested: u32, available: usize },

    /// Value does not fit in the requested field width
    #[error("value {value:#x} does not fit in {bits} bits")]
    ValueTooWide { value: u32, bits: u32 },

    /// Field width above 24 bits
    #[error("invalid bit count: {0}")]
    InvalidBitCount(u32),
}

/// Run framing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// Run would overshoot the frame boundary
    #[error("run of {run} pixels at offset {offset} overflows frame of {frame_len} pixels")]
    RunOverflow {
        offset: usize,
        run: usize,
        frame_len: usize,
    },

    /// Run length outside 1..=128
    #[error("run length {0} outside 1..=128")]
    RunLength(usize),

    /// Every declared frame has already been read
    #[error("stream declares {declared} frames, all already read")]
    FrameLimit { declared: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

//! Per-stream encoding statistics.
//!
//! The encoder updates one `EncodeMetrics` as it writes, giving a view of how
//! well the frame-delta runs are doing on a given animation:
//! - Size (raw bit cost vs. encoded bytes)
//! - Run mix (how many pixels were reused vs. re-sent)
//! - Run lengths (mean Same and Diff run length)
//!
//! # Thread Safety
//!
//! Metrics are owned by a single encoder and updated in place; nothing here
//! is shared.

use std::fmt;

use crate::run::Run;

/// Counters for one encoded stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeMetrics {
    // === Frames ===
    /// Frames written (including the literal first frame)
    pub frames: u64,

    /// Pixels stored literally in the first frame
    pub literal_pixels: u64,

    // === Runs ===
    /// Number of Same runs
    pub same_runs: u64,

    /// Pixels covered by Same runs
    pub same_pixels: u64,

    /// Number of Diff runs
    pub diff_runs: u64,

    /// Pixels covered by Diff runs
    pub diff_pixels: u64,

    // === Size ===
    /// Bits the frames would take stored literally (frames * W * H * bpp)
    pub raw_bits: u64,

    /// Header bytes
    pub header_bytes: u64,

    /// Bytes written for frames, including alignment padding
    pub frame_bytes: u64,
}

impl EncodeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one run.
    pub fn record_run(&mut self, run: &Run<'_>) {
        let len = run.len() as u64;
        match run {
            Run::Same(_) => {
                self.same_runs += 1;
                self.same_pixels += len;
            }
            Run::Diff(_) => {
                self.diff_runs += 1;
                self.diff_pixels += len;
            }
        }
    }

    /// Total encoded size in bytes.
    pub fn encoded_bytes(&self) -> u64 {
        self.header_bytes + self.frame_bytes
    }

    /// Raw size in bytes, rounded up.
    pub fn raw_bytes(&self) -> u64 {
        self.raw_bits.div_ceil(8)
    }

    /// Compute compression ratio (frame bytes / raw bytes).
    ///
    /// Returns 0.0 if nothing was encoded.
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bits == 0 {
            0.0
        } else {
            self.frame_bytes as f64 / self.raw_bytes() as f64
        }
    }

    /// Fraction of delta-coded pixels carried over from the previous frame.
    pub fn reuse_rate(&self) -> f64 {
        let total = self.same_pixels + self.diff_pixels;
        if total == 0 {
            0.0
        } else {
            self.same_pixels as f64 / total as f64
        }
    }

    /// Mean length of Same runs.
    pub fn mean_same_run(&self) -> f64 {
        mean(self.same_pixels, self.same_runs)
    }

    /// Mean length of Diff runs.
    pub fn mean_diff_run(&self) -> f64 {
        mean(self.diff_pixels, self.diff_runs)
    }
}

fn mean(total: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

impl fmt::Display for EncodeMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Encoding Summary ===")?;
        writeln!(f, "Frames: {}", self.frames)?;
        writeln!(
            f,
            "Raw: {} bytes ({:.1} KiB)",
            self.raw_bytes(),
            self.raw_bytes() as f64 / 1024.0
        )?;
        writeln!(
            f,
            "Encoded: {} bytes ({:.1} KiB, header {} bytes)",
            self.encoded_bytes(),
            self.encoded_bytes() as f64 / 1024.0,
            self.header_bytes
        )?;
        writeln!(f, "Ratio: {:.1}%", self.compression_ratio() * 100.0)?;
        writeln!(f)?;
        writeln!(f, "=== Runs ===")?;
        writeln!(
            f,
            "Same: {} runs, {} pixels (mean {:.1})",
            self.same_runs,
            self.same_pixels,
            self.mean_same_run()
        )?;
        writeln!(
            f,
            "Diff: {} runs, {} pixels (mean {:.1})",
            self.diff_runs,
            self.diff_pixels,
            self.mean_diff_run()
        )?;
        write!(f, "Reused: {:.1}%", self.reuse_rate() * 100.0)
    }
}

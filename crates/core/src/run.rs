//! Frame-delta runs and the greedy run planner.
//!
//! Every frame after the first is tiled by runs against the previous frame:
//! a `Same` run keeps the previous pixels, a `Diff` run carries literals.
//!
//! # Run Format
//!
//! ```text
//! 1 bit   mode     0 = Same, 1 = Diff
//! 7 bits  length   length mod 128 (a stored 0 means 128)
//! [Diff]  length * bpp bits of literal indices
//! ```
//!
//! # Planning
//!
//! The planner is a single greedy pass. At each offset it takes a `Same`
//! run as soon as at least `MIN_SAME` pixels match, otherwise it scans ahead
//! for the first offset where such a match starts and covers the gap with a
//! `Diff`. It never weighs the bit cost of alternatives, and the output must
//! stay byte-identical to that policy.

use crate::bitio::{BitReader, BitWriter};
use crate::error::{FramingError, Result};

/// Shortest run stored as `Same`.
pub const MIN_SAME: usize = 4;

/// Width of the length field.
pub const RUN_BITS: u32 = 7;

/// Longest run of either kind.
pub const MAX_RUN: usize = 1 << RUN_BITS;

/// Whether a run reuses the previous frame or carries new pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Same,
    Diff,
}

/// One span of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run<'a> {
    /// Pixels identical to the previous frame.
    Same(usize),
    /// Literal pixel indices.
    Diff(&'a [u8]),
}

impl Run<'_> {
    /// Number of pixels covered.
    pub fn len(&self) -> usize {
        match self {
            Run::Same(len) => *len,
            Run::Diff(literals) => literals.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> RunMode {
        match self {
            Run::Same(_) => RunMode::Same,
            Run::Diff(_) => RunMode::Diff,
        }
    }

    /// Bits this run occupies in the stream at `bpp` bits per pixel.
    pub fn encoded_bits(&self, bpp: u8) -> usize {
        let head = 1 + RUN_BITS as usize;
        match self {
            Run::Same(_) => head,
            Run::Diff(literals) => head + literals.len() * usize::from(bpp),
        }
    }

    /// Serialize the run header and, for `Diff`, its literals.
    pub fn write(&self, writer: &mut BitWriter, bpp: u8) -> Result<()> {
        write_run_header(writer, self.mode(), self.len())?;
        if let Run::Diff(literals) = self {
            for &pixel in *literals {
                writer.write_bits(u32::from(pixel), u32::from(bpp))?;
            }
        }
        Ok(())
    }
}

/// Write the mode bit and length field of a run.
///
/// # Errors
/// `FramingError::RunLength` unless `len` is in `1..=MAX_RUN`.
pub fn write_run_header(writer: &mut BitWriter, mode: RunMode, len: usize) -> Result<()> {
    if !(1..=MAX_RUN).contains(&len) {
        return Err(FramingError::RunLength(len).into());
    }
    let mode_bit = match mode {
        RunMode::Same => 0,
        RunMode::Diff => 1,
    };
    writer.write_bits(mode_bit, 1)?;
    writer.write_bits((len % MAX_RUN) as u32, RUN_BITS)
}

/// Read the mode bit and length field of a run; a stored 0 is 128.
pub fn read_run_header(reader: &mut BitReader<'_>) -> Result<(RunMode, usize)> {
    let mode = if reader.read_bit()? {
        RunMode::Diff
    } else {
        RunMode::Same
    };
    let len = match reader.read_bits(RUN_BITS)? as usize {
        0 => MAX_RUN,
        n => n,
    };
    Ok((mode, len))
}

/// Length of the identical span starting at `offset`, capped at `MAX_RUN`.
fn same_len(prev: &[u8], cur: &[u8], offset: usize) -> usize {
    prev.iter()
        .zip(cur)
        .skip(offset)
        .take(MAX_RUN)
        .take_while(|(a, b)| a == b)
        .count()
}

/// Pick the run starting at `offset`.
///
/// `prev` and `cur` must have equal length and `offset < cur.len()`.
fn pick_run<'a>(prev: &[u8], cur: &'a [u8], offset: usize) -> Run<'a> {
    let same = same_len(prev, cur, offset);
    if same >= MIN_SAME {
        return Run::Same(same);
    }

    let remaining = cur.len() - offset;
    if remaining < MIN_SAME {
        return Run::Diff(&cur[offset..]);
    }

    let mut diff = 1;
    while offset + diff < cur.len() && diff < MAX_RUN {
        if same_len(prev, cur, offset + diff) >= MIN_SAME {
            break;
        }
        diff += 1;
    }

    Run::Diff(&cur[offset..offset + diff])
}

/// Tile `cur` with runs against `prev`.
///
/// Run lengths sum to `cur.len()`, every `Same` covers at least `MIN_SAME`
/// pixels and no run exceeds `MAX_RUN`.
pub fn plan_runs<'a>(prev: &[u8], cur: &'a [u8]) -> Vec<Run<'a>> {
    debug_assert_eq!(prev.len(), cur.len());

    let mut runs = Vec::new();
    let mut offset = 0;
    while offset < cur.len() {
        let run = pick_run(prev, cur, offset);
        offset += run.len();
        runs.push(run);
    }
    runs
}

//! Bit-level I/O for the animation stream.
//!
//! `BitWriter` and `BitReader` pack fields LSB-first: the first bit written
//! lands in bit 0 of the current byte, and a field that straddles a byte
//! boundary continues in the low bits of the next byte.
//!
//! # Alignment Rules
//! - BitWriter: `flush` pads the pending partial byte with zero high bits
//! - BitReader: `align` drops whatever is left of the current byte
//! - Byte-wide fields (`write_byte`, `read_byte`, ...) always align first
//!
//! # Example
//! ```
//! use animpack_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//! // Bits fill from the bottom: 000_11_101
//!
//! let bytes = writer.finish();
//! assert_eq!(bytes, vec![0b0001_1101]);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b11);
//! ```

use crate::error::{BitIoError, Result};

/// Widest field either side accepts in one call.
pub const MAX_FIELD_BITS: u32 = 24;

/// Writes bits LSB-first into a byte buffer.
///
/// # Invariants
/// - `pending_bits` is always < 8 between calls
/// - bits of `pending` above `pending_bits` are zero
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Accumulator for bits not yet emitted (LSB-aligned)
    pending: u64,
    /// Number of valid bits in `pending`
    pending_bits: u32,
}

impl BitWriter {
    /// Create a new BitWriter with empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `count` bits of `value`.
    ///
    /// New bits are placed at the current pending-bit offset, so consecutive
    /// fields pack densely across byte boundaries.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 24
    /// - `BitIoError::ValueTooWide` if `value` has bits set at or above `count`
    pub fn write_bits(&mut self, value: u32, count: u32) -> Result<()> {
        if count > MAX_FIELD_BITS {
            return Err(BitIoError::InvalidBitCount(count).into());
        }
        if value >> count != 0 {
            return Err(BitIoError::ValueTooWide { value, bits: count }.into());
        }
        if count == 0 {
            return Ok(());
        }

        self.pending |= u64::from(value) << self.pending_bits;
        self.pending_bits += count;

        while self.pending_bits >= 8 {
            self.bytes.push((self.pending & 0xFF) as u8);
            self.pending >>= 8;
            self.pending_bits -= 8;
        }

        Ok(())
    }

    /// Emit the partial byte, if any, and return to byte alignment.
    pub fn flush(&mut self) {
        if self.pending_bits > 0 {
            self.bytes.push((self.pending & 0xFF) as u8);
        }
        self.pending = 0;
        self.pending_bits = 0;
    }

    /// Write one byte at the next byte boundary.
    pub fn write_byte(&mut self, value: u8) {
        self.flush();
        self.bytes.push(value);
    }

    /// Write a byte slice at the next byte boundary.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.flush();
        self.bytes.extend_from_slice(data);
    }

    /// Flush and return the output bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.bytes
    }

    /// Return the number of complete bytes written so far.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Return the total number of bits written (including pending bits).
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.pending_bits as usize
    }
}

/// Reads bits LSB-first from a byte slice.
///
/// Bytes are pulled from the input only when the accumulator runs short,
/// so `eof` reflects how many bytes have actually been consumed.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source data
    data: &'a [u8],
    /// Index of the next unread byte
    position: usize,
    /// Bits pulled from the input but not yet returned
    pending: u64,
    /// Number of valid bits in `pending`
    pending_bits: u32,
}

impl<'a> BitReader<'a> {
    /// Create a new BitReader for the given data.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            pending: 0,
            pending_bits: 0,
        }
    }

    /// Read the next `count` bits.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 24
    /// - `BitIoError::UnexpectedEof` if the input runs out first
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        if count > MAX_FIELD_BITS {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        while self.pending_bits < count {
            let Some(&byte) = self.data.get(self.position) else {
                return Err(BitIoError::UnexpectedEof {
                    requested: count,
                    available: self.pending_bits as usize,
                }
                .into());
            };
            self.pending |= u64::from(byte) << self.pending_bits;
            self.pending_bits += 8;
            self.position += 1;
        }

        let mask = (1u64 << count) - 1;
        let value = (self.pending & mask) as u32;
        self.pending >>= count;
        self.pending_bits -= count;

        Ok(value)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Discard the rest of the current partial byte.
    pub fn align(&mut self) {
        self.pending = 0;
        self.pending_bits = 0;
    }

    /// Read one byte at the next byte boundary.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.align();
        let byte = self
            .data
            .get(self.position)
            .copied()
            .ok_or(BitIoError::UnexpectedEof {
                requested: 8,
                available: 0,
            })?;
        self.position += 1;
        Ok(byte)
    }

    /// Read `len` bytes at the next byte boundary.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.align();
        let end = self.position + len;
        let Some(slice) = self.data.get(self.position..end) else {
            return Err(BitIoError::UnexpectedEof {
                requested: u32::try_from(len * 8).unwrap_or(u32::MAX),
                available: self.remaining_bytes() * 8,
            }
            .into());
        };
        self.position = end;
        Ok(slice)
    }

    /// Index of the next unread byte.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Jump to a byte offset, dropping any pending bits.
    ///
    /// Offsets past the end clamp to the end of the input.
    pub fn seek(&mut self, position: usize) {
        self.align();
        self.position = position.min(self.data.len());
    }

    /// Number of input bytes not yet pulled into the accumulator.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len() - self.position
    }

    /// True once every input byte has been consumed.
    ///
    /// Only meaningful at points where the writer was byte-aligned.
    pub fn eof(&self) -> bool {
        self.position >= self.data.len()
    }
}

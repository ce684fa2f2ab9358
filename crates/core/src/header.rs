//! Stream header: frame count, display interval, bit depth and palette.
//!
//! # Header Format
//!
//! ```text
//! +------------------+
//! | n_frames (1)     |  1..=255
//! +------------------+
//! | interval (1)     |  1..=255 display time units
//! +------------------+
//! | bpp (1)          |  1..=7
//! +------------------+
//! | palette          |  2^bpp RGB triples (3 * 2^bpp bytes)
//! | (variable)       |
//! +------------------+
//! ```
//!
//! Every field is byte-aligned. The first frame starts on the byte right
//! after the palette.

use crate::bitio::{BitReader, BitWriter};
use crate::error::{ConfigError, Result};

/// Smallest supported bit depth.
pub const MIN_BPP: u8 = 1;

/// Largest supported bit depth.
pub const MAX_BPP: u8 = 7;

/// Ordered RGB triples shared by every frame of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    rgb: Vec<u8>,
}

impl Palette {
    /// Wrap raw `r, g, b, r, g, b, ...` bytes, checking the length fits `bpp`.
    pub fn new(rgb: Vec<u8>, bpp: u8) -> Result<Self> {
        let expected = palette_len(bpp);
        if rgb.len() != expected {
            return Err(ConfigError::PaletteLength {
                expected,
                actual: rgb.len(),
            }
            .into());
        }
        Ok(Self { rgb })
    }

    /// Build a palette from color triples.
    pub fn from_colors(colors: &[[u8; 3]], bpp: u8) -> Result<Self> {
        Self::new(colors.concat(), bpp)
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.rgb.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.rgb.is_empty()
    }

    /// Color at `index`, if present.
    pub fn color(&self, index: u8) -> Option<[u8; 3]> {
        let start = usize::from(index) * 3;
        let c = self.rgb.get(start..start + 3)?;
        Some([c[0], c[1], c[2]])
    }

    /// Iterate over the colors in index order.
    pub fn colors(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.rgb.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Raw palette bytes as stored in the stream.
    pub fn as_bytes(&self) -> &[u8] {
        &self.rgb
    }

    /// Colors converted to the panel's RGB565 pixel format.
    pub fn to_rgb565(&self) -> Vec<u16> {
        self.colors().map(|[r, g, b]| rgb565(r, g, b)).collect()
    }
}

/// Pack an 8-8-8 color into 5-6-5.
pub fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r & 0xF8) << 8) | (u16::from(g & 0xFC) << 3) | u16::from(b >> 3)
}

/// Byte length of a palette at `bpp` bits per pixel.
pub fn palette_len(bpp: u8) -> usize {
    3 << bpp
}

/// Validated stream header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    n_frames: u8,
    interval: u8,
    bpp: u8,
    palette: Palette,
}

impl Header {
    /// Validate raw header values.
    ///
    /// # Errors
    /// - `ConfigError::FrameCount` unless 0 < n_frames < 256
    /// - `ConfigError::Interval` unless 0 < interval < 256
    /// - `ConfigError::Bpp` unless 0 < bpp < 8
    /// - `ConfigError::PaletteLength` unless the palette is 3 * 2^bpp bytes
    pub fn new(n_frames: u32, interval: u32, bpp: u32, palette: Vec<u8>) -> Result<Self> {
        let n_frames = in_byte_range(n_frames).ok_or(ConfigError::FrameCount(n_frames))?;
        let interval = in_byte_range(interval).ok_or(ConfigError::Interval(interval))?;
        let bpp = in_byte_range(bpp)
            .filter(|b| (MIN_BPP..=MAX_BPP).contains(b))
            .ok_or(ConfigError::Bpp(bpp))?;
        let palette = Palette::new(palette, bpp)?;

        Ok(Self {
            n_frames,
            interval,
            bpp,
            palette,
        })
    }

    pub fn n_frames(&self) -> usize {
        usize::from(self.n_frames)
    }

    pub fn interval(&self) -> u8 {
        self.interval
    }

    pub fn bpp(&self) -> u8 {
        self.bpp
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        3 + self.palette.as_bytes().len()
    }

    /// Write the header, byte-aligned.
    pub fn write(&self, writer: &mut BitWriter) {
        writer.write_byte(self.n_frames);
        writer.write_byte(self.interval);
        writer.write_byte(self.bpp);
        writer.write_bytes(self.palette.as_bytes());
    }

    /// Read and validate a header.
    ///
    /// # Errors
    /// - `BitIoError::UnexpectedEof` if the buffer ends inside the header
    /// - Any `ConfigError` that `Header::new` would raise
    pub fn read(reader: &mut BitReader<'_>) -> Result<Self> {
        let n_frames = reader.read_byte()?;
        let interval = reader.read_byte()?;
        let bpp = reader.read_byte()?;
        if !(MIN_BPP..=MAX_BPP).contains(&bpp) {
            return Err(ConfigError::Bpp(u32::from(bpp)).into());
        }
        let palette = reader.read_bytes(palette_len(bpp))?.to_vec();

        Self::new(
            u32::from(n_frames),
            u32::from(interval),
            u32::from(bpp),
            palette,
        )
    }
}

fn in_byte_range(value: u32) -> Option<u8> {
    u8::try_from(value).ok().filter(|&v| v > 0)
}

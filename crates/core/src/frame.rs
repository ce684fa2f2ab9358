//! Frame geometry and pixel-buffer validation.
//!
//! Geometry is never stored in the stream. Producer and consumer agree on
//! it out of band, so both sides take a `Geometry` at construction and every
//! frame is checked against it exactly once, at the encoder boundary.

use crate::error::{ConfigError, EncodeError, Result};

/// Width and height of every frame in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    width: usize,
    height: usize,
}

impl Geometry {
    /// The badge LCD panel.
    pub const BADGE_LCD: Geometry = Geometry {
        width: 160,
        height: 128,
    };

    /// Create a geometry.
    ///
    /// Rejects zero-sized frames and frames whose bit size at the widest
    /// depth would not fit in `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let fits = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(8))
            .is_some();
        if width == 0 || height == 0 || !fits {
            return Err(ConfigError::Geometry { width, height }.into());
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels in one frame.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Bytes taken by one literally stored frame at `bpp` bits per pixel.
    pub fn literal_frame_bytes(&self, bpp: u8) -> usize {
        (self.pixel_count() * usize::from(bpp)).div_ceil(8)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::BADGE_LCD
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Check a frame's length against `geometry` and every index against `bpp`.
///
/// # Errors
/// - `EncodeError::FrameLength` if the frame is not exactly width * height
/// - `EncodeError::PixelOutOfRange` for the first index >= 2^bpp
pub fn validate_frame(pixels: &[u8], geometry: Geometry, bpp: u8) -> Result<()> {
    let expected = geometry.pixel_count();
    if pixels.len() != expected {
        return Err(EncodeError::FrameLength {
            expected,
            actual: pixels.len(),
        }
        .into());
    }

    let limit = 1u16 << bpp;
    if let Some((offset, &value)) = pixels
        .iter()
        .enumerate()
        .find(|&(_, &p)| u16::from(p) >= limit)
    {
        return Err(EncodeError::PixelOutOfRange { offset, value, bpp }.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_badge_geometry() {
        let g = Geometry::default();
        assert_eq!(g.pixel_count(), 160 * 128);
        assert_eq!(g.literal_frame_bytes(4), 160 * 128 / 2);
        assert_eq!(g.to_string(), "160x128");
    }

    #[test]
    fn test_literal_frame_bytes_rounds_up() {
        let g = Geometry::new(3, 1).unwrap();
        assert_eq!(g.literal_frame_bytes(3), 2);
    }

    #[test]
    fn test_zero_geometry_rejected() {
        assert!(matches!(
            Geometry::new(0, 128),
            Err(Error::Config(ConfigError::Geometry { width: 0, height: 128 }))
        ));
    }

    #[test]
    fn test_oversized_geometry_rejected() {
        assert!(matches!(
            Geometry::new(usize::MAX / 2, 3),
            Err(Error::Config(ConfigError::Geometry { height: 3, .. }))
        ));
        // Pixel count fits, bit count does not
        assert!(Geometry::new(usize::MAX / 4, 1).is_err());

        let g = Geometry::new(1 << 20, 1 << 10).unwrap();
        assert_eq!(g.pixel_count(), 1 << 30);
        assert_eq!(g.literal_frame_bytes(7), 7 << 27);
        assert_eq!((g.width(), g.height()), (1 << 20, 1 << 10));
    }

    #[test]
    fn test_validate_frame_length() {
        let g = Geometry::new(2, 2).unwrap();
        assert!(validate_frame(&[0, 1, 0, 1], g, 1).is_ok());

        for len in [0, 3, 5] {
            let frame = vec![0; len];
            assert!(matches!(
                validate_frame(&frame, g, 1),
                Err(Error::Encode(EncodeError::FrameLength { expected: 4, .. }))
            ));
        }
    }

    #[test]
    fn test_validate_pixel_range() {
        let g = Geometry::new(4, 1).unwrap();
        assert!(validate_frame(&[0, 7, 3, 1], g, 3).is_ok());
        assert!(matches!(
            validate_frame(&[0, 7, 8, 1], g, 3),
            Err(Error::Encode(EncodeError::PixelOutOfRange {
                offset: 2,
                value: 8,
                bpp: 3
            }))
        ));
    }
}

//! Stream encoder.
//!
//! An `Encoder` is created once per animation, given the header, then fed
//! frames strictly in order. The first frame is stored literally; each later
//! frame is stored as runs against the frame written just before it.
//!
//! # Example
//! ```
//! use animpack_core::{Encoder, Geometry, Header};
//!
//! let geometry = Geometry::new(2, 2).unwrap();
//! let header = Header::new(2, 100, 1, vec![0, 0, 0, 255, 255, 255]).unwrap();
//!
//! let mut encoder = Encoder::new(geometry);
//! encoder.write_header(header).unwrap();
//! encoder.write_frame(&[0, 1, 0, 1]).unwrap();
//! encoder.write_frame(&[0, 1, 0, 1]).unwrap();
//! let bytes = encoder.finish().unwrap();
//! assert_eq!(bytes.len(), 9 + 1 + 1);
//! ```

use tracing::{debug, info, trace};

use crate::bitio::BitWriter;
use crate::error::{EncodeError, Result};
use crate::frame::{validate_frame, Geometry};
use crate::header::Header;
use crate::metrics::EncodeMetrics;
use crate::run::plan_runs;

/// Frame-delta run-length encoder for one animation.
#[derive(Debug)]
pub struct Encoder {
    writer: BitWriter,
    geometry: Geometry,
    header: Option<Header>,
    /// Reference for the next frame; replaced only after a frame is written
    prev_frame: Option<Vec<u8>>,
    frames_written: usize,
    metrics: EncodeMetrics,
}

impl Encoder {
    /// Create an encoder for frames of the given geometry.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            writer: BitWriter::new(),
            geometry,
            header: None,
            prev_frame: None,
            frames_written: 0,
            metrics: EncodeMetrics::new(),
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn metrics(&self) -> &EncodeMetrics {
        &self.metrics
    }

    /// Write the stream header.
    ///
    /// # Errors
    /// `EncodeError::HeaderAlreadyWritten` on a second call.
    pub fn write_header(&mut self, header: Header) -> Result<()> {
        if self.header.is_some() {
            return Err(EncodeError::HeaderAlreadyWritten.into());
        }

        header.write(&mut self.writer);
        self.metrics.header_bytes = header.encoded_len() as u64;
        debug!(
            n_frames = header.n_frames(),
            interval = header.interval(),
            bpp = header.bpp(),
            "wrote header"
        );
        self.header = Some(header);
        Ok(())
    }

    /// Encode the next frame.
    ///
    /// The frame is validated in full before anything is written, so a
    /// rejected frame leaves the stream and the reference frame untouched.
    ///
    /// # Errors
    /// - `EncodeError::HeaderNotWritten` before `write_header`
    /// - `EncodeError::TooManyFrames` past the declared frame count
    /// - `EncodeError::FrameLength` if the frame is not width * height pixels
    /// - `EncodeError::PixelOutOfRange` if an index does not fit in bpp bits
    pub fn write_frame(&mut self, pixels: &[u8]) -> Result<()> {
        let header = self.header.as_ref().ok_or(EncodeError::HeaderNotWritten)?;
        let bpp = header.bpp();
        if self.frames_written >= header.n_frames() {
            return Err(EncodeError::TooManyFrames {
                declared: header.n_frames(),
                index: self.frames_written,
            }
            .into());
        }
        validate_frame(pixels, self.geometry, bpp)?;

        let start = self.writer.byte_len();
        match self.prev_frame.as_deref() {
            None => self.write_literal(pixels, bpp)?,
            Some(prev) => {
                let runs = plan_runs(prev, pixels);
                for run in &runs {
                    trace!(mode = ?run.mode(), len = run.len(), "run");
                    run.write(&mut self.writer, bpp)?;
                    self.metrics.record_run(run);
                }
            }
        }
        self.writer.flush();

        let frame_bytes = self.writer.byte_len() - start;
        debug!(index = self.frames_written, bytes = frame_bytes, "encoded frame");

        self.metrics.frames += 1;
        self.metrics.frame_bytes += frame_bytes as u64;
        self.metrics.raw_bits += (pixels.len() * usize::from(bpp)) as u64;
        self.frames_written += 1;

        match &mut self.prev_frame {
            Some(prev) => prev.copy_from_slice(pixels),
            None => self.prev_frame = Some(pixels.to_vec()),
        }
        Ok(())
    }

    fn write_literal(&mut self, pixels: &[u8], bpp: u8) -> Result<()> {
        for &pixel in pixels {
            self.writer.write_bits(u32::from(pixel), u32::from(bpp))?;
        }
        self.metrics.literal_pixels += pixels.len() as u64;
        Ok(())
    }

    /// Finish the stream and return the encoded bytes.
    ///
    /// # Errors
    /// - `EncodeError::HeaderNotWritten` if no header was written
    /// - `EncodeError::FrameCountMismatch` if fewer frames than declared
    pub fn finish(self) -> Result<Vec<u8>> {
        let header = self.header.as_ref().ok_or(EncodeError::HeaderNotWritten)?;
        if self.frames_written != header.n_frames() {
            return Err(EncodeError::FrameCountMismatch {
                declared: header.n_frames(),
                written: self.frames_written,
            }
            .into());
        }

        let bytes = self.writer.finish();
        info!(
            frames = self.frames_written,
            bytes = bytes.len(),
            ratio = self.metrics.compression_ratio(),
            "finished stream"
        );
        Ok(bytes)
    }

    /// Finish the stream, also returning the collected metrics.
    pub fn finish_with_metrics(self) -> Result<(Vec<u8>, EncodeMetrics)> {
        let metrics = self.metrics.clone();
        Ok((self.finish()?, metrics))
    }
}

/// Encode a whole animation in one call.
///
/// `header.n_frames()` must equal `frames.len()`.
pub fn encode_animation<F: AsRef<[u8]>>(
    geometry: Geometry,
    header: Header,
    frames: &[F],
) -> Result<(Vec<u8>, EncodeMetrics)> {
    let mut encoder = Encoder::new(geometry);
    encoder.write_header(header)?;
    for frame in frames {
        encoder.write_frame(frame.as_ref())?;
    }
    encoder.finish_with_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn mono(n_frames: u32) -> Header {
        Header::new(n_frames, 10, 1, vec![0, 0, 0, 255, 255, 255]).unwrap()
    }

    fn quad() -> Geometry {
        Geometry::new(4, 1).unwrap()
    }

    #[test]
    fn test_literal_first_frame() {
        let mut encoder = Encoder::new(quad());
        encoder.write_header(mono(1)).unwrap();
        encoder.write_frame(&[0, 1, 0, 1]).unwrap();
        let bytes = encoder.finish().unwrap();

        // 4 bits + 4 padding bits
        assert_eq!(&bytes[9..], &[0b0000_1010]);
    }

    #[test]
    fn test_identical_frame_is_one_same_run() {
        let mut encoder = Encoder::new(quad());
        encoder.write_header(mono(2)).unwrap();
        encoder.write_frame(&[0, 1, 0, 1]).unwrap();
        encoder.write_frame(&[0, 1, 0, 1]).unwrap();
        let bytes = encoder.finish().unwrap();

        assert_eq!(&bytes[10..], &[0b0000_1000]);
    }

    #[test]
    fn test_reference_is_previous_frame() {
        let mut encoder = Encoder::new(quad());
        encoder.write_header(mono(3)).unwrap();
        encoder.write_frame(&[0, 0, 0, 0]).unwrap();
        encoder.write_frame(&[1, 1, 1, 1]).unwrap();
        encoder.write_frame(&[1, 1, 1, 1]).unwrap();
        let bytes = encoder.finish().unwrap();

        // Frame 2 matches frame 1, not frame 0
        assert_eq!(bytes.last(), Some(&0b0000_1000));
    }

    #[test]
    fn test_frame_before_header() {
        let mut encoder = Encoder::new(quad());
        assert!(matches!(
            encoder.write_frame(&[0, 0, 0, 0]),
            Err(Error::Encode(EncodeError::HeaderNotWritten))
        ));
    }

    #[test]
    fn test_header_twice() {
        let mut encoder = Encoder::new(quad());
        encoder.write_header(mono(1)).unwrap();
        assert!(matches!(
            encoder.write_header(mono(1)),
            Err(Error::Encode(EncodeError::HeaderAlreadyWritten))
        ));
    }

    #[test]
    fn test_geometry_enforced_on_every_frame() {
        let mut encoder = Encoder::new(quad());
        encoder.write_header(mono(2)).unwrap();
        assert!(matches!(
            encoder.write_frame(&[0, 1, 0]),
            Err(Error::Encode(EncodeError::FrameLength { expected: 4, actual: 3 }))
        ));

        encoder.write_frame(&[0, 1, 0, 1]).unwrap();
        assert!(matches!(
            encoder.write_frame(&[0, 1, 0, 1, 1]),
            Err(Error::Encode(EncodeError::FrameLength { expected: 4, actual: 5 }))
        ));
        assert_eq!(encoder.frames_written(), 1);
    }

    #[test]
    fn test_rejected_frame_writes_nothing() {
        let mut encoder = Encoder::new(quad());
        encoder.write_header(mono(2)).unwrap();
        encoder.write_frame(&[0, 1, 0, 1]).unwrap();
        let before = encoder.writer.byte_len();

        assert!(matches!(
            encoder.write_frame(&[0, 2, 0, 1]),
            Err(Error::Encode(EncodeError::PixelOutOfRange { offset: 1, value: 2, bpp: 1 }))
        ));
        assert_eq!(encoder.writer.byte_len(), before);
        assert_eq!(encoder.prev_frame.as_deref(), Some(&[0, 1, 0, 1][..]));
    }

    #[test]
    fn test_frame_count_enforced() {
        let mut encoder = Encoder::new(quad());
        encoder.write_header(mono(1)).unwrap();
        encoder.write_frame(&[0, 0, 0, 0]).unwrap();
        assert!(matches!(
            encoder.write_frame(&[0, 0, 0, 0]),
            Err(Error::Encode(EncodeError::TooManyFrames { declared: 1, index: 1 }))
        ));

        let mut short = Encoder::new(quad());
        short.write_header(mono(2)).unwrap();
        short.write_frame(&[0, 0, 0, 0]).unwrap();
        assert!(matches!(
            short.finish(),
            Err(Error::Encode(EncodeError::FrameCountMismatch { declared: 2, written: 1 }))
        ));
    }

    #[test]
    fn test_metrics_track_runs() {
        let frames = [[0u8, 0, 0, 0], [0, 0, 0, 0], [1, 0, 0, 0]];
        let (bytes, metrics) = encode_animation(quad(), mono(3), &frames).unwrap();

        assert_eq!(metrics.frames, 3);
        assert_eq!(metrics.literal_pixels, 4);
        assert_eq!(metrics.same_runs, 1);
        assert_eq!(metrics.diff_runs, 1);
        assert_eq!(metrics.raw_bits, 12);
        assert_eq!(metrics.header_bytes, 9);
        assert_eq!(metrics.encoded_bytes(), bytes.len() as u64);
    }
}

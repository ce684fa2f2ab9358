//! Stream decoder.
//!
//! A `Decoder` reads the header on construction, then reconstructs frames in
//! order into a single buffer that is updated in place: `Same` runs leave the
//! previous pixels where they are, `Diff` runs overwrite their span. Only one
//! frame is ever held in memory.

use tracing::{debug, trace};

use crate::bitio::BitReader;
use crate::error::{Error, FramingError, Result};
use crate::frame::Geometry;
use crate::header::Header;
use crate::run::{read_run_header, RunMode};

/// Frame-by-frame decoder over a complete encoded stream.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    reader: BitReader<'a>,
    geometry: Geometry,
    header: Header,
    /// Byte offset of the literal first frame
    frame0_offset: usize,
    /// Current frame, reused across calls
    frame: Vec<u8>,
    frames_read: usize,
}

impl<'a> Decoder<'a> {
    /// Read the header from `data` and prepare to decode frames.
    ///
    /// # Errors
    /// - `BitIoError::UnexpectedEof` if `data` ends inside the header
    /// - `ConfigError` if a header field is out of range
    pub fn new(data: &'a [u8], geometry: Geometry) -> Result<Self> {
        let mut reader = BitReader::new(data);
        let header = Header::read(&mut reader)?;
        let frame0_offset = reader.position();
        debug!(
            n_frames = header.n_frames(),
            interval = header.interval(),
            bpp = header.bpp(),
            "read header"
        );

        Ok(Self {
            reader,
            geometry,
            header,
            frame0_offset,
            frame: vec![0; geometry.pixel_count()],
            frames_read: 0,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Number of frames decoded since construction or the last rewind.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// The most recently decoded frame.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Decode the next frame and return it.
    ///
    /// # Errors
    /// - `BitIoError::UnexpectedEof` if the input ends mid-frame
    /// - `FramingError::RunOverflow` if a run overshoots the frame
    /// - `FramingError::FrameLimit` once every declared frame was read
    pub fn read_frame(&mut self) -> Result<&[u8]> {
        let declared = self.header.n_frames();
        if self.frames_read >= declared {
            return Err(FramingError::FrameLimit { declared }.into());
        }

        if self.frames_read == 0 {
            self.read_literal()?;
        } else {
            self.read_runs()?;
        }
        self.reader.align();

        debug!(
            index = self.frames_read,
            end = self.reader.position(),
            "decoded frame"
        );
        self.frames_read += 1;
        Ok(&self.frame)
    }

    fn read_literal(&mut self) -> Result<()> {
        let bpp = u32::from(self.header.bpp());
        for pixel in self.frame.iter_mut() {
            *pixel = self.reader.read_bits(bpp)? as u8;
        }
        Ok(())
    }

    fn read_runs(&mut self) -> Result<()> {
        let bpp = u32::from(self.header.bpp());
        let frame_len = self.frame.len();
        let mut offset = 0;

        while offset < frame_len {
            let (mode, run) = read_run_header(&mut self.reader)?;
            if run > frame_len - offset {
                return Err(FramingError::RunOverflow {
                    offset,
                    run,
                    frame_len,
                }
                .into());
            }
            trace!(?mode, offset, run, "run");

            if mode == RunMode::Diff {
                for pixel in &mut self.frame[offset..offset + run] {
                    *pixel = self.reader.read_bits(bpp)? as u8;
                }
            }
            offset += run;
        }
        Ok(())
    }

    /// True once every input byte has been consumed.
    pub fn eof(&self) -> bool {
        self.reader.eof()
    }

    /// Bytes not yet consumed.
    pub fn remaining_bytes(&self) -> usize {
        self.reader.remaining_bytes()
    }

    /// Return to the literal first frame, keeping the header.
    pub fn rewind(&mut self) {
        self.reader.seek(self.frame0_offset);
        self.frames_read = 0;
    }

    /// Check that nothing follows the frames read so far.
    ///
    /// # Errors
    /// `Error::TrailingData` if input bytes remain.
    pub fn finish(&self) -> Result<()> {
        if self.eof() {
            Ok(())
        } else {
            Err(Error::TrailingData {
                frames: self.frames_read,
                remaining: self.remaining_bytes(),
            })
        }
    }
}

/// A fully decoded stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAnimation {
    pub header: Header,
    pub frames: Vec<Vec<u8>>,
}

/// Decode every declared frame and reject trailing bytes.
pub fn decode_animation(data: &[u8], geometry: Geometry) -> Result<DecodedAnimation> {
    let mut decoder = Decoder::new(data, geometry)?;
    let n_frames = decoder.header().n_frames();

    let mut frames = Vec::with_capacity(n_frames);
    for _ in 0..n_frames {
        frames.push(decoder.read_frame()?.to_vec());
    }
    decoder.finish()?;

    Ok(DecodedAnimation {
        header: decoder.header().clone(),
        frames,
    })
}

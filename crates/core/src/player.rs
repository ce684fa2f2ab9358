//! Looping playback of an encoded stream.
//!
//! Mirrors how the firmware shows an animation: one decoded frame in memory,
//! a countdown in display time units, and a wrap back to the literal first
//! frame after the last one.

use tracing::trace;

use crate::decoder::Decoder;
use crate::error::Result;
use crate::frame::Geometry;
use crate::header::Header;

/// Frame clock plus decoder for one animation.
#[derive(Debug, Clone)]
pub struct Player<'a> {
    decoder: Decoder<'a>,
    current: usize,
    countdown: i64,
    palette_rgb565: Vec<u16>,
}

impl<'a> Player<'a> {
    /// Read the header and decode frame 0.
    pub fn new(data: &'a [u8], geometry: Geometry) -> Result<Self> {
        let mut decoder = Decoder::new(data, geometry)?;
        decoder.read_frame()?;
        let countdown = i64::from(decoder.header().interval());
        let palette_rgb565 = decoder.header().palette().to_rgb565();

        Ok(Self {
            decoder,
            current: 0,
            countdown,
            palette_rgb565,
        })
    }

    pub fn header(&self) -> &Header {
        self.decoder.header()
    }

    /// Index of the frame currently shown.
    pub fn current_frame(&self) -> usize {
        self.current
    }

    /// Palette indices of the frame currently shown.
    pub fn frame(&self) -> &[u8] {
        self.decoder.frame()
    }

    /// Advance the clock by `delta` time units.
    ///
    /// Decodes as many frames as the elapsed time covers, wrapping after the
    /// last declared frame. Returns the number of frames advanced.
    pub fn update(&mut self, delta: u32) -> Result<usize> {
        let interval = i64::from(self.decoder.header().interval());
        let n_frames = self.decoder.header().n_frames();

        self.countdown -= i64::from(delta);
        let mut advanced = 0;
        while self.countdown < 0 {
            self.countdown += interval;
            self.current = (self.current + 1) % n_frames;
            if self.current == 0 {
                self.decoder.rewind();
            }
            self.decoder.read_frame()?;
            advanced += 1;
        }

        if advanced > 0 {
            trace!(frame = self.current, advanced, "advanced");
        }
        Ok(advanced)
    }

    /// Restart from frame 0.
    pub fn reset(&mut self) -> Result<()> {
        self.decoder.rewind();
        self.decoder.read_frame()?;
        self.current = 0;
        self.countdown = i64::from(self.decoder.header().interval());
        Ok(())
    }

    /// Map the current frame through the palette into RGB565 pixels.
    ///
    /// `out` must hold at least width * height pixels; extra entries are left
    /// untouched.
    pub fn render_rgb565(&self, out: &mut [u16]) {
        for (dst, &index) in out.iter_mut().zip(self.decoder.frame()) {
            *dst = self
                .palette_rgb565
                .get(usize::from(index))
                .copied()
                .unwrap_or_default();
        }
    }
}

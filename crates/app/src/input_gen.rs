//! Synthetic animation generation for the demo.
//!
//! When no real frames are given, we generate an indexed-color animation
//! whose frames exercise every path of the run encoder.
//!
//! # Design
//!
//! Each generated animation has:
//! - A static background (long Same runs between frames)
//! - A bouncing sprite (short Diff runs around its old and new position)
//! - A flickering noise strip (Diff runs with no reuse at all)
//!
//! This makes the Same/Diff mix visible in the metrics.

use std::io::Write;
use std::path::Path;

use animpack_core::Geometry;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate `n_frames` frames of indexed pixels for `geometry` at `bpp`.
///
/// Every index is below 2^bpp and every frame is exactly
/// `geometry.pixel_count()` long.
pub fn generate_frames(seed: u64, geometry: Geometry, bpp: u8, n_frames: usize) -> Vec<Vec<u8>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let colors = 1u16 << bpp;
    let (width, height) = (geometry.width(), geometry.height());

    // Background: horizontal bands of one color each
    let band = rng.gen_range(4..=16usize).min(height);
    let background: Vec<u8> = (0..geometry.pixel_count())
        .map(|i| ((i / width / band) as u16 % colors) as u8)
        .collect();

    let sprite_w = (width / 6).max(1);
    let sprite_h = (height / 6).max(1);
    let sprite_color = rng.gen_range(0..colors) as u8;
    let mut x = rng.gen_range(0..=width - sprite_w);
    let mut y = rng.gen_range(0..=height - sprite_h);
    let mut dx: isize = if rng.gen_bool(0.5) { 3 } else { -3 };
    let mut dy: isize = if rng.gen_bool(0.5) { 2 } else { -2 };

    let strip_rows = (height / 16).max(1);

    let mut frames = Vec::with_capacity(n_frames);
    for _ in 0..n_frames {
        let mut frame = background.clone();

        for row in y..y + sprite_h {
            let start = row * width + x;
            frame[start..start + sprite_w].fill(sprite_color);
        }

        for pixel in &mut frame[(height - strip_rows) * width..] {
            if rng.gen_bool(0.5) {
                *pixel = rng.gen_range(0..colors) as u8;
            }
        }

        frames.push(frame);

        (x, dx) = bounce(x, dx, width - sprite_w);
        (y, dy) = bounce(y, dy, height - sprite_h);
    }

    frames
}

/// Move `pos` by `step` inside `0..=max`, reversing at the edges.
fn bounce(pos: usize, step: isize, max: usize) -> (usize, isize) {
    let next = pos as isize + step;
    if next < 0 || next > max as isize {
        let reversed = -step;
        let clamped = (pos as isize + reversed).clamp(0, max as isize);
        (clamped as usize, reversed)
    } else {
        (next as usize, step)
    }
}

/// Generate a palette of 2^bpp RGB triples.
pub fn generate_palette(seed: u64, bpp: u8) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed_c010);
    (0..3usize << bpp).map(|_| rng.gen()).collect()
}

/// Write frames back to back as raw indices, one byte per pixel.
pub fn write_raw_frames(path: &Path, frames: &[Vec<u8>]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    for frame in frames {
        file.write_all(frame)?;
    }
    Ok(())
}

//! Integration tests for the full codec.
//!
//! These tests verify end-to-end behavior: header -> frames -> bytes ->
//! decoder -> frames, with verification that output matches input exactly
//! and that malformed streams fail with the right error.

use animpack_core::{
    decode_animation, encode_animation,
    error::{ConfigError, EncodeError, Error, FramingError},
    run::{plan_runs, Run, MAX_RUN, MIN_SAME},
    Decoder, Encoder, Geometry, Header, Player,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn palette(bpp: u8) -> Vec<u8> {
    (0..3usize << bpp).map(|i| (i * 37 % 256) as u8).collect()
}

/// Frames that drift: each one copies the last and repaints a few spans.
fn drifting_frames(rng: &mut ChaCha8Rng, geometry: Geometry, bpp: u8, n: usize) -> Vec<Vec<u8>> {
    let colors = 1u8 << bpp;
    let len = geometry.pixel_count();
    let mut frame: Vec<u8> = (0..len).map(|_| rng.gen_range(0..colors)).collect();
    let mut frames = vec![frame.clone()];

    for _ in 1..n {
        for _ in 0..rng.gen_range(0..8) {
            let start = rng.gen_range(0..len);
            let span = rng.gen_range(1..=300).min(len - start);
            for pixel in &mut frame[start..start + span] {
                if rng.gen_bool(0.7) {
                    *pixel = rng.gen_range(0..colors);
                }
            }
        }
        frames.push(frame.clone());
    }
    frames
}

/// Example from the format description: 4 pixels at 1 bpp.
#[test]
fn test_four_pixel_example_bytes() {
    let geometry = Geometry::new(4, 1).unwrap();
    let header = Header::new(3, 100, 1, vec![0, 0, 0, 255, 255, 255]).unwrap();
    let frames = [[0u8, 1, 0, 1], [0, 1, 0, 1], [1, 1, 0, 1]];

    let (bytes, _) = encode_animation(geometry, header, &frames).expect("encode failed");

    let mut expected = vec![3, 100, 1, 0, 0, 0, 255, 255, 255];
    // Frame 0: literal 0,1,0,1 + 4 padding bits
    expected.push(0b0000_1010);
    // Frame 1: Same(4), mode bit in the LSB
    expected.push(0b0000_100_0);
    // Frame 2: Diff(4) header, then literals 1,1,0,1
    expected.push(0b0000_100_1);
    expected.push(0b0000_1011);
    assert_eq!(bytes, expected);

    let decoded = decode_animation(&bytes, geometry).expect("decode failed");
    assert_eq!(decoded.frames, frames.map(|f| f.to_vec()).to_vec());
}

/// Palette length mismatch is caught before any frame is processed.
#[test]
fn test_palette_mismatch_rejected_up_front() {
    let result = Header::new(10, 100, 4, vec![0; 47]);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::PaletteLength {
            expected: 48,
            actual: 47
        }))
    ));
}

/// Round trip at every supported bit depth on a small geometry.
#[test]
fn test_round_trip_all_depths() {
    let mut rng = ChaCha8Rng::seed_from_u64(2025);
    let geometry = Geometry::new(40, 32).unwrap();

    for bpp in 1..=7u8 {
        let frames = drifting_frames(&mut rng, geometry, bpp, 12);
        let header = Header::new(12, 80, u32::from(bpp), palette(bpp)).unwrap();

        let (bytes, _) = encode_animation(geometry, header.clone(), &frames).expect("encode failed");

        let mut decoder = Decoder::new(&bytes, geometry).expect("header failed");
        assert_eq!(decoder.header(), &header);
        for (i, frame) in frames.iter().enumerate() {
            let decoded = decoder.read_frame().expect("frame failed");
            assert_eq!(decoded, frame.as_slice(), "bpp {bpp}, frame {i}");
        }
        assert!(decoder.eof(), "bpp {bpp}: input not fully consumed");
    }
}

/// Full badge geometry with noisy frames and frames with nothing in common.
#[test]
fn test_round_trip_badge_geometry() {
    let mut rng = ChaCha8Rng::seed_from_u64(160_128);
    let geometry = Geometry::BADGE_LCD;
    let bpp = 4;

    let mut frames = drifting_frames(&mut rng, geometry, bpp, 6);
    frames.push((0..geometry.pixel_count()).map(|_| rng.gen_range(0..16)).collect());
    frames.push(vec![0; geometry.pixel_count()]);

    let header = Header::new(frames.len() as u32, 100, 4, palette(bpp)).unwrap();
    let (bytes, metrics) = encode_animation(geometry, header, &frames).expect("encode failed");

    // Frame bytes include at least the literal first frame
    assert_eq!(metrics.frames, 8);
    assert_eq!(metrics.literal_pixels as usize, geometry.pixel_count());
    assert!(metrics.frame_bytes as usize >= geometry.literal_frame_bytes(bpp));

    let decoded = decode_animation(&bytes, geometry).expect("decode failed");
    assert_eq!(decoded.frames, frames);
}

/// Static animation compresses to one Same run per 128 pixels.
#[test]
fn test_static_animation_size() {
    let geometry = Geometry::BADGE_LCD;
    let frame = vec![5u8; geometry.pixel_count()];
    let frames = vec![frame; 4];
    let header = Header::new(4, 100, 3, palette(3)).unwrap();

    let (bytes, metrics) = encode_animation(geometry, header, &frames).unwrap();

    let runs_per_frame = geometry.pixel_count() / MAX_RUN;
    let expected = 3 + 24 + geometry.literal_frame_bytes(3) + 3 * runs_per_frame;
    assert_eq!(bytes.len(), expected);
    assert_eq!(metrics.same_runs as usize, 3 * runs_per_frame);
    assert_eq!(metrics.diff_runs, 0);
}

/// Run bounds and frame coverage hold for the planner on random data.
#[test]
fn test_plan_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let geometry = Geometry::new(64, 16).unwrap();
    let frames = drifting_frames(&mut rng, geometry, 2, 20);

    for pair in frames.windows(2) {
        let runs = plan_runs(&pair[0], &pair[1]);
        let total: usize = runs.iter().map(Run::len).sum();
        assert_eq!(total, geometry.pixel_count());

        for run in &runs {
            assert!(run.len() <= MAX_RUN);
            if let Run::Same(n) = run {
                assert!(*n >= MIN_SAME);
            }
        }
    }
}

/// Wrong-size frames are rejected, never truncated or padded.
#[test]
fn test_geometry_enforcement() {
    let geometry = Geometry::new(8, 8).unwrap();
    let mut encoder = Encoder::new(geometry);
    encoder
        .write_header(Header::new(2, 1, 2, palette(2)).unwrap())
        .unwrap();

    let result = encoder.write_frame(&[0; 63]);
    assert!(matches!(
        result,
        Err(Error::Encode(EncodeError::FrameLength {
            expected: 64,
            actual: 63
        }))
    ));
}

/// Decoding with a different geometry than the producer used shows up as
/// a framing or trailing-data error, never as silent success.
#[test]
fn test_geometry_disagreement_detected() {
    let mono = palette(1);

    // Same(8) cannot fit a 4-pixel frame
    let header = Header::new(2, 10, 1, mono.clone()).unwrap();
    let frames = vec![vec![0u8; 8], vec![0u8; 8]];
    let (bytes, _) = encode_animation(Geometry::new(8, 1).unwrap(), header, &frames).unwrap();
    assert!(matches!(
        decode_animation(&bytes, Geometry::new(4, 1).unwrap()),
        Err(Error::Framing(FramingError::RunOverflow {
            offset: 0,
            run: 8,
            frame_len: 4
        }))
    ));

    // A 16-pixel literal frame read as 8 pixels leaves a byte behind
    let header = Header::new(1, 10, 1, mono).unwrap();
    let (bytes, _) =
        encode_animation(Geometry::new(16, 1).unwrap(), header, &[vec![1u8; 16]]).unwrap();
    assert!(matches!(
        decode_animation(&bytes, Geometry::new(8, 1).unwrap()),
        Err(Error::TrailingData {
            frames: 1,
            remaining: 1
        })
    ));
}

/// Truncating a valid stream anywhere fails with a truncation error.
#[test]
fn test_truncation_detected() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let geometry = Geometry::new(16, 16).unwrap();
    let frames = drifting_frames(&mut rng, geometry, 2, 5);
    let header = Header::new(5, 10, 2, palette(2)).unwrap();
    let (bytes, _) = encode_animation(geometry, header, &frames).unwrap();

    for cut in [1, 5, 20, bytes.len() / 2, bytes.len() - 1] {
        let err = decode_animation(&bytes[..cut], geometry).unwrap_err();
        assert!(err.is_truncated(), "cut at {cut}: {err}");
    }
}

/// Extra bytes after the last frame are reported.
#[test]
fn test_trailing_data_detected() {
    let geometry = Geometry::new(4, 4).unwrap();
    let frames = vec![vec![1u8; 16], vec![0u8; 16]];
    let header = Header::new(2, 10, 1, palette(1)).unwrap();
    let (mut bytes, _) = encode_animation(geometry, header, &frames).unwrap();
    bytes.push(0);

    assert!(matches!(
        decode_animation(&bytes, geometry),
        Err(Error::TrailingData {
            frames: 2,
            remaining: 1
        })
    ));
}

/// Playback loops through every frame and back to the first.
#[test]
fn test_player_loops_stream() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let geometry = Geometry::new(20, 10).unwrap();
    let frames = drifting_frames(&mut rng, geometry, 2, 5);
    let header = Header::new(5, 40, 2, palette(2)).unwrap();
    let (bytes, _) = encode_animation(geometry, header, &frames).unwrap();

    let mut player = Player::new(&bytes, geometry).unwrap();
    // One time unit past the interval each step: countdown slips by one
    for step in 1..=12 {
        assert_eq!(player.update(41).unwrap(), 1);
        let expected = step % frames.len();
        assert_eq!(player.current_frame(), expected);
        assert_eq!(player.frame(), frames[expected].as_slice());
    }
}

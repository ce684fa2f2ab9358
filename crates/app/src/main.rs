//! animpack: build-time packer for firmware animations.
//!
//! Takes already-quantized indexed frames plus a palette, encodes them with
//! the frame-delta run codec, verifies the result by decoding it again, and
//! writes the blob (optionally as a C++ array ready to link).

mod config;
mod emit;
mod input_gen;

use animpack_core::{decode_animation, Decoder, EncodeMetrics, Encoder, Geometry, Header, Player};
use anyhow::{bail, ensure, Context};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Command, DemoArgs, DemoConfig, EncodeConfig, InspectConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command.unwrap_or(Command::Demo(DemoArgs::default())) {
        Command::Encode(args) => run_encode(EncodeConfig::from_args(args)?),
        Command::Inspect(args) => run_inspect(InspectConfig::from_args(args)?),
        Command::Demo(args) => run_demo(DemoConfig::from_args(args)?),
    }
}

fn setup_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run_encode(config: EncodeConfig) -> anyhow::Result<()> {
    if config.print_config {
        config.print();
    }

    let raw = std::fs::read(&config.frames_file)
        .with_context(|| format!("reading frames from {}", config.frames_file.display()))?;
    let palette = std::fs::read(&config.palette_file)
        .with_context(|| format!("reading palette from {}", config.palette_file.display()))?;

    let frame_len = config.geometry.pixel_count();
    ensure!(
        !raw.is_empty() && raw.len() % frame_len == 0,
        "{}: {} bytes is not a whole number of {} frames",
        config.frames_file.display(),
        raw.len(),
        config.geometry
    );
    let n_frames = raw.len() / frame_len;

    let header = Header::new(
        u32::try_from(n_frames).unwrap_or(u32::MAX),
        config.interval,
        u32::from(config.bpp),
        palette,
    )
    .with_context(|| format!("invalid header for {}", config.frames_file.display()))?;

    let mut encoder = Encoder::new(config.geometry);
    encoder.write_header(header)?;
    for (index, frame) in raw.chunks_exact(frame_len).enumerate() {
        encoder
            .write_frame(frame)
            .with_context(|| format!("frame {index} of {}", config.frames_file.display()))?;
    }
    let (blob, metrics) = encoder.finish_with_metrics()?;

    let decoded = decode_animation(&blob, config.geometry)
        .with_context(|| format!("verifying {}", config.output_file.display()))?;
    ensure!(
        decoded.frames.iter().flatten().eq(raw.iter()),
        "round trip mismatch for {}",
        config.frames_file.display()
    );

    std::fs::write(&config.output_file, &blob)
        .with_context(|| format!("writing {}", config.output_file.display()))?;
    info!(path = %config.output_file.display(), bytes = blob.len(), "wrote blob");

    if let Some(path) = &config.c_source {
        emit::write_c_source(path, &config.symbol, &blob)?;
        info!(path = %path.display(), symbol = %config.symbol, "wrote C source");
    }

    println!(
        "{}: {} frames, {} bytes, crc32 {:#010x}",
        config.output_file.display(),
        n_frames,
        blob.len(),
        crc32fast::hash(&blob)
    );
    if config.print_metrics {
        print_metrics(&metrics);
    }
    Ok(())
}

fn run_inspect(config: InspectConfig) -> anyhow::Result<()> {
    let path = &config.input_file;
    let blob = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let mut decoder = Decoder::new(&blob, config.geometry)
        .with_context(|| format!("reading header of {}", path.display()))?;
    let header = decoder.header().clone();

    println!("=== {} ===", path.display());
    println!("Size: {} bytes, crc32 {:#010x}", blob.len(), crc32fast::hash(&blob));
    println!("Geometry: {}", config.geometry);
    println!("Frames: {}", header.n_frames());
    println!("Interval: {}", header.interval());
    println!("Bits per pixel: {}", header.bpp());
    println!("Palette: {} colors", header.palette().len());
    println!();

    let mut frames = Vec::with_capacity(header.n_frames());
    let mut start = header.encoded_len();
    for index in 0..header.n_frames() {
        let frame = decoder
            .read_frame()
            .with_context(|| format!("frame {index} of {}", path.display()))?;
        frames.push(frame.to_vec());
        let end = blob.len() - decoder.remaining_bytes();
        println!("Frame {index:3}: {:6} bytes", end - start);
        start = end;
    }
    decoder
        .finish()
        .with_context(|| format!("checking end of {}", path.display()))?;
    println!();
    println!("Verification: PASSED");

    // Metrics come from re-encoding; a different blob means another producer
    let (reencoded, metrics) =
        animpack_core::encode_animation(config.geometry, header, &frames)?;
    if reencoded != blob {
        warn!(
            original = blob.len(),
            reencoded = reencoded.len(),
            "blob differs from greedy re-encoding"
        );
    }
    print_metrics(&metrics);

    if let Some(out) = &config.frames_out {
        input_gen::write_raw_frames(out, &frames)
            .with_context(|| format!("writing {}", out.display()))?;
        info!(path = %out.display(), frames = frames.len(), "wrote decoded frames");
    }
    Ok(())
}

fn run_demo(config: DemoConfig) -> anyhow::Result<()> {
    println!("Seed: {} (use --seed {} to reproduce)", config.seed, config.seed);
    if config.print_config {
        config.print();
    }

    let n_frames = config.n_frames as usize;
    let frames = input_gen::generate_frames(config.seed, config.geometry, config.bpp, n_frames);
    let palette = input_gen::generate_palette(config.seed, config.bpp);
    let header = Header::new(
        config.n_frames,
        config.interval,
        u32::from(config.bpp),
        palette,
    )?;

    let (blob, metrics) = animpack_core::encode_animation(config.geometry, header.clone(), &frames)?;

    let decoded = decode_animation(&blob, config.geometry)?;
    ensure!(decoded.header == header, "decoded header differs");
    ensure!(decoded.frames == frames, "decoded frames differ");

    verify_playback(&blob, config.geometry, &frames)?;
    println!("Verification: PASSED");

    if let Some(path) = &config.output_file {
        std::fs::write(path, &blob).with_context(|| format!("writing {}", path.display()))?;
        let raw_path = path.with_extension("raw");
        input_gen::write_raw_frames(&raw_path, &frames)
            .with_context(|| format!("writing {}", raw_path.display()))?;
        println!("Wrote {} and {}", path.display(), raw_path.display());
    }

    if config.print_metrics {
        print_metrics(&metrics);
    }
    Ok(())
}

/// Play one full loop one time unit at a time and check every frame the
/// player shows.
fn verify_playback(blob: &[u8], geometry: Geometry, frames: &[Vec<u8>]) -> anyhow::Result<()> {
    let mut player = Player::new(blob, geometry)?;
    let mut screen = vec![0u16; geometry.pixel_count()];
    let mut elapsed = 0u64;

    for tick in 1..=frames.len() {
        let advanced = loop {
            elapsed += 1;
            match player.update(1)? {
                0 => continue,
                n => break n,
            }
        };
        if advanced != 1 {
            warn!(tick, advanced, "player skipped frames");
            bail!("player advanced {advanced} frames on tick {tick}");
        }
        let expected = tick % frames.len();
        ensure!(
            player.frame() == frames[expected].as_slice(),
            "playback mismatch at frame {expected}"
        );
        player.render_rgb565(&mut screen);
    }
    debug!(elapsed, frames = frames.len(), "playback loop complete");
    Ok(())
}

fn print_metrics(metrics: &EncodeMetrics) {
    println!();
    println!("{metrics}");
}

//! Configuration for the animpack command line.
//!
//! Arguments are parsed with clap, then resolved into plain config structs
//! with every default filled in. Geometry and header ranges are validated
//! once here, so the commands can assume well-formed settings.
//!
//! # Defaults
//!
//! The tool works with ZERO arguments: it runs the demo with randomized
//! settings drawn from a time-based seed. The seed is printed so any run can
//! be reproduced with `--seed`.

use std::path::{Path, PathBuf};

use animpack_core::header::{MAX_BPP, MIN_BPP};
use animpack_core::Geometry;
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Parser, Debug)]
#[command(
    name = "animpack",
    version,
    about = "Pack indexed-color animations into frame-delta blobs for firmware"
)]
pub struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode raw indexed frames into a blob
    Encode(EncodeArgs),
    /// Decode a blob and verify its framing
    Inspect(InspectArgs),
    /// Generate, encode and verify a synthetic animation
    Demo(DemoArgs),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct GeometryArgs {
    /// Frame width in pixels
    #[arg(long, default_value_t = Geometry::BADGE_LCD.width())]
    pub width: usize,

    /// Frame height in pixels
    #[arg(long, default_value_t = Geometry::BADGE_LCD.height())]
    pub height: usize,
}

impl Default for GeometryArgs {
    fn default() -> Self {
        Self {
            width: Geometry::BADGE_LCD.width(),
            height: Geometry::BADGE_LCD.height(),
        }
    }
}

impl GeometryArgs {
    fn resolve(self) -> anyhow::Result<Geometry> {
        Ok(Geometry::new(self.width, self.height)?)
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Raw frames: one palette index per byte, frames back to back
    #[arg(long)]
    pub frames: PathBuf,

    /// Raw palette: 2^bpp RGB triples
    #[arg(long)]
    pub palette: PathBuf,

    /// Bits per pixel (1-7)
    #[arg(long, default_value_t = 4)]
    pub bpp: u8,

    /// Display interval per frame
    #[arg(long, default_value_t = 100)]
    pub interval: u32,

    /// Output blob path
    #[arg(long)]
    pub out: PathBuf,

    /// Also write a C++ array source (and a matching .hpp)
    #[arg(long)]
    pub c_source: Option<PathBuf>,

    /// Array symbol name (default: output file stem, upper-cased)
    #[arg(long)]
    pub symbol: Option<String>,

    #[command(flatten)]
    pub geometry: GeometryArgs,

    /// Print resolved configuration
    #[arg(long)]
    pub print_config: bool,

    /// Don't print metrics summary
    #[arg(long)]
    pub no_metrics: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Blob to decode
    #[arg(long = "in")]
    pub input: PathBuf,

    /// Write decoded frames as raw indices
    #[arg(long)]
    pub frames_out: Option<PathBuf>,

    #[command(flatten)]
    pub geometry: GeometryArgs,
}

#[derive(Args, Debug, Default)]
pub struct DemoArgs {
    /// Random seed for determinism
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of frames (default: random 8-32)
    #[arg(long)]
    pub frames: Option<u32>,

    /// Bits per pixel (default: random 2-4)
    #[arg(long)]
    pub bpp: Option<u8>,

    /// Display interval (default: random 40-200)
    #[arg(long)]
    pub interval: Option<u32>,

    /// Write the encoded blob here
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub geometry: GeometryArgs,

    /// Print resolved configuration
    #[arg(long)]
    pub print_config: bool,

    /// Don't print metrics summary
    #[arg(long)]
    pub no_metrics: bool,
}

/// Resolved settings for `encode`.
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    pub frames_file: PathBuf,
    pub palette_file: PathBuf,
    pub output_file: PathBuf,
    pub c_source: Option<PathBuf>,
    pub symbol: String,
    pub geometry: Geometry,
    pub bpp: u8,
    pub interval: u32,
    pub print_config: bool,
    pub print_metrics: bool,
}

impl EncodeConfig {
    pub fn from_args(args: EncodeArgs) -> anyhow::Result<Self> {
        let geometry = args.geometry.resolve()?;
        check_bpp(args.bpp)?;
        check_byte_field("interval", args.interval)?;

        let symbol = match args.symbol {
            Some(symbol) => symbol,
            None => symbol_from_path(&args.out)?,
        };

        Ok(Self {
            frames_file: args.frames,
            palette_file: args.palette,
            output_file: args.out,
            c_source: args.c_source,
            symbol,
            geometry,
            bpp: args.bpp,
            interval: args.interval,
            print_config: args.print_config,
            print_metrics: !args.no_metrics,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Frames file:  {}", self.frames_file.display());
        println!("Palette file: {}", self.palette_file.display());
        println!("Output file:  {}", self.output_file.display());
        if let Some(path) = &self.c_source {
            println!("C source:     {} ({}_DATA)", path.display(), self.symbol);
        }
        println!();
        println!("Geometry: {}", self.geometry);
        println!("Bits per pixel: {}", self.bpp);
        println!("Interval: {}", self.interval);
        println!();
    }
}

/// Resolved settings for `inspect`.
#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub input_file: PathBuf,
    pub frames_out: Option<PathBuf>,
    pub geometry: Geometry,
}

impl InspectConfig {
    pub fn from_args(args: InspectArgs) -> anyhow::Result<Self> {
        Ok(Self {
            input_file: args.input,
            frames_out: args.frames_out,
            geometry: args.geometry.resolve()?,
        })
    }
}

/// Resolved settings for `demo`.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub seed: u64,
    pub n_frames: u32,
    pub bpp: u8,
    pub interval: u32,
    pub geometry: Geometry,
    pub output_file: Option<PathBuf>,
    pub print_config: bool,
    pub print_metrics: bool,
}

impl DemoConfig {
    /// Fill unset values from a seeded generator.
    ///
    /// With `--seed` the whole run is deterministic; without it the seed is
    /// taken from the clock.
    pub fn from_args(args: DemoArgs) -> anyhow::Result<Self> {
        let seed = match args.seed {
            Some(seed) => seed,
            None => time_seed()?,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let config = Self {
            seed,
            n_frames: args.frames.unwrap_or_else(|| rng.gen_range(8..=32)),
            bpp: args.bpp.unwrap_or_else(|| rng.gen_range(2..=4)),
            interval: args.interval.unwrap_or_else(|| rng.gen_range(40..=200)),
            geometry: args.geometry.resolve()?,
            output_file: args.out,
            print_config: args.print_config,
            print_metrics: !args.no_metrics,
        };

        check_byte_field("frame count", config.n_frames)?;
        check_byte_field("interval", config.interval)?;
        check_bpp(config.bpp)?;
        Ok(config)
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Seed: {}", self.seed);
        println!("Geometry: {}", self.geometry);
        println!("Frames: {}", self.n_frames);
        println!("Bits per pixel: {}", self.bpp);
        println!("Interval: {}", self.interval);
        if let Some(path) = &self.output_file {
            println!("Output file: {}", path.display());
        }
        println!();
    }
}

fn check_bpp(bpp: u8) -> anyhow::Result<()> {
    if !(MIN_BPP..=MAX_BPP).contains(&bpp) {
        bail!("--bpp must be between {MIN_BPP} and {MAX_BPP}, got {bpp}");
    }
    Ok(())
}

fn check_byte_field(name: &str, value: u32) -> anyhow::Result<()> {
    if !(1..=255).contains(&value) {
        bail!("{name} must be between 1 and 255, got {value}");
    }
    Ok(())
}

fn time_seed() -> anyhow::Result<u64> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the Unix epoch")?
        .as_millis();
    Ok(millis as u64)
}

/// Derive a C identifier from a file stem: `logo-spin.bin` -> `LOGO_SPIN`.
pub fn symbol_from_path(path: &Path) -> anyhow::Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("cannot derive a symbol name from {}", path.display()))?;

    let mut symbol: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if symbol.starts_with(|c: char| c.is_ascii_digit()) {
        symbol.insert(0, '_');
    }
    Ok(symbol)
}

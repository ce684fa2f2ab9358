//! animpack-core: frame-delta run-length codec for firmware animations
//!
//! This library turns a sequence of indexed-color frames into a compact blob
//! that a memory-constrained device can decode one frame at a time:
//! - The first frame is bit-packed literally
//! - Every later frame is stored as runs against the previous one
//! - A header carries frame count, display interval, bit depth and palette
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `bitio`: LSB-first bit reading/writing with byte alignment
//! - `frame`: Geometry and pixel-buffer validation
//! - `header`: Stream header and palette
//! - `run`: Run model and the greedy run planner
//! - `encoder`: Stream encoder
//! - `decoder`: Stream decoder
//! - `player`: Looping playback with a frame clock
//! - `metrics`: Per-stream encoding statistics
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and terminal for the call
//! - **Bounded memory**: The decoder holds exactly one frame
//! - **Deterministic**: Equal input always produces byte-identical output
//!
//! # Example
//! ```
//! use animpack_core::{decode_animation, encode_animation, Geometry, Header};
//!
//! let geometry = Geometry::new(4, 1).unwrap();
//! let header = Header::new(2, 50, 1, vec![0, 0, 0, 255, 255, 255]).unwrap();
//! let frames = vec![vec![0, 1, 0, 1], vec![1, 1, 0, 1]];
//!
//! let (bytes, _metrics) = encode_animation(geometry, header.clone(), &frames).unwrap();
//! let decoded = decode_animation(&bytes, geometry).unwrap();
//! assert_eq!(decoded.header, header);
//! assert_eq!(decoded.frames, frames);
//! ```

pub mod bitio;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod header;
pub mod metrics;
pub mod player;
pub mod run;

// Re-export commonly used types
pub use decoder::{decode_animation, DecodedAnimation, Decoder};
pub use encoder::{encode_animation, Encoder};
pub use error::{Error, Result};
pub use frame::Geometry;
pub use header::{Header, Palette};
pub use metrics::EncodeMetrics;
pub use player::Player;

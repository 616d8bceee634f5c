//! # baseline-jpeg
//!
//! Baseline sequential JPEG entropy coder and container writer.
//!
//! The crate takes 8x8 blocks of quantized DCT coefficients for the Y, Cb
//! and Cr planes and produces a bit-exact baseline JPEG:
//!
//! - **Bitstream** - MSB-first bit packing with 0xFF byte stuffing
//! - **Canonical Huffman** - codes built from DHT-style length counts
//! - **Entropy coding** - DC prediction plus AC run-length coding with ZRL/EOB
//! - **Quantization** - quality-scaled Annex K tables
//! - **Container** - SOI, DQT, SOF0, DHT, SOS, scan data, EOI
//!
//! Color conversion, subsampling and the forward DCT happen upstream.
//!
//! ## Quick Start
//!
//! ```no_run
//! use baseline_jpeg::{Encoder, Planes, Subsampling};
//!
//! # fn main() -> Result<(), baseline_jpeg::Error> {
//! // One 8x8 tile per plane, quantized and in zig-zag order
//! let mut y = [0i16; 64];
//! y[0] = 10;
//! let cb = [0i16; 64];
//! let cr = [0i16; 64];
//!
//! let jpeg_data = Encoder::new()
//!     .quality(50)
//!     .subsampling(Subsampling::S444)
//!     .encode_quantized(&Planes::new(&[y], &[cb], &[cr]), 8, 8)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Writing to a File
//!
//! ```no_run
//! use baseline_jpeg::{Encoder, Planes};
//!
//! # fn main() -> Result<(), baseline_jpeg::Error> {
//! # let block = [0i32; 64];
//! // Natural-order DCT output; the encoder quantizes and reorders it
//! Encoder::new()
//!     .quality(85)
//!     .encode_coefficients_to_file(&Planes::new(&[block], &[block], &[block]), 8, 8, "out.jpg")?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

// ============================================================================
// Internal modules - hidden from public docs but accessible for tests
// ============================================================================
// These modules contain the individual coding stages. They are exposed for
// testing and for callers that drive the stages by hand.

/// Bitstream writing and reading (internal).
#[doc(hidden)]
pub mod bitstream;

/// Constants and tables (internal).
#[doc(hidden)]
pub mod consts;

/// Entropy coding (internal).
#[doc(hidden)]
pub mod entropy;

/// Huffman tables (internal).
#[doc(hidden)]
pub mod huffman;

/// Marker writing (internal).
#[doc(hidden)]
pub mod marker;

/// Quantization (internal).
#[doc(hidden)]
pub mod quant;

/// Byte sinks (internal).
#[doc(hidden)]
pub mod sink;

/// Core types (internal).
#[doc(hidden)]
pub mod types;

mod encode;
mod error;

// ============================================================================
// Public API
// ============================================================================

/// Baseline JPEG encoder.
pub use encode::Encoder;

/// Error type for encoding operations.
pub use error::Error;

/// Result type alias for encoding operations.
pub use error::Result;

/// Chroma subsampling mode.
///
/// | Mode | Macroblock | Y blocks per macroblock |
/// |------|------------|-------------------------|
/// | `S444` | 8x8 | 1 |
/// | `S420` | 16x16 | 4 |
/// | `S422` | 16x8 | 2 |
pub use types::Subsampling;

/// Quantized 8x8 block and unquantized coefficient block.
pub use types::{Block, CoefBlock};

/// Y/Cb/Cr block planes in macroblock order.
pub use types::Planes;

/// Per-quality quantization tables.
pub use quant::Quantizer;

/// Byte sinks for the bit writer.
pub use sink::{BitSink, FileSink, MemorySink};

/// Number of coefficients in one block.
pub use consts::DCTSIZE2;

//! JPEG encoder pipeline.
//!
//! [`Encoder`] is a consuming builder holding the encode settings. It turns
//! block planes into a finished baseline JPEG:
//!
//! - [`Encoder::encode_quantized`] takes quantized, zig-zag ordered blocks
//!   (the output of an external DCT/quantization stage)
//! - [`Encoder::encode_coefficients`] takes unquantized DCT coefficients in
//!   natural order and runs quantization and the zig-zag reorder itself
//!
//! Inputs are validated before any byte is written, and the whole scan is
//! entropy coded into memory before the container is emitted, so a failed
//! encode never leaves a partial file behind.
//!
//! # Example
//!
//! ```no_run
//! use baseline_jpeg::{Encoder, Planes, Subsampling};
//!
//! let y = vec![[0i16; 64]; 4];
//! let cb = vec![[0i16; 64]; 1];
//! let cr = vec![[0i16; 64]; 1];
//!
//! let jpeg = Encoder::new()
//!     .quality(85)
//!     .subsampling(Subsampling::S420)
//!     .encode_quantized(&Planes::new(&y, &cb, &cr), 16, 16)
//!     .unwrap();
//! assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
//! ```

use std::io::Write;
use std::path::Path;

use log::{debug, info};

use crate::entropy::EntropyEncoder;
use crate::error::{Error, Result};
use crate::marker::{write_container, ContainerLayout};
use crate::quant::{natural_to_zigzag, Quantizer};
use crate::sink::{BitSink, FileSink};
use crate::types::{blocks_from_flat, Block, CoefBlock, Component, Planes, Subsampling};

/// Largest width or height a SOF0 header can carry.
const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Baseline JPEG encoder with configurable quality and layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    /// Quality level (1-100)
    quality: u8,
    /// Limit quantizer entries to 255
    force_baseline: bool,
    /// Chroma subsampling mode
    subsampling: Subsampling,
    /// Fixed entropy buffer size (None = growable)
    sink_capacity: Option<usize>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Create an encoder with default settings.
    ///
    /// | Setting | Default |
    /// |---------|---------|
    /// | quality | 50 |
    /// | force_baseline | true |
    /// | subsampling | 4:4:4 |
    /// | sink_capacity | growable |
    pub fn new() -> Self {
        Self {
            quality: 50,
            force_baseline: true,
            subsampling: Subsampling::S444,
            sink_capacity: None,
        }
    }

    /// Set quality level (1-100).
    ///
    /// Higher values produce larger, higher-quality images.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Force baseline-compatible (8-bit) quantization tables.
    pub fn force_baseline(mut self, enable: bool) -> Self {
        self.force_baseline = enable;
        self
    }

    /// Set chroma subsampling mode.
    pub fn subsampling(mut self, mode: Subsampling) -> Self {
        self.subsampling = mode;
        self
    }

    /// Bound the entropy-coded buffer to a fixed number of bytes.
    ///
    /// `None` (the default) lets the buffer grow. With `Some(n)`, a scan
    /// that needs more than `n` bytes fails with
    /// [`Error::StreamCapacityExceeded`].
    pub fn sink_capacity(mut self, capacity: Option<usize>) -> Self {
        self.sink_capacity = capacity;
        self
    }

    /// Rough upper bound for the entropy-coded size: two bytes per pixel.
    pub fn heuristic_capacity(width: u32, height: u32) -> usize {
        (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(2)
    }

    /// Quantization tables for the current settings.
    pub fn quantizer(&self) -> Quantizer {
        Quantizer::new(self.quality, self.force_baseline)
    }

    /// Check frame dimensions and return them as SOF0 fields.
    fn validate_dimensions(width: u32, height: u32) -> Result<(u16, u16)> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok((width as u16, height as u16))
    }

    // ========================================================================
    // Quantized input
    // ========================================================================

    /// Encode quantized, zig-zag ordered blocks to JPEG.
    ///
    /// # Arguments
    /// * `planes` - Y, Cb and Cr blocks in macroblock order
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    ///
    /// # Returns
    /// JPEG-encoded data as a `Vec<u8>`.
    pub fn encode_quantized(
        &self,
        planes: &Planes<'_, Block>,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.encode_quantized_to_writer(planes, width, height, &mut output)?;
        Ok(output)
    }

    /// Encode flat arrays of quantized, zig-zag ordered coefficients.
    ///
    /// Each plane is a run of 64-value blocks in macroblock order, as
    /// produced by an external quantization stage.
    pub fn encode_quantized_flat(
        &self,
        y: &[i16],
        cb: &[i16],
        cr: &[i16],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let y = blocks_from_flat(Component::Y, y)?;
        let cb = blocks_from_flat(Component::Cb, cb)?;
        let cr = blocks_from_flat(Component::Cr, cr)?;
        self.encode_quantized(&Planes::new(&y, &cb, &cr), width, height)
    }

    /// Encode quantized, zig-zag ordered blocks to a writer.
    ///
    /// Returns the number of bytes written. Nothing is written when
    /// validation or entropy coding fails.
    pub fn encode_quantized_to_writer<W: Write>(
        &self,
        planes: &Planes<'_, Block>,
        width: u32,
        height: u32,
        output: W,
    ) -> Result<usize> {
        let dims = self.validate(planes, width, height)?;
        let entropy = self.entropy_pass(planes, width, height)?;
        self.write_jpeg(&self.quantizer(), &entropy, dims, output)
    }

    /// Encode quantized, zig-zag ordered blocks to a file.
    ///
    /// The file is only created once the scan has been coded.
    pub fn encode_quantized_to_file<P: AsRef<Path>>(
        &self,
        planes: &Planes<'_, Block>,
        width: u32,
        height: u32,
        path: P,
    ) -> Result<usize> {
        let jpeg = self.encode_quantized(planes, width, height)?;
        write_file(path.as_ref(), &jpeg)
    }

    // ========================================================================
    // Unquantized input
    // ========================================================================

    /// Encode natural-order DCT coefficients to JPEG.
    ///
    /// Each block is quantized with the luminance or chrominance table and
    /// reordered to zig-zag before entropy coding.
    pub fn encode_coefficients(
        &self,
        planes: &Planes<'_, CoefBlock>,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.encode_coefficients_to_writer(planes, width, height, &mut output)?;
        Ok(output)
    }

    /// Encode natural-order DCT coefficients to a writer.
    pub fn encode_coefficients_to_writer<W: Write>(
        &self,
        planes: &Planes<'_, CoefBlock>,
        width: u32,
        height: u32,
        output: W,
    ) -> Result<usize> {
        let dims = self.validate(planes, width, height)?;
        let quantizer = self.quantizer();

        let quantize = |blocks: &[CoefBlock], luminance: bool| -> Vec<Block> {
            blocks
                .iter()
                .map(|block| natural_to_zigzag(&quantizer.quantize(block, luminance)))
                .collect()
        };
        let y = quantize(planes.y, true);
        let cb = quantize(planes.cb, false);
        let cr = quantize(planes.cr, false);

        let entropy = self.entropy_pass(&Planes::new(&y, &cb, &cr), width, height)?;
        self.write_jpeg(&quantizer, &entropy, dims, output)
    }

    /// Encode natural-order DCT coefficients to a file.
    ///
    /// The file is only created once the scan has been coded.
    pub fn encode_coefficients_to_file<P: AsRef<Path>>(
        &self,
        planes: &Planes<'_, CoefBlock>,
        width: u32,
        height: u32,
        path: P,
    ) -> Result<usize> {
        let jpeg = self.encode_coefficients(planes, width, height)?;
        write_file(path.as_ref(), &jpeg)
    }

    // ========================================================================
    // Pipeline stages
    // ========================================================================

    fn validate<B>(&self, planes: &Planes<'_, B>, width: u32, height: u32) -> Result<(u16, u16)> {
        let dims = Self::validate_dimensions(width, height)?;
        planes.validate(width, height, self.subsampling)?;
        debug!(
            "encoding {}x{} {:?} quality={} baseline={}",
            width, height, self.subsampling, self.quality, self.force_baseline
        );
        Ok(dims)
    }

    /// Entropy code the whole scan into memory.
    fn entropy_pass(&self, planes: &Planes<'_, Block>, width: u32, height: u32) -> Result<Vec<u8>> {
        let mut encoder = match self.sink_capacity {
            Some(capacity) => EntropyEncoder::with_fixed_capacity(capacity)?,
            None => EntropyEncoder::new()?,
        };
        encoder.encode_planes(planes, width, height, self.subsampling)?;
        encoder.finish()
    }

    fn write_jpeg<W: Write>(
        &self,
        quantizer: &Quantizer,
        entropy: &[u8],
        (width, height): (u16, u16),
        output: W,
    ) -> Result<usize> {
        let layout = ContainerLayout {
            width,
            height,
            subsampling: self.subsampling,
            luma_quant: quantizer.table(true),
            chroma_quant: quantizer.table(false),
            entropy_data: entropy,
        };
        let written = write_container(output, &layout)?;

        let raw = width as usize * height as usize * 3;
        info!(
            "encoded {}x{} into {} bytes ({} scan bytes, ratio {:.2}:1)",
            width,
            height,
            written,
            entropy.len(),
            raw as f64 / written as f64
        );
        Ok(written)
    }
}

/// Commit finished JPEG bytes to a file through a [`FileSink`].
fn write_file(path: &Path, jpeg: &[u8]) -> Result<usize> {
    let mut sink = FileSink::create(path)?;
    for &byte in jpeg {
        sink.put_byte(byte)?;
    }
    sink.flush()?;
    debug!("wrote {} bytes to {}", jpeg.len(), path.display());
    Ok(jpeg.len())
}

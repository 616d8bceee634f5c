//! JPEG marker emission for encoding.
//!
//! This module handles writing the baseline container:
//! - SOI (Start of Image)
//! - DQT (Define Quantization Table)
//! - SOF0 (Baseline Start of Frame)
//! - DHT (Define Huffman Table)
//! - SOS (Start of Scan)
//! - EOI (End of Image)
//!
//! Every length field counts its own two bytes and the payload, never the
//! marker. No APP0/JFIF segment and no restart markers are written.
//!
//! Reference: ITU-T T.81 Section B

use std::io::Write;

use crate::consts::{
    DCTSIZE2, JPEG_DHT, JPEG_DQT, JPEG_EOI, JPEG_NATURAL_ORDER, JPEG_SOF0, JPEG_SOI, JPEG_SOS,
};
use crate::error::Result;
use crate::huffman::HuffTable;
use crate::types::{create_ycbcr_components, ComponentInfo, Subsampling};

/// Sample precision of a baseline frame.
const BASELINE_PRECISION: u8 = 8;

/// Marker writer for JPEG encoding.
pub struct MarkerWriter<W: Write> {
    output: W,
    bytes_written: usize,
}

impl<W: Write> MarkerWriter<W> {
    /// Create a new marker writer.
    pub fn new(output: W) -> Self {
        Self {
            output,
            bytes_written: 0,
        }
    }

    /// Write a single byte.
    fn emit_byte(&mut self, byte: u8) -> Result<()> {
        self.output.write_all(&[byte])?;
        self.bytes_written += 1;
        Ok(())
    }

    /// Write a 2-byte value in big-endian order.
    fn emit_2bytes(&mut self, value: u16) -> Result<()> {
        self.emit_byte((value >> 8) as u8)?;
        self.emit_byte(value as u8)
    }

    /// Write a marker (0xFF followed by marker code).
    fn emit_marker(&mut self, marker: u8) -> Result<()> {
        self.emit_byte(0xFF)?;
        self.emit_byte(marker)
    }

    /// Write Start of Image marker.
    pub fn write_soi(&mut self) -> Result<()> {
        self.emit_marker(JPEG_SOI)
    }

    /// Write End of Image marker.
    pub fn write_eoi(&mut self) -> Result<()> {
        self.emit_marker(JPEG_EOI)
    }

    /// Write one Define Quantization Table segment.
    ///
    /// # Arguments
    /// * `table_index` - Table slot (0-3)
    /// * `table` - 64 quantization values in natural order; they are
    ///   emitted in zig-zag order
    ///
    /// Entries above 255 switch the segment to 16-bit precision.
    pub fn write_dqt(&mut self, table_index: u8, table: &[u16; DCTSIZE2]) -> Result<()> {
        let use_16bit = table.iter().any(|&v| v > 255);
        let entry_bytes = if use_16bit { 2 } else { 1 };

        self.emit_marker(JPEG_DQT)?;
        // Length: 2 (length) + 1 (Pq/Tq) + 64 entries
        self.emit_2bytes(2 + 1 + (DCTSIZE2 * entry_bytes) as u16)?;

        // Pq (precision) in high nibble, Tq (table index) in low nibble
        let pq = if use_16bit { 0x10 } else { 0x00 };
        self.emit_byte(pq | (table_index & 0x0F))?;

        for &natural in JPEG_NATURAL_ORDER.iter() {
            let value = table[natural];
            if use_16bit {
                self.emit_2bytes(value)?;
            } else {
                self.emit_byte(value as u8)?;
            }
        }
        Ok(())
    }

    /// Write the baseline Start of Frame marker.
    ///
    /// # Arguments
    /// * `height` - Image height in pixels
    /// * `width` - Image width in pixels
    /// * `components` - Component information
    pub fn write_sof0(
        &mut self,
        height: u16,
        width: u16,
        components: &[ComponentInfo],
    ) -> Result<()> {
        self.emit_marker(JPEG_SOF0)?;

        // Length: 2 (length) + 1 (precision) + 2 (height) + 2 (width) +
        //         1 (num_components) + 3 * num_components
        let num_components = components.len() as u16;
        self.emit_2bytes(8 + 3 * num_components)?;

        self.emit_byte(BASELINE_PRECISION)?;
        self.emit_2bytes(height)?;
        self.emit_2bytes(width)?;
        self.emit_byte(num_components as u8)?;

        for comp in components {
            self.emit_byte(comp.component_id)?;
            self.emit_byte(comp.sampling_byte())?;
            self.emit_byte(comp.quant_tbl_no)?;
        }
        Ok(())
    }

    /// Write one Define Huffman Table segment.
    ///
    /// # Arguments
    /// * `table_index` - Table slot (0-3)
    /// * `is_ac` - True for AC table, false for DC table
    /// * `table` - Huffman table
    pub fn write_dht(&mut self, table_index: u8, is_ac: bool, table: &HuffTable) -> Result<()> {
        let symbols = table.symbols();

        self.emit_marker(JPEG_DHT)?;
        // Length: 2 (length) + 1 (Tc/Th) + 16 (counts) + symbols
        self.emit_2bytes(2 + 1 + 16 + symbols.len() as u16)?;

        // Tc (table class) in high nibble, Th (table index) in low nibble
        let tc = if is_ac { 0x10 } else { 0x00 };
        self.emit_byte(tc | (table_index & 0x0F))?;

        for &count in table.counts() {
            self.emit_byte(count)?;
        }
        for &symbol in symbols {
            self.emit_byte(symbol)?;
        }
        Ok(())
    }

    /// Write the Start of Scan marker for a single interleaved
    /// sequential scan over `components`.
    pub fn write_sos(&mut self, components: &[ComponentInfo]) -> Result<()> {
        self.emit_marker(JPEG_SOS)?;

        // Length: 2 (length) + 1 (Ns) + 2*Ns (component specs) + 3 (Ss, Se, Ah/Al)
        let num_components = components.len() as u16;
        self.emit_2bytes(6 + 2 * num_components)?;
        self.emit_byte(num_components as u8)?;

        for comp in components {
            self.emit_byte(comp.component_id)?;
            self.emit_byte(comp.table_selector_byte())?;
        }

        // Full spectrum, no successive approximation
        self.emit_byte(0)?;
        self.emit_byte(63)?;
        self.emit_byte(0)?;
        Ok(())
    }

    /// Write already byte-stuffed entropy-coded data verbatim.
    pub fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.output.write_all(data)?;
        self.bytes_written += data.len();
        Ok(())
    }

    /// Flush the underlying output.
    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }

    /// Get total bytes written.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Consume the writer and return the underlying output.
    pub fn into_inner(self) -> W {
        self.output
    }
}

/// Everything the container needs around the entropy-coded payload.
#[derive(Debug, Clone, Copy)]
pub struct ContainerLayout<'a> {
    /// Image width in pixels
    pub width: u16,
    /// Image height in pixels
    pub height: u16,
    /// Chroma subsampling mode (decides the Y sampling byte)
    pub subsampling: Subsampling,
    /// Luminance quantization table, natural order
    pub luma_quant: &'a [u16; DCTSIZE2],
    /// Chrominance quantization table, natural order
    pub chroma_quant: &'a [u16; DCTSIZE2],
    /// Entropy-coded, byte-stuffed scan data
    pub entropy_data: &'a [u8],
}

/// Write a complete baseline JPEG with the standard Huffman tables.
///
/// Segment order: SOI, DQT (luma, chroma), SOF0, DHT (AC luma, AC chroma,
/// DC luma, DC chroma), SOS, scan data, EOI.
///
/// Returns the number of bytes written.
pub fn write_container<W: Write>(output: W, layout: &ContainerLayout<'_>) -> Result<usize> {
    let components = create_ycbcr_components(layout.subsampling);
    let mut writer = MarkerWriter::new(output);

    writer.write_soi()?;

    writer.write_dqt(0, layout.luma_quant)?;
    writer.write_dqt(1, layout.chroma_quant)?;

    writer.write_sof0(layout.height, layout.width, &components)?;

    writer.write_dht(0, true, &HuffTable::std_ac_luminance())?;
    writer.write_dht(1, true, &HuffTable::std_ac_chrominance())?;
    writer.write_dht(0, false, &HuffTable::std_dc_luminance())?;
    writer.write_dht(1, false, &HuffTable::std_dc_chrominance())?;

    writer.write_sos(&components)?;
    writer.write_raw(layout.entropy_data)?;
    writer.write_eoi()?;
    writer.flush()?;

    Ok(writer.bytes_written())
}

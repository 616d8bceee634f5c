//! Quantization tables and block quantization.
//!
//! Tables are derived from the Annex K bases with the IJG quality
//! scaling: quality 50 reproduces the base table, qualities above 50 scale
//! down linearly to all-ones at 100, qualities below 50 scale up as
//! `5000 / quality`.

use log::debug;

use crate::consts::{
    DCTSIZE2, JPEG_NATURAL_ORDER, STD_CHROMINANCE_QUANT_TBL, STD_LUMINANCE_QUANT_TBL, ZIGZAG_ORDER,
};
use crate::types::{Block, CoefBlock};

/// Largest quantizer value a 16-bit DQT entry can carry.
pub const MAX_QUANT_VALUE: u32 = 32767;

/// Largest quantizer value allowed in a baseline (8-bit) DQT entry.
pub const MAX_BASELINE_QUANT_VALUE: u32 = 255;

/// Convert quality (1-100) to a scaling percentage.
pub fn quality_scaling(quality: u8) -> u32 {
    let quality = quality.clamp(1, 100) as u32;
    if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    }
}

/// Scale a base table by a percentage, clamping every entry.
pub fn scale_quant_table(
    base: &[u16; DCTSIZE2],
    scale: u32,
    force_baseline: bool,
) -> [u16; DCTSIZE2] {
    let max = if force_baseline {
        MAX_BASELINE_QUANT_VALUE
    } else {
        MAX_QUANT_VALUE
    };
    base.map(|b| ((b as u32 * scale + 50) / 100).clamp(1, max) as u16)
}

/// Derive the quantization table for one plane class, natural order.
pub fn derive_quant_table(quality: u8, luminance: bool, force_baseline: bool) -> [u16; DCTSIZE2] {
    let base = if luminance {
        &STD_LUMINANCE_QUANT_TBL
    } else {
        &STD_CHROMINANCE_QUANT_TBL
    };
    scale_quant_table(base, quality_scaling(quality), force_baseline)
}

/// Divide each coefficient by its quantizer, truncating toward zero.
///
/// Both the coefficients and the table are in natural order.
pub fn quantize_block(coeffs: &CoefBlock, table: &[u16; DCTSIZE2]) -> Block {
    let mut out = [0i16; DCTSIZE2];
    for ((o, &c), &q) in out.iter_mut().zip(coeffs.iter()).zip(table.iter()) {
        *o = (c / q as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
    out
}

/// Multiply each quantized coefficient back by its quantizer.
pub fn dequantize_block(block: &Block, table: &[u16; DCTSIZE2]) -> CoefBlock {
    let mut out = [0i32; DCTSIZE2];
    for ((o, &c), &q) in out.iter_mut().zip(block.iter()).zip(table.iter()) {
        *o = c as i32 * q as i32;
    }
    out
}

/// Reorder a natural-order block into zig-zag scan order.
pub fn natural_to_zigzag<T: Copy + Default>(natural: &[T; DCTSIZE2]) -> [T; DCTSIZE2] {
    let mut out = [T::default(); DCTSIZE2];
    for (o, &idx) in out.iter_mut().zip(JPEG_NATURAL_ORDER.iter()) {
        *o = natural[idx];
    }
    out
}

/// Inverse of [`natural_to_zigzag`].
pub fn zigzag_to_natural<T: Copy + Default>(zigzag: &[T; DCTSIZE2]) -> [T; DCTSIZE2] {
    let mut out = [T::default(); DCTSIZE2];
    for (o, &pos) in out.iter_mut().zip(ZIGZAG_ORDER.iter()) {
        *o = zigzag[pos];
    }
    out
}

/// Quantization tables for one (quality, baseline) setting.
///
/// Tables are derived once and only recomputed when the setting changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantizer {
    quality: u8,
    force_baseline: bool,
    luma: [u16; DCTSIZE2],
    chroma: [u16; DCTSIZE2],
}

impl Quantizer {
    /// Derive both tables for `quality` (clamped to 1-100).
    pub fn new(quality: u8, force_baseline: bool) -> Self {
        let quality = quality.clamp(1, 100);
        debug!(
            "deriving quantization tables: quality={} scale={}% baseline={}",
            quality,
            quality_scaling(quality),
            force_baseline
        );
        Self {
            quality,
            force_baseline,
            luma: derive_quant_table(quality, true, force_baseline),
            chroma: derive_quant_table(quality, false, force_baseline),
        }
    }

    /// Change the setting; a no-op when nothing changed.
    pub fn set_quality(&mut self, quality: u8, force_baseline: bool) {
        let quality = quality.clamp(1, 100);
        if quality == self.quality && force_baseline == self.force_baseline {
            return;
        }
        *self = Self::new(quality, force_baseline);
    }

    /// Effective quality.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Whether entries are limited to 255.
    pub fn force_baseline(&self) -> bool {
        self.force_baseline
    }

    /// Table for a plane class, natural order.
    pub fn table(&self, luminance: bool) -> &[u16; DCTSIZE2] {
        if luminance {
            &self.luma
        } else {
            &self.chroma
        }
    }

    /// Quantize a natural-order block with the plane's table.
    pub fn quantize(&self, coeffs: &CoefBlock, luminance: bool) -> Block {
        quantize_block(coeffs, self.table(luminance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_scaling() {
        assert_eq!(quality_scaling(1), 5000);
        assert_eq!(quality_scaling(25), 200);
        assert_eq!(quality_scaling(50), 100);
        assert_eq!(quality_scaling(75), 50);
        assert_eq!(quality_scaling(100), 0);
        // Out of range clamps
        assert_eq!(quality_scaling(0), 5000);
        assert_eq!(quality_scaling(200), 0);
    }

    #[test]
    fn test_quality_50_is_base_table() {
        assert_eq!(derive_quant_table(50, true, false), STD_LUMINANCE_QUANT_TBL);
        assert_eq!(
            derive_quant_table(50, false, false),
            STD_CHROMINANCE_QUANT_TBL
        );
    }

    #[test]
    fn test_quality_100_is_all_ones() {
        assert!(derive_quant_table(100, true, false).iter().all(|&q| q == 1));
        assert!(derive_quant_table(100, false, true).iter().all(|&q| q == 1));
    }

    #[test]
    fn test_quality_75_rounding() {
        let table = derive_quant_table(75, true, true);
        // (16 * 50 + 50) / 100 = 8, (11 * 50 + 50) / 100 = 6
        assert_eq!(table[0], 8);
        assert_eq!(table[1], 6);
    }

    #[test]
    fn test_baseline_clamp() {
        let unclamped = derive_quant_table(1, true, false);
        let clamped = derive_quant_table(1, true, true);
        assert_eq!(unclamped[0], 800);
        assert!(unclamped.iter().any(|&q| q > 255));
        assert!(clamped.iter().all(|&q| q <= 255));
        assert!(unclamped.iter().all(|&q| q <= 32767));
    }

    #[test]
    fn test_quantize_truncates_toward_zero() {
        let mut coeffs = [0i32; DCTSIZE2];
        coeffs[0] = 37;
        coeffs[1] = -37;
        coeffs[2] = 9;
        coeffs[3] = -9;
        let table = [10u16; DCTSIZE2];
        let q = quantize_block(&coeffs, &table);
        assert_eq!(&q[..4], &[3, -3, 0, 0]);

        let back = dequantize_block(&q, &table);
        assert_eq!(&back[..2], &[30, -30]);
    }

    #[test]
    fn test_zigzag_reorder() {
        let mut natural = [0i16; DCTSIZE2];
        for (i, c) in natural.iter_mut().enumerate() {
            *c = i as i16;
        }
        let zigzag = natural_to_zigzag(&natural);
        // Row 0 col 1, then row 1 col 0, then row 2 col 0
        assert_eq!(&zigzag[..4], &[0, 1, 8, 16]);
        assert_eq!(zigzag[63], 63);
        assert_eq!(zigzag_to_natural(&zigzag), natural);

        let table = natural_to_zigzag(&STD_LUMINANCE_QUANT_TBL);
        assert_eq!(&table[..6], &[16, 11, 12, 14, 12, 10]);
    }

    #[test]
    fn test_quantizer_caches_tables() {
        let mut quantizer = Quantizer::new(50, true);
        assert_eq!(quantizer.table(true), &STD_LUMINANCE_QUANT_TBL);

        quantizer.set_quality(50, true);
        assert_eq!(quantizer.quality(), 50);

        quantizer.set_quality(100, true);
        assert_eq!(quantizer.quality(), 100);
        assert!(quantizer.table(false).iter().all(|&q| q == 1));

        quantizer.set_quality(0, false);
        assert_eq!(quantizer.quality(), 1);
        assert!(!quantizer.force_baseline());
    }

    #[test]
    fn test_quantizer_uses_plane_table() {
        let quantizer = Quantizer::new(50, true);
        let coeffs = [170i32; DCTSIZE2];
        let luma = quantizer.quantize(&coeffs, true);
        let chroma = quantizer.quantize(&coeffs, false);
        assert_eq!(luma[0], 170 / 16);
        assert_eq!(chroma[0], 170 / 17);
    }
}

//! Core type definitions for the baseline encoder.
//!
//! Blocks, planes, component descriptors and the chroma subsampling layout
//! that decides how blocks are grouped into macroblocks (MCUs).

use crate::consts::{DCTSIZE, DCTSIZE2, NUM_COMPONENTS};
use crate::error::{Error, Result};

/// One quantized 8x8 block, 16-bit coefficients.
///
/// Order depends on the stage: natural (row-major) after quantization,
/// zig-zag once it is handed to the entropy coder.
pub type Block = [i16; DCTSIZE2];

/// One unquantized 8x8 block of DCT output in natural order.
pub type CoefBlock = [i32; DCTSIZE2];

// =============================================================================
// Sampling Factor / Subsampling
// =============================================================================

/// Chroma subsampling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subsampling {
    /// 4:4:4 - No subsampling, one Y/Cb/Cr triple per 8x8 tile
    #[default]
    S444,
    /// 4:2:0 - Four Y blocks plus one Cb and one Cr per 16x16 tile
    S420,
    /// 4:2:2 - Two Y blocks plus one Cb and one Cr per 16x8 tile
    S422,
}

impl Subsampling {
    /// Parse the numeric format code used on command lines (444, 420, 422).
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            444 => Ok(Subsampling::S444),
            420 => Ok(Subsampling::S420),
            422 => Ok(Subsampling::S422),
            other => Err(Error::UnsupportedFormat(other)),
        }
    }

    /// Returns (h_samp_factor, v_samp_factor) for the luminance component.
    pub const fn luma_factors(self) -> (u8, u8) {
        match self {
            Subsampling::S444 => (1, 1),
            Subsampling::S420 => (2, 2),
            Subsampling::S422 => (2, 1),
        }
    }

    /// Returns (h_samp_factor, v_samp_factor) for the chroma components.
    pub const fn chroma_factors(self) -> (u8, u8) {
        (1, 1)
    }

    /// Number of Y blocks in one macroblock.
    pub const fn luma_blocks_per_mcu(self) -> usize {
        let (h, v) = self.luma_factors();
        h as usize * v as usize
    }

    /// Macroblock size in pixels (width, height).
    pub const fn mcu_size(self) -> (usize, usize) {
        let (h, v) = self.luma_factors();
        (DCTSIZE * h as usize, DCTSIZE * v as usize)
    }

    /// Number of macroblocks covering a `width` x `height` image.
    pub fn mcu_count(self, width: u32, height: u32) -> usize {
        let (mcu_w, mcu_h) = self.mcu_size();
        (width as usize).div_ceil(mcu_w) * (height as usize).div_ceil(mcu_h)
    }
}

impl TryFrom<u32> for Subsampling {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        Subsampling::from_code(code)
    }
}

// =============================================================================
// Components
// =============================================================================

/// Color component of a YCbCr image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Luminance
    Y,
    /// Blue-difference chroma (U)
    Cb,
    /// Red-difference chroma (V)
    Cr,
}

impl Component {
    /// All components in frame order.
    pub const ALL: [Component; NUM_COMPONENTS] = [Component::Y, Component::Cb, Component::Cr];

    /// Index into per-component state (0, 1, 2).
    pub const fn index(self) -> usize {
        match self {
            Component::Y => 0,
            Component::Cb => 1,
            Component::Cr => 2,
        }
    }

    /// True for the component coded with the luminance tables.
    pub const fn is_luma(self) -> bool {
        matches!(self, Component::Y)
    }

    /// Short name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Component::Y => "Y",
            Component::Cb => "Cb",
            Component::Cr => "Cr",
        }
    }
}

/// Per-component frame and scan parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Component identifier written to SOF0/SOS (1 = Y, 2 = Cb, 3 = Cr)
    pub component_id: u8,
    /// Horizontal sampling factor (1-2)
    pub h_samp_factor: u8,
    /// Vertical sampling factor (1-2)
    pub v_samp_factor: u8,
    /// Quantization table slot
    pub quant_tbl_no: u8,
    /// DC Huffman table slot
    pub dc_tbl_no: u8,
    /// AC Huffman table slot
    pub ac_tbl_no: u8,
}

impl ComponentInfo {
    /// Sampling byte for SOF0: `(H << 4) | V`.
    pub const fn sampling_byte(&self) -> u8 {
        (self.h_samp_factor << 4) | self.v_samp_factor
    }

    /// Table selector byte for SOS: `(DC << 4) | AC`.
    pub const fn table_selector_byte(&self) -> u8 {
        (self.dc_tbl_no << 4) | self.ac_tbl_no
    }
}

/// Build the Y/Cb/Cr component descriptors for a subsampling mode.
///
/// Y uses table slot 0 everywhere, Cb and Cr share slot 1.
pub fn create_ycbcr_components(subsampling: Subsampling) -> [ComponentInfo; NUM_COMPONENTS] {
    let (luma_h, luma_v) = subsampling.luma_factors();
    let (chroma_h, chroma_v) = subsampling.chroma_factors();
    Component::ALL.map(|component| {
        let slot = if component.is_luma() { 0 } else { 1 };
        let (h, v) = if component.is_luma() {
            (luma_h, luma_v)
        } else {
            (chroma_h, chroma_v)
        };
        ComponentInfo {
            component_id: component.index() as u8 + 1,
            h_samp_factor: h,
            v_samp_factor: v,
            quant_tbl_no: slot,
            dc_tbl_no: slot,
            ac_tbl_no: slot,
        }
    })
}

// =============================================================================
// Planes
// =============================================================================

/// Three block planes (Y, Cb, Cr) laid out in macroblock order.
///
/// For 4:2:0 each macroblock contributes four consecutive Y blocks
/// (top-left, top-right, bottom-left, bottom-right); for 4:2:2 two
/// (left, right). Cb and Cr contribute one block per macroblock.
#[derive(Debug, Clone, Copy)]
pub struct Planes<'a, B> {
    /// Luminance blocks
    pub y: &'a [B],
    /// Cb (U) blocks
    pub cb: &'a [B],
    /// Cr (V) blocks
    pub cr: &'a [B],
}

impl<'a, B> Planes<'a, B> {
    /// Bundle three planes.
    pub fn new(y: &'a [B], cb: &'a [B], cr: &'a [B]) -> Self {
        Self { y, cb, cr }
    }

    /// Plane for a component.
    pub fn plane(&self, component: Component) -> &'a [B] {
        match component {
            Component::Y => self.y,
            Component::Cb => self.cb,
            Component::Cr => self.cr,
        }
    }

    /// Check the plane lengths against the macroblock layout.
    ///
    /// Returns the macroblock count on success.
    pub fn validate(&self, width: u32, height: u32, subsampling: Subsampling) -> Result<usize> {
        let mcus = subsampling.mcu_count(width, height);
        for component in Component::ALL {
            let per_mcu = if component.is_luma() {
                subsampling.luma_blocks_per_mcu()
            } else {
                1
            };
            let expected = mcus * per_mcu;
            let actual = self.plane(component).len();
            if actual != expected {
                return Err(Error::BlockCountMismatch {
                    component: component.name(),
                    expected,
                    actual,
                });
            }
        }
        Ok(mcus)
    }
}

/// Split a flat coefficient array into 64-element blocks.
///
/// Fails when the length is not a multiple of 64.
pub fn blocks_from_flat(component: Component, flat: &[i16]) -> Result<Vec<Block>> {
    if flat.len() % DCTSIZE2 != 0 {
        return Err(Error::PartialBlock {
            component: component.name(),
            len: flat.len(),
        });
    }
    Ok(
        flat.chunks_exact(DCTSIZE2)
            .map(|chunk| {
                let mut block = [0i16; DCTSIZE2];
                block.copy_from_slice(chunk);
                block
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Subsampling::from_code(444), Ok(Subsampling::S444));
        assert_eq!(Subsampling::from_code(420), Ok(Subsampling::S420));
        assert_eq!(Subsampling::try_from(422), Ok(Subsampling::S422));
        assert_eq!(
            Subsampling::from_code(411),
            Err(Error::UnsupportedFormat(411))
        );
    }

    #[test]
    fn test_mcu_count_rounds_up() {
        assert_eq!(Subsampling::S444.mcu_count(8, 8), 1);
        assert_eq!(Subsampling::S444.mcu_count(17, 9), 3 * 2);
        assert_eq!(Subsampling::S420.mcu_count(17, 9), 2);
        assert_eq!(Subsampling::S422.mcu_count(17, 9), 2 * 2);
    }

    #[test]
    fn test_components_sampling_bytes() {
        let expected = [
            (Subsampling::S444, 0x11),
            (Subsampling::S420, 0x22),
            (Subsampling::S422, 0x21),
        ];
        for (mode, luma_byte) in expected {
            let comps = create_ycbcr_components(mode);
            assert_eq!(comps[0].sampling_byte(), luma_byte);
            assert_eq!(comps[1].sampling_byte(), 0x11);
            assert_eq!(comps[2].sampling_byte(), 0x11);
            assert_eq!(comps[0].table_selector_byte(), 0x00);
            assert_eq!(comps[1].table_selector_byte(), 0x11);
            assert_eq!(comps[2].table_selector_byte(), 0x11);
            assert_eq!(comps.map(|c| c.component_id), [1, 2, 3]);
        }
    }

    #[test]
    fn test_validate_plane_lengths() {
        let y = vec![[0i16; DCTSIZE2]; 4];
        let c = vec![[0i16; DCTSIZE2]; 1];
        let planes = Planes::new(&y, &c, &c);
        assert_eq!(planes.validate(16, 16, Subsampling::S420), Ok(1));
        assert_eq!(
            planes.validate(16, 16, Subsampling::S444),
            Err(Error::BlockCountMismatch {
                component: "Cb",
                expected: 4,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_blocks_from_flat() {
        let flat: Vec<i16> = (0..128).collect();
        let blocks = blocks_from_flat(Component::Y, &flat).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1][0], 64);
        assert_eq!(
            blocks_from_flat(Component::Cr, &flat[..100]),
            Err(Error::PartialBlock {
                component: "Cr",
                len: 100
            })
        );
    }
}

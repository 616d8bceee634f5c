//! Huffman entropy coding for baseline JPEG.
//!
//! This module implements the sequential Huffman scheme for quantized,
//! zig-zag ordered blocks:
//! - DC coefficient encoding with differential coding (one predictor per
//!   component)
//! - AC coefficient encoding with run-length coding
//! - EOB (End of Block) and ZRL (Zero Run Length) symbols
//!
//! [`EntropyDecoder`] is the mirror image, used to check encoder output.
//!
//! Reference: ITU-T T.81 Section F.1.2

use log::{debug, trace};

use crate::bitstream::{BitReader, BitWriter};
use crate::consts::{DCTSIZE2, NUM_COMPONENTS};
use crate::error::{Error, Result};
use crate::huffman::{DecodeTable, DerivedTable, HuffTable};
use crate::sink::{BitSink, MemorySink};
use crate::types::{Block, Component, Planes, Subsampling};

/// EOB (End of Block) symbol - encodes as run=0, size=0
pub const EOB: u8 = 0x00;

/// ZRL (Zero Run Length 16) symbol - run=15, size=0
pub const ZRL: u8 = 0xF0;

/// Largest category the 4-bit size nibble can carry.
const MAX_CATEGORY: u8 = 15;

/// Calculate the number of bits needed to represent a value.
///
/// This is the "category" in JPEG terminology:
/// - 0 → 0 bits (value must be 0)
/// - 1 → 1 bit (values -1, 1)
/// - 2 → 2 bits (values -3..-2, 2..3)
/// - etc.
#[inline]
pub fn jpeg_nbits(value: i32) -> u8 {
    32 - value.unsigned_abs().leading_zeros() as u8
}

/// Split a value into its category and value bits.
///
/// Negative values are sent as `2^s - 1 - |v|`, so the top value bit
/// carries the sign. Every `i32` is accepted; categories above 15 are
/// rejected later when the symbol is looked up.
#[inline]
pub fn category_encode(value: i32) -> (u8, u32) {
    let size = jpeg_nbits(value);
    if value >= 0 {
        return (size, value as u32);
    }
    let mask = u32::MAX >> (32 - size as u32);
    (size, mask - value.unsigned_abs())
}

/// Inverse of [`category_encode`].
#[inline]
pub fn category_decode(size: u8, bits: u32) -> i32 {
    if size == 0 {
        return 0;
    }
    if bits & (1 << (size - 1)) != 0 {
        bits as i32
    } else {
        bits as i32 - ((1i32 << size) - 1)
    }
}

/// One AC run-length record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLengthItem {
    /// Zeros preceding this coefficient (0-15)
    pub run: u8,
    /// Magnitude category (0 only for EOB/ZRL)
    pub size: u8,
    /// Value bits, right-aligned
    pub bits: u32,
}

impl RunLengthItem {
    /// The End-Of-Block sentinel.
    pub const EOB: RunLengthItem = RunLengthItem {
        run: 0,
        size: 0,
        bits: 0,
    };

    /// The 16-zero sentinel.
    pub const ZRL: RunLengthItem = RunLengthItem {
        run: 15,
        size: 0,
        bits: 0,
    };

    /// AC Huffman symbol: `(run << 4) | size`.
    #[inline]
    pub fn symbol(&self) -> u8 {
        (self.run << 4) | (self.size & 0x0F)
    }

    /// True for the EOB sentinel.
    pub fn is_eob(&self) -> bool {
        *self == Self::EOB
    }

    /// True for the ZRL sentinel.
    pub fn is_zrl(&self) -> bool {
        *self == Self::ZRL
    }
}

/// Run-length code the 63 AC terms of a zig-zag ordered block.
///
/// `items` is cleared first. A zero run reaching 15 is closed by the next
/// coefficient whatever its value, which yields a ZRL when that coefficient
/// is zero. When the block ends in zeros, everything after the last nonzero
/// term is replaced by a single EOB, so ZRLs never precede an EOB.
pub fn run_length_items(block: &Block, items: &mut Vec<RunLengthItem>) {
    items.clear();
    let mut run = 0u8;
    let mut eob_index = 0usize;

    for &coef in &block[1..] {
        if coef == 0 && run < 15 {
            run += 1;
            continue;
        }
        let (size, bits) = category_encode(coef as i32);
        items.push(RunLengthItem { run, size, bits });
        run = 0;
        if size != 0 {
            eob_index = items.len();
        }
    }

    if block[DCTSIZE2 - 1] == 0 {
        items.truncate(eob_index);
        items.push(RunLengthItem::EOB);
    }
}

/// Emit the Huffman code of `symbol`, failing when the table has none.
#[inline]
fn emit_symbol<S: BitSink>(
    writer: &mut BitWriter<S>,
    table: &DerivedTable,
    symbol: u8,
    value: i32,
    category: u8,
) -> Result<()> {
    let (code, size) = table.get_code(symbol);
    if category > MAX_CATEGORY || size == 0 {
        return Err(Error::CoefficientOutOfRange { value, category });
    }
    writer.put_bits(code, size)
}

/// Encode one zig-zag ordered block.
///
/// # Arguments
/// * `writer` - Destination bitstream
/// * `block` - 64 quantized coefficients in zig-zag order
/// * `last_dc` - DC predictor of the block's component, updated in place
/// * `dc_table` / `ac_table` - Derived tables for the component
/// * `items` - Scratch buffer for the AC run-length records
pub fn encode_block<S: BitSink>(
    writer: &mut BitWriter<S>,
    block: &Block,
    last_dc: &mut i32,
    dc_table: &DerivedTable,
    ac_table: &DerivedTable,
    items: &mut Vec<RunLengthItem>,
) -> Result<()> {
    // DC difference (Section F.1.2.1)
    let dc = block[0] as i32;
    let diff = dc - *last_dc;
    *last_dc = dc;

    let (size, bits) = category_encode(diff);
    emit_symbol(writer, dc_table, size, diff, size)?;
    if size > 0 {
        writer.put_bits(bits, size)?;
    }

    // AC terms (Section F.1.2.2)
    run_length_items(block, items);
    for item in items.iter() {
        let value = category_decode(item.size, item.bits);
        emit_symbol(writer, ac_table, item.symbol(), value, item.size)?;
        if item.size > 0 {
            writer.put_bits(item.bits, item.size)?;
        }
    }
    Ok(())
}

/// Table slot for a component: 0 for luminance, 1 for chrominance.
#[inline]
fn table_slot(component: Component) -> usize {
    if component.is_luma() {
        0
    } else {
        1
    }
}

/// Entropy encoder for one image.
///
/// Owns the four derived tables, the per-component DC predictors and the
/// entropy-coded buffer. The buffer is created on the first encoded block.
pub struct EntropyEncoder {
    /// DC tables: luminance, chrominance
    dc_tables: [DerivedTable; 2],
    /// AC tables: luminance, chrominance
    ac_tables: [DerivedTable; 2],
    /// Last DC value for each component (for differential coding)
    last_dc_val: [i32; NUM_COMPONENTS],
    writer: Option<BitWriter<MemorySink>>,
    /// Fixed buffer size, or None for a growable buffer
    capacity: Option<usize>,
    items: Vec<RunLengthItem>,
}

impl EntropyEncoder {
    /// Create an encoder with the standard tables and a growable buffer.
    pub fn new() -> Result<Self> {
        Self::with_tables(
            &HuffTable::std_dc_luminance(),
            &HuffTable::std_dc_chrominance(),
            &HuffTable::std_ac_luminance(),
            &HuffTable::std_ac_chrominance(),
        )
    }

    /// Create an encoder whose buffer refuses to grow past `capacity` bytes.
    pub fn with_fixed_capacity(capacity: usize) -> Result<Self> {
        let mut encoder = Self::new()?;
        encoder.capacity = Some(capacity);
        Ok(encoder)
    }

    /// Create an encoder with custom tables.
    pub fn with_tables(
        dc_luma: &HuffTable,
        dc_chroma: &HuffTable,
        ac_luma: &HuffTable,
        ac_chroma: &HuffTable,
    ) -> Result<Self> {
        debug!(
            "deriving Huffman tables: dc {}/{} symbols, ac {}/{} symbols",
            dc_luma.num_symbols(),
            dc_chroma.num_symbols(),
            ac_luma.num_symbols(),
            ac_chroma.num_symbols()
        );
        Ok(Self {
            dc_tables: [
                DerivedTable::from_huff_table(dc_luma, true)?,
                DerivedTable::from_huff_table(dc_chroma, true)?,
            ],
            ac_tables: [
                DerivedTable::from_huff_table(ac_luma, false)?,
                DerivedTable::from_huff_table(ac_chroma, false)?,
            ],
            last_dc_val: [0; NUM_COMPONENTS],
            writer: None,
            capacity: None,
            items: Vec::with_capacity(DCTSIZE2),
        })
    }

    /// Get the last DC value for a component.
    pub fn last_dc(&self, component: Component) -> i32 {
        self.last_dc_val[component.index()]
    }

    /// Encode one zig-zag ordered block of `component`.
    pub fn encode_block(&mut self, block: &Block, component: Component) -> Result<()> {
        let slot = table_slot(component);
        let Self {
            dc_tables,
            ac_tables,
            last_dc_val,
            writer,
            capacity,
            items,
        } = self;
        let writer = writer.get_or_insert_with(|| {
            let sink = match *capacity {
                Some(n) => MemorySink::with_fixed_capacity(n),
                None => MemorySink::new(),
            };
            BitWriter::new(sink)
        });
        encode_block(
            writer,
            block,
            &mut last_dc_val[component.index()],
            &dc_tables[slot],
            &ac_tables[slot],
            items,
        )
    }

    /// Encode all blocks of an image in macroblock order.
    ///
    /// Per macroblock: the Y blocks (1, 4 or 2 depending on `subsampling`),
    /// then one Cb block, then one Cr block. Repeated calls continue the
    /// same scan with the same DC predictors; only [`finish`](Self::finish)
    /// pads the final byte.
    ///
    /// Returns the size of the entropy-coded buffer once padded.
    pub fn encode_planes(
        &mut self,
        planes: &Planes<'_, Block>,
        width: u32,
        height: u32,
        subsampling: Subsampling,
    ) -> Result<usize> {
        let mcus = planes.validate(width, height, subsampling)?;
        let luma_per_mcu = subsampling.luma_blocks_per_mcu();
        trace!(
            "entropy coding {} macroblocks ({} Y blocks each, {:?})",
            mcus,
            luma_per_mcu,
            subsampling
        );

        for (mcu, luma) in planes.y.chunks_exact(luma_per_mcu).enumerate() {
            for block in luma {
                self.encode_block(block, Component::Y)?;
            }
            self.encode_block(&planes.cb[mcu], Component::Cb)?;
            self.encode_block(&planes.cr[mcu], Component::Cr)?;
        }

        Ok(self.padded_len())
    }

    /// Bytes in the buffer so far (pending bits excluded).
    pub fn bytes_written(&self) -> usize {
        self.writer.as_ref().map_or(0, |w| w.bytes_written())
    }

    /// Bytes the buffer will hold after [`finish`](Self::finish) pads it.
    pub fn padded_len(&self) -> usize {
        self.writer.as_ref().map_or(0, |w| w.padded_len(true))
    }

    /// Pad with 1-bits and hand over the entropy-coded bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        match self.writer.take() {
            Some(mut writer) => {
                writer.flush()?;
                Ok(writer.into_inner()?.into_bytes())
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Decoded Y, Cb and Cr block planes, zig-zag ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedPlanes {
    /// Luminance blocks
    pub y: Vec<Block>,
    /// Cb blocks
    pub cb: Vec<Block>,
    /// Cr blocks
    pub cr: Vec<Block>,
}

/// Entropy decoder, the inverse of [`EntropyEncoder`].
pub struct EntropyDecoder<S: BitSink> {
    reader: BitReader<S>,
    dc_tables: [DecodeTable; 2],
    ac_tables: [DecodeTable; 2],
    last_dc_val: [i32; NUM_COMPONENTS],
}

impl<S: BitSink> EntropyDecoder<S> {
    /// Create a decoder over entropy-coded data with the standard tables.
    pub fn new(source: S) -> Result<Self> {
        Ok(Self {
            reader: BitReader::new(source),
            dc_tables: [
                DecodeTable::from_huff_table(&HuffTable::std_dc_luminance())?,
                DecodeTable::from_huff_table(&HuffTable::std_dc_chrominance())?,
            ],
            ac_tables: [
                DecodeTable::from_huff_table(&HuffTable::std_ac_luminance())?,
                DecodeTable::from_huff_table(&HuffTable::std_ac_chrominance())?,
            ],
            last_dc_val: [0; NUM_COMPONENTS],
        })
    }

    fn receive(&mut self, size: u8) -> Result<i32> {
        let bits = self.reader.get_bits(size)?;
        Ok(category_decode(size, bits))
    }

    /// Decode one block of `component` (zig-zag order).
    pub fn decode_block(&mut self, component: Component) -> Result<Block> {
        let slot = table_slot(component);
        let mut block = [0i16; DCTSIZE2];

        let size = self.dc_tables[slot].decode(&mut self.reader)?;
        if size > MAX_CATEGORY {
            return Err(Error::CorruptData("DC category out of range"));
        }
        let diff = self.receive(size)?;
        let dc = self.last_dc_val[component.index()] + diff;
        self.last_dc_val[component.index()] = dc;
        block[0] = i16::try_from(dc).map_err(|_| Error::CorruptData("DC value out of range"))?;

        let mut k = 1usize;
        while k < DCTSIZE2 {
            let symbol = self.ac_tables[slot].decode(&mut self.reader)?;
            let run = (symbol >> 4) as usize;
            let size = symbol & 0x0F;
            if size == 0 {
                if symbol == ZRL {
                    k += 16;
                    continue;
                }
                break;
            }
            k += run;
            if k >= DCTSIZE2 {
                return Err(Error::CorruptData("AC run past end of block"));
            }
            block[k] = self.receive(size)? as i16;
            k += 1;
        }
        if k > DCTSIZE2 {
            return Err(Error::CorruptData("ZRL past end of block"));
        }
        Ok(block)
    }

    /// Decode a whole image laid out as [`EntropyEncoder::encode_planes`] wrote it.
    pub fn decode_planes(
        &mut self,
        width: u32,
        height: u32,
        subsampling: Subsampling,
    ) -> Result<DecodedPlanes> {
        let mcus = subsampling.mcu_count(width, height);
        let luma_per_mcu = subsampling.luma_blocks_per_mcu();
        let mut planes = DecodedPlanes {
            y: Vec::with_capacity(mcus * luma_per_mcu),
            cb: Vec::with_capacity(mcus),
            cr: Vec::with_capacity(mcus),
        };
        for _ in 0..mcus {
            for _ in 0..luma_per_mcu {
                planes.y.push(self.decode_block(Component::Y)?);
            }
            planes.cb.push(self.decode_block(Component::Cb)?);
            planes.cr.push(self.decode_block(Component::Cr)?);
        }
        Ok(planes)
    }

    /// Consume the decoder and return the source.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items_of(block: &Block) -> Vec<RunLengthItem> {
        let mut items = Vec::new();
        run_length_items(block, &mut items);
        items
    }

    #[test]
    fn test_jpeg_nbits() {
        assert_eq!(jpeg_nbits(0), 0);
        assert_eq!(jpeg_nbits(1), 1);
        assert_eq!(jpeg_nbits(-1), 1);
        assert_eq!(jpeg_nbits(2), 2);
        assert_eq!(jpeg_nbits(3), 2);
        assert_eq!(jpeg_nbits(-3), 2);
        assert_eq!(jpeg_nbits(4), 3);
        assert_eq!(jpeg_nbits(255), 8);
        assert_eq!(jpeg_nbits(-256), 9);
        assert_eq!(jpeg_nbits(1023), 10);
        assert_eq!(jpeg_nbits(2047), 11);
    }

    #[test]
    fn test_category_encode() {
        assert_eq!(category_encode(0), (0, 0));
        assert_eq!(category_encode(1), (1, 1));
        assert_eq!(category_encode(-1), (1, 0));
        assert_eq!(category_encode(2), (2, 2));
        assert_eq!(category_encode(-2), (2, 1));
        assert_eq!(category_encode(-3), (2, 0));
        assert_eq!(category_encode(5), (3, 5));
        assert_eq!(category_encode(-5), (3, 2));
        assert_eq!(category_encode(-1023), (10, 0));
    }

    #[test]
    fn test_category_encode_full_i32_range() {
        assert_eq!(category_encode(i32::MAX), (31, 0x7FFF_FFFF));
        assert_eq!(category_encode(i32::MIN), (32, 0x7FFF_FFFF));
        assert_eq!(category_encode(-65535), (16, 0));
    }

    #[test]
    fn test_category_decode() {
        for v in [-300, -17, -2, -1, 0, 1, 2, 17, 300] {
            let (size, bits) = category_encode(v);
            assert_eq!(category_decode(size, bits), v);
        }
    }

    #[test]
    fn test_all_zero_block_single_eob() {
        let mut block = [0i16; DCTSIZE2];
        block[0] = 42;
        assert_eq!(items_of(&block), vec![RunLengthItem::EOB]);
    }

    #[test]
    fn test_zrl_before_long_run() {
        // 16 zeros (zig-zag 1..=16), then a value at 17
        let mut block = [0i16; DCTSIZE2];
        block[17] = 3;
        let items = items_of(&block);
        assert_eq!(
            items,
            vec![
                RunLengthItem::ZRL,
                RunLengthItem {
                    run: 0,
                    size: 2,
                    bits: 3
                },
                RunLengthItem::EOB,
            ]
        );
        assert_eq!(items.iter().filter(|i| i.is_zrl()).count(), 1);
    }

    #[test]
    fn test_fifteen_zeros_no_zrl() {
        let mut block = [0i16; DCTSIZE2];
        block[16] = -1;
        let items = items_of(&block);
        assert_eq!(
            items[0],
            RunLengthItem {
                run: 15,
                size: 1,
                bits: 0
            }
        );
        assert_eq!(items[0].symbol(), 0xF1);
        assert!(items[1].is_eob());
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_last_coefficient_nonzero_no_eob() {
        let mut block = [0i16; DCTSIZE2];
        block[63] = 1;
        let items = items_of(&block);
        // 62 zeros: three ZRLs (48) then run 14
        assert_eq!(items.len(), 4);
        assert!(items[..3].iter().all(|i| i.is_zrl()));
        assert_eq!(
            items[3],
            RunLengthItem {
                run: 14,
                size: 1,
                bits: 1
            }
        );
        assert!(!items.iter().any(|i| i.is_eob()));
    }

    #[test]
    fn test_trailing_zrls_replaced_by_eob() {
        let mut block = [0i16; DCTSIZE2];
        block[1] = 7;
        let items = items_of(&block);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].symbol(), 0x03);
        assert!(items[1].is_eob());
    }

    #[test]
    fn test_dense_block() {
        let mut block = [0i16; DCTSIZE2];
        for (i, c) in block.iter_mut().enumerate() {
            *c = (i as i16 % 5) - 2;
        }
        let items = items_of(&block);
        let nonzero = block[1..].iter().filter(|&&c| c != 0).count();
        assert_eq!(items.iter().filter(|i| i.size != 0).count(), nonzero);
        // block[63] = (63 % 5) - 2 = 1
        assert!(!items.last().unwrap().is_eob());
    }

    #[test]
    fn test_dc_predictor_bits() {
        let mut encoder = EntropyEncoder::new().unwrap();
        let mut block = [0i16; DCTSIZE2];
        block[0] = 10;
        encoder.encode_block(&block, Component::Y).unwrap();
        block[0] = 7;
        encoder.encode_block(&block, Component::Y).unwrap();
        assert_eq!(encoder.last_dc(Component::Y), 7);

        // diff 10: 101 1010, EOB 1010; diff -3: 011 00, EOB 1010; pad 1111
        assert_eq!(encoder.finish().unwrap(), vec![0xB5, 0x4C, 0xAF]);
    }

    #[test]
    fn test_dc_predictors_independent() {
        let mut encoder = EntropyEncoder::new().unwrap();
        let mut block = [0i16; DCTSIZE2];
        block[0] = 10;
        encoder.encode_block(&block, Component::Y).unwrap();
        block[0] = 4;
        encoder.encode_block(&block, Component::Cb).unwrap();
        block[0] = 7;
        encoder.encode_block(&block, Component::Y).unwrap();

        assert_eq!(encoder.last_dc(Component::Y), 7);
        assert_eq!(encoder.last_dc(Component::Cb), 4);
        assert_eq!(encoder.last_dc(Component::Cr), 0);

        let data = encoder.finish().unwrap();
        let mut decoder = EntropyDecoder::new(MemorySink::from_bytes(data)).unwrap();
        assert_eq!(decoder.decode_block(Component::Y).unwrap()[0], 10);
        assert_eq!(decoder.decode_block(Component::Cb).unwrap()[0], 4);
        assert_eq!(decoder.decode_block(Component::Y).unwrap()[0], 7);
    }

    #[test]
    fn test_encode_planes_roundtrip() {
        let layouts = [
            (Subsampling::S444, 16, 8),
            (Subsampling::S420, 24, 20),
            (Subsampling::S422, 17, 9),
        ];
        for (subsampling, width, height) in layouts {
            let mcus = subsampling.mcu_count(width, height);
            let make = |count: usize, seed: i16| -> Vec<Block> {
                (0..count)
                    .map(|n| {
                        let mut block = [0i16; DCTSIZE2];
                        block[0] = seed + n as i16 * 3 - 20;
                        block[1] = (n as i16 % 7) - 3;
                        block[5] = -(n as i16 % 4);
                        block[40] = (n % 2) as i16 * 9;
                        block
                    })
                    .collect()
            };
            let y = make(mcus * subsampling.luma_blocks_per_mcu(), 50);
            let cb = make(mcus, -8);
            let cr = make(mcus, 3);

            let mut encoder = EntropyEncoder::new().unwrap();
            let len = encoder
                .encode_planes(&Planes::new(&y, &cb, &cr), width, height, subsampling)
                .unwrap();
            let data = encoder.finish().unwrap();
            assert_eq!(data.len(), len);

            let mut decoder = EntropyDecoder::new(MemorySink::from_bytes(data)).unwrap();
            let decoded = decoder.decode_planes(width, height, subsampling).unwrap();
            assert_eq!(decoded.y, y);
            assert_eq!(decoded.cb, cb);
            assert_eq!(decoded.cr, cr);
        }
    }

    #[test]
    fn test_encode_planes_twice_continues_scan() {
        let mut block = [0i16; DCTSIZE2];
        block[0] = 3;
        let triple = [block];

        let mut encoder = EntropyEncoder::new().unwrap();
        let planes = Planes::new(&triple, &triple, &triple);
        let first = encoder.encode_planes(&planes, 8, 8, Subsampling::S444).unwrap();
        assert!(first > 0);
        let second = encoder.encode_planes(&planes, 8, 8, Subsampling::S444).unwrap();
        assert_eq!(encoder.last_dc(Component::Y), 3);

        let data = encoder.finish().unwrap();
        assert_eq!(data.len(), second);

        let mut decoder = EntropyDecoder::new(MemorySink::from_bytes(data)).unwrap();
        let decoded = decoder.decode_planes(8, 16, Subsampling::S444).unwrap();
        assert_eq!(decoded.y, vec![block, block]);
        assert_eq!(decoded.cb, vec![block, block]);
        assert_eq!(decoded.cr, vec![block, block]);
    }

    #[test]
    fn test_encode_planes_reports_padded_length() {
        let mut block = [0i16; DCTSIZE2];
        block[0] = 10;
        let one = [block];
        let mut encoder = EntropyEncoder::new().unwrap();
        let len = encoder
            .encode_planes(&Planes::new(&one, &one, &one), 8, 8, Subsampling::S444)
            .unwrap();
        assert!(len > encoder.bytes_written());
        assert_eq!(encoder.finish().unwrap().len(), len);
    }

    #[test]
    fn test_encode_planes_validates_counts() {
        let y = vec![[0i16; DCTSIZE2]; 3];
        let c = vec![[0i16; DCTSIZE2]; 1];
        let mut encoder = EntropyEncoder::new().unwrap();
        let err = encoder
            .encode_planes(&Planes::new(&y, &c, &c), 16, 16, Subsampling::S420)
            .unwrap_err();
        assert_eq!(
            err,
            Error::BlockCountMismatch {
                component: "Y",
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(encoder.bytes_written(), 0);
    }

    #[test]
    fn test_fixed_capacity_overflow() {
        let mut encoder = EntropyEncoder::with_fixed_capacity(2).unwrap();
        let mut block = [0i16; DCTSIZE2];
        for (i, c) in block.iter_mut().enumerate() {
            *c = 100 + i as i16;
        }
        let err = encoder.encode_block(&block, Component::Y).unwrap_err();
        assert_eq!(err, Error::StreamCapacityExceeded { capacity: 2 });
    }

    #[test]
    fn test_out_of_range_coefficient() {
        let mut encoder = EntropyEncoder::new().unwrap();
        let mut block = [0i16; DCTSIZE2];
        block[3] = 2048;
        assert_eq!(
            encoder.encode_block(&block, Component::Cr),
            Err(Error::CoefficientOutOfRange {
                value: 2048,
                category: 12
            })
        );
    }

    #[test]
    fn test_empty_encoder_finish() {
        let encoder = EntropyEncoder::new().unwrap();
        assert!(encoder.finish().unwrap().is_empty());
    }
}

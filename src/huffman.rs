//! Canonical Huffman tables for JPEG.
//!
//! A table is specified the way a DHT segment stores it: sixteen
//! code-length counts followed by the symbols in code order
//! ([`HuffTable`]). From that, [`DerivedTable`] assigns canonical codes
//! for encoding (Figures C.1-C.3 of ITU-T T.81) and [`DecodeTable`]
//! builds the mirror lookup (Figure F.16) for reading streams back.

use crate::bitstream::BitReader;
use crate::consts::{
    AC_CHROMINANCE_BITS, AC_CHROMINANCE_VALUES, AC_LUMINANCE_BITS, AC_LUMINANCE_VALUES,
    DC_CHROMINANCE_BITS, DC_CHROMINANCE_VALUES, DC_LUMINANCE_BITS, DC_LUMINANCE_VALUES,
    MAX_CODE_LENGTH,
};
use crate::error::{Error, Result};
use crate::sink::BitSink;

/// A Huffman table in the raw format (bits + values).
///
/// This is the format stored in the JPEG file and used as input
/// to build derived tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffTable {
    /// Number of codes of each length (`bits[0]` is unused, `bits[1-16]` are counts)
    pub bits: [u8; 17],
    /// Symbol values in order of increasing code length
    pub huffval: [u8; 256],
}

impl Default for HuffTable {
    fn default() -> Self {
        Self {
            bits: [0; 17],
            huffval: [0; 256],
        }
    }
}

impl HuffTable {
    /// Build a table from sixteen counts (lengths 1..=16) and the symbol list.
    pub fn from_counts(counts: &[u8; MAX_CODE_LENGTH], symbols: &[u8]) -> Result<Self> {
        let mut bits = [0u8; 17];
        bits[1..].copy_from_slice(counts);
        Self::new(&bits, symbols)
    }

    /// Build a table from a 17-slot `bits` array (slot 0 unused) and symbols.
    pub fn new(bits: &[u8; 17], symbols: &[u8]) -> Result<Self> {
        let total: usize = bits[1..].iter().map(|&b| b as usize).sum();
        if total != symbols.len() || total > 256 {
            return Err(Error::InvalidHuffmanTable);
        }
        let mut table = Self {
            bits: *bits,
            ..Self::default()
        };
        table.bits[0] = 0;
        table.huffval[..total].copy_from_slice(symbols);
        Ok(table)
    }

    /// Annex K DC luminance table.
    pub fn std_dc_luminance() -> Self {
        Self::from_std(&DC_LUMINANCE_BITS, &DC_LUMINANCE_VALUES)
    }

    /// Annex K DC chrominance table.
    pub fn std_dc_chrominance() -> Self {
        Self::from_std(&DC_CHROMINANCE_BITS, &DC_CHROMINANCE_VALUES)
    }

    /// Annex K AC luminance table.
    pub fn std_ac_luminance() -> Self {
        Self::from_std(&AC_LUMINANCE_BITS, &AC_LUMINANCE_VALUES)
    }

    /// Annex K AC chrominance table.
    pub fn std_ac_chrominance() -> Self {
        Self::from_std(&AC_CHROMINANCE_BITS, &AC_CHROMINANCE_VALUES)
    }

    fn from_std(bits: &[u8; 17], values: &[u8]) -> Self {
        let mut table = Self {
            bits: *bits,
            ..Self::default()
        };
        table.huffval[..values.len()].copy_from_slice(values);
        table
    }

    /// Total number of symbols.
    pub fn num_symbols(&self) -> usize {
        self.bits[1..].iter().map(|&b| b as usize).sum()
    }

    /// Code-length counts for lengths 1..=16.
    pub fn counts(&self) -> &[u8] {
        &self.bits[1..]
    }

    /// Symbols in code order.
    pub fn symbols(&self) -> &[u8] {
        &self.huffval[..self.num_symbols().min(256)]
    }
}

/// Walk the counts and hand out canonical codes in order.
///
/// Calls `assign(index, code, length)` for each symbol position. Fails if a
/// length is over-subscribed or the counts name more than 256 symbols.
fn generate_codes(htbl: &HuffTable, mut assign: impl FnMut(usize, u32, u8)) -> Result<()> {
    if htbl.num_symbols() > htbl.huffval.len() {
        return Err(Error::InvalidHuffmanTable);
    }
    let mut code = 0u32;
    let mut p = 0usize;
    for l in 1..=MAX_CODE_LENGTH {
        for _ in 0..htbl.bits[l] {
            assign(p, code, l as u8);
            code += 1;
            p += 1;
        }
        // A complete code ends with exactly 2^l codes at its longest length
        if code > (1u32 << l) {
            return Err(Error::InvalidHuffmanTable);
        }
        code <<= 1;
    }
    Ok(())
}

/// Derived Huffman table optimized for encoding.
///
/// This format allows O(1) lookup of the code for any symbol.
#[derive(Clone, Debug)]
pub struct DerivedTable {
    /// Huffman code for each symbol (indexed by symbol value)
    pub ehufco: [u32; 256],
    /// Code length for each symbol (0 means no code assigned)
    pub ehufsi: [u8; 256],
}

impl Default for DerivedTable {
    fn default() -> Self {
        Self {
            ehufco: [0; 256],
            ehufsi: [0; 256],
        }
    }
}

impl DerivedTable {
    /// Build a derived table from a raw Huffman table.
    ///
    /// Codes are assigned starting at zero, consecutively within a length,
    /// and the counter is doubled when moving to the next length.
    ///
    /// # Arguments
    /// * `htbl` - The raw Huffman table (bits + huffval)
    /// * `is_dc` - True for DC tables (max symbol 15), false for AC (max symbol 255)
    pub fn from_huff_table(htbl: &HuffTable, is_dc: bool) -> Result<Self> {
        let mut dtbl = Self::default();
        let max_symbol = if is_dc { 15 } else { 255 };
        let mut invalid = false;

        generate_codes(htbl, |p, code, length| {
            let symbol = htbl.huffval[p] as usize;
            if symbol > max_symbol || dtbl.ehufsi[symbol] != 0 {
                invalid = true;
                return;
            }
            dtbl.ehufco[symbol] = code;
            dtbl.ehufsi[symbol] = length;
        })?;

        if invalid {
            return Err(Error::InvalidHuffmanTable);
        }
        Ok(dtbl)
    }

    /// Get the code and length for a symbol.
    ///
    /// # Returns
    /// (code, length) tuple, or (0, 0) if symbol has no code.
    #[inline]
    pub fn get_code(&self, symbol: u8) -> (u32, u8) {
        let idx = symbol as usize;
        (self.ehufco[idx], self.ehufsi[idx])
    }

    /// Code for a symbol that must exist in the table.
    ///
    /// Every category symbol the encoder produces is present in the
    /// standard tables; a missing one is a bug, not an input error.
    #[inline]
    pub fn encode(&self, symbol: u8) -> (u32, u8) {
        let (code, size) = self.get_code(symbol);
        debug_assert!(size > 0, "symbol 0x{:02X} has no Huffman code", symbol);
        (code, size)
    }
}

/// Decoding lookup: per-length code ranges into the symbol list.
#[derive(Clone, Debug)]
pub struct DecodeTable {
    /// Largest code of each length (-1 when the length is unused)
    maxcode: [i32; 18],
    /// Smallest code of each length
    mincode: [i32; 17],
    /// Index into `huffval` of the first symbol of each length
    valptr: [i32; 17],
    huffval: [u8; 256],
}

impl DecodeTable {
    /// Build the decoding lookup for a raw table.
    pub fn from_huff_table(htbl: &HuffTable) -> Result<Self> {
        let mut table = Self {
            maxcode: [-1; 18],
            mincode: [0; 17],
            valptr: [0; 17],
            huffval: htbl.huffval,
        };
        generate_codes(htbl, |p, code, length| {
            let l = length as usize;
            if table.maxcode[l] < 0 {
                table.valptr[l] = p as i32;
                table.mincode[l] = code as i32;
            }
            table.maxcode[l] = code as i32;
        })?;
        Ok(table)
    }

    /// Read one symbol.
    pub fn decode<S: BitSink>(&self, reader: &mut BitReader<S>) -> Result<u8> {
        let mut code = 0i32;
        for l in 1..=MAX_CODE_LENGTH {
            code = (code << 1) | reader.get_bit()? as i32;
            if code <= self.maxcode[l] {
                let index = self.valptr[l] + code - self.mincode[l];
                return Ok(self.huffval[index as usize]);
            }
        }
        Err(Error::CorruptData("no Huffman code matches"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitWriter;
    use crate::sink::MemorySink;

    fn all_std_tables() -> [(HuffTable, bool); 4] {
        [
            (HuffTable::std_dc_luminance(), true),
            (HuffTable::std_dc_chrominance(), true),
            (HuffTable::std_ac_luminance(), false),
            (HuffTable::std_ac_chrominance(), false),
        ]
    }

    #[test]
    fn test_std_dc_luminance_codes() {
        let table = DerivedTable::from_huff_table(&HuffTable::std_dc_luminance(), true).unwrap();
        // Table K.3
        assert_eq!(table.get_code(0), (0b00, 2));
        assert_eq!(table.get_code(1), (0b010, 3));
        assert_eq!(table.get_code(5), (0b110, 3));
        assert_eq!(table.get_code(6), (0b1110, 4));
        assert_eq!(table.get_code(11), (0b1_1111_1110, 9));
    }

    #[test]
    fn test_std_ac_luminance_codes() {
        let table = DerivedTable::from_huff_table(&HuffTable::std_ac_luminance(), false).unwrap();
        // Table K.5
        assert_eq!(table.get_code(0x00), (0b1010, 4)); // EOB
        assert_eq!(table.get_code(0x01), (0b00, 2));
        assert_eq!(table.get_code(0x02), (0b01, 2));
        assert_eq!(table.get_code(0x03), (0b100, 3));
        assert_eq!(table.get_code(0xF0), (0b111_1111_1001, 11)); // ZRL
        assert_eq!(table.get_code(0xFA).1, 16);
    }

    #[test]
    fn test_std_chroma_codes() {
        let dc = DerivedTable::from_huff_table(&HuffTable::std_dc_chrominance(), true).unwrap();
        assert_eq!(dc.get_code(0), (0b00, 2));
        assert_eq!(dc.get_code(3), (0b110, 3));

        let ac = DerivedTable::from_huff_table(&HuffTable::std_ac_chrominance(), false).unwrap();
        assert_eq!(ac.get_code(0x00), (0b00, 2)); // EOB
        assert_eq!(ac.get_code(0xF0), (0b11_1111_1010, 10)); // ZRL
    }

    #[test]
    fn test_std_tables_prefix_free() {
        for (htbl, is_dc) in all_std_tables() {
            let dtbl = DerivedTable::from_huff_table(&htbl, is_dc).unwrap();
            let codes: Vec<(u32, u8)> = htbl.symbols().iter().map(|&s| dtbl.get_code(s)).collect();
            for (i, &(ci, li)) in codes.iter().enumerate() {
                for &(cj, lj) in &codes[i + 1..] {
                    let (short, long, ls, ll) = if li <= lj {
                        (ci, cj, li, lj)
                    } else {
                        (cj, ci, lj, li)
                    };
                    assert_ne!(long >> (ll - ls), short, "prefix collision");
                }
            }
        }
    }

    #[test]
    fn test_counts_symbols_accessors() {
        let htbl = HuffTable::std_ac_chrominance();
        assert_eq!(htbl.num_symbols(), 162);
        assert_eq!(htbl.counts(), &AC_CHROMINANCE_BITS[1..]);
        assert_eq!(htbl.symbols(), &AC_CHROMINANCE_VALUES[..]);
    }

    #[test]
    fn test_from_counts_complete_code() {
        // Lengths 1, 2, 2: codes 0, 10, 11
        let mut counts = [0u8; 16];
        counts[0] = 1;
        counts[1] = 2;
        let htbl = HuffTable::from_counts(&counts, &[7, 8, 9]).unwrap();
        let dtbl = DerivedTable::from_huff_table(&htbl, false).unwrap();
        assert_eq!(dtbl.get_code(7), (0b0, 1));
        assert_eq!(dtbl.get_code(8), (0b10, 2));
        assert_eq!(dtbl.get_code(9), (0b11, 2));
    }

    #[test]
    fn test_oversubscribed_length_rejected() {
        let mut counts = [0u8; 16];
        counts[0] = 3; // three 1-bit codes cannot exist
        let htbl = HuffTable::from_counts(&counts, &[0, 1, 2]).unwrap();
        assert_eq!(
            DerivedTable::from_huff_table(&htbl, false).unwrap_err(),
            Error::InvalidHuffmanTable
        );
    }

    #[test]
    fn test_too_many_symbols_rejected() {
        // 255 + 2 codes still fit the code space but overflow huffval
        let mut htbl = HuffTable::default();
        htbl.bits[9] = 255;
        htbl.bits[10] = 2;
        assert_eq!(htbl.num_symbols(), 257);
        assert_eq!(
            DerivedTable::from_huff_table(&htbl, false).unwrap_err(),
            Error::InvalidHuffmanTable
        );
        assert!(DecodeTable::from_huff_table(&htbl).is_err());
    }

    #[test]
    fn test_symbol_count_mismatch_rejected() {
        let mut counts = [0u8; 16];
        counts[1] = 2;
        assert_eq!(
            HuffTable::from_counts(&counts, &[0]).unwrap_err(),
            Error::InvalidHuffmanTable
        );
    }

    #[test]
    fn test_duplicate_or_out_of_range_symbol_rejected() {
        let mut counts = [0u8; 16];
        counts[1] = 2;
        let dup = HuffTable::from_counts(&counts, &[3, 3]).unwrap();
        assert!(DerivedTable::from_huff_table(&dup, false).is_err());

        let big = HuffTable::from_counts(&counts, &[3, 16]).unwrap();
        assert!(DerivedTable::from_huff_table(&big, true).is_err());
        assert!(DerivedTable::from_huff_table(&big, false).is_ok());
    }

    #[test]
    fn test_decode_table_roundtrip() {
        for (htbl, is_dc) in all_std_tables() {
            let enc = DerivedTable::from_huff_table(&htbl, is_dc).unwrap();
            let dec = DecodeTable::from_huff_table(&htbl).unwrap();

            let mut writer = BitWriter::new(MemorySink::new());
            for &symbol in htbl.symbols() {
                let (code, size) = enc.encode(symbol);
                writer.put_bits(code, size).unwrap();
            }
            writer.flush().unwrap();

            let data = writer.into_inner().unwrap().into_bytes();
            let mut reader = BitReader::new(MemorySink::from_bytes(data));
            for &symbol in htbl.symbols() {
                assert_eq!(dec.decode(&mut reader).unwrap(), symbol);
            }
        }
    }
}

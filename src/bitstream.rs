//! Bit-level stream for JPEG entropy coding.
//!
//! This module provides:
//! - [`BitWriter`]: MSB-first bit packing with automatic 0xFF byte stuffing
//!   (0xFF -> 0xFF 0x00) and byte-boundary padding
//! - [`BitReader`]: the mirror image, removing stuffing and stopping at
//!   marker boundaries
//!
//! Both sit on top of any [`BitSink`]. Bits accumulate in an 8-bit
//! register; a byte reaches the sink only once all eight bits are present.

use crate::error::{Error, Result};
use crate::sink::BitSink;

/// Partial-byte accumulator shared by the writer and the reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BitRegister {
    /// Number of valid bits (0-7 while writing, 0-8 while reading)
    count: u8,
    /// Bit values; the writer appends at the LSB, the reader consumes from the MSB
    value: u8,
}

/// Bitstream writer for JPEG encoding.
///
/// Accumulates bits and pushes them to the sink with byte stuffing.
pub struct BitWriter<S: BitSink> {
    /// Output destination (None once closed)
    sink: Option<S>,
    /// Pending bits of the current byte
    register: BitRegister,
    /// Total bytes pushed to the sink, including stuffing
    bytes_written: usize,
}

impl<S: BitSink> BitWriter<S> {
    /// Create a new bitstream writer.
    pub fn new(sink: S) -> Self {
        Self {
            sink: Some(sink),
            register: BitRegister::default(),
            bytes_written: 0,
        }
    }

    fn sink_mut(&mut self) -> Result<&mut S> {
        self.sink.as_mut().ok_or(Error::StreamClosed)
    }

    /// Emit a single byte with 0xFF stuffing.
    #[inline]
    fn emit_byte_stuffed(&mut self, byte: u8) -> Result<()> {
        let sink = self.sink_mut()?;
        sink.put_byte(byte)?;
        if byte == 0xFF {
            sink.put_byte(0x00)?;
            self.bytes_written += 1;
        }
        self.bytes_written += 1;
        Ok(())
    }

    /// Write one bit.
    #[inline]
    pub fn put_bit(&mut self, bit: bool) -> Result<()> {
        if self.sink.is_none() {
            return Err(Error::StreamClosed);
        }
        self.register.value = (self.register.value << 1) | bit as u8;
        self.register.count += 1;

        if self.register.count == 8 {
            let byte = self.register.value;
            self.register = BitRegister::default();
            self.emit_byte_stuffed(byte)?;
        }
        Ok(())
    }

    /// Write the low `size` bits of `code`, most significant first.
    ///
    /// # Arguments
    /// * `code` - The bits to write (right-aligned)
    /// * `size` - Number of bits to write (0-16)
    pub fn put_bits(&mut self, code: u32, size: u8) -> Result<()> {
        debug_assert!(size <= 16, "Size must be <= 16 bits");
        debug_assert!(code < (1u32 << size), "Code exceeds size bits");

        for shift in (0..size).rev() {
            self.put_bit((code >> shift) & 1 != 0)?;
        }
        Ok(())
    }

    /// Pad the pending partial byte up to the next boundary.
    ///
    /// Writes `8 - pending` bits of `pad` (1-bits for `true`) only when a
    /// partial byte is pending. JPEG scans end with 1-padding.
    pub fn flush_to_byte_boundary(&mut self, pad: bool) -> Result<()> {
        while self.register.count != 0 {
            self.put_bit(pad)?;
        }
        self.sink_mut()?.flush()
    }

    /// Pad with 1-bits and flush (the end-of-scan convention).
    pub fn flush(&mut self) -> Result<()> {
        self.flush_to_byte_boundary(true)
    }

    /// Bytes written once the pending bits are padded with `pad`.
    ///
    /// Counts the stuffing byte when the padded byte comes out as 0xFF.
    pub fn padded_len(&self, pad: bool) -> usize {
        let count = self.register.count;
        if count == 0 {
            return self.bytes_written;
        }
        let fill = if pad { 0xFFu8 >> count } else { 0 };
        let byte = (self.register.value << (8 - count)) | fill;
        self.bytes_written + if byte == 0xFF { 2 } else { 1 }
    }

    /// Number of bits waiting in the register.
    pub fn pending_bits(&self) -> u8 {
        self.register.count
    }

    /// Current byte position of the sink (pending bits not included).
    pub fn tell(&mut self) -> Result<u64> {
        self.sink_mut()?.tell()
    }

    /// Move the sink to `position`.
    ///
    /// Pending bits are discarded, not flushed.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.register = BitRegister::default();
        self.sink_mut()?.seek(position)
    }

    /// Write raw bytes directly (not bit-stuffed).
    ///
    /// Used for marker bytes. The register must be byte-aligned.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        debug_assert!(
            self.register.count == 0,
            "Buffer must be flushed before writing raw bytes"
        );
        let sink = self.sink_mut()?;
        for &byte in bytes {
            sink.put_byte(byte)?;
        }
        self.bytes_written += bytes.len();
        Ok(())
    }

    /// Get the number of bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Get a reference to the underlying sink.
    pub fn get_ref(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Detach the sink, leaving the writer closed.
    ///
    /// Pending bits are discarded; call [`flush`](Self::flush) first.
    /// Every later operation fails with [`Error::StreamClosed`].
    pub fn close(&mut self) -> Result<S> {
        self.register = BitRegister::default();
        self.sink.take().ok_or(Error::StreamClosed)
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(mut self) -> Result<S> {
        self.close()
    }
}

/// Bitstream reader, the inverse of [`BitWriter`].
pub struct BitReader<S: BitSink> {
    source: S,
    register: BitRegister,
}

impl<S: BitSink> BitReader<S> {
    /// Create a reader positioned at the source's current byte.
    pub fn new(source: S) -> Self {
        Self {
            source,
            register: BitRegister::default(),
        }
    }

    /// Fetch the next data byte, undoing byte stuffing.
    ///
    /// A run of 0xFF bytes terminated by 0x00 is one literal 0xFF; any other
    /// terminator is a marker and ends the entropy-coded segment.
    fn fetch_byte(&mut self) -> Result<u8> {
        let byte = self.source.get_byte()?.ok_or(Error::UnexpectedEof)?;
        if byte != 0xFF {
            return Ok(byte);
        }
        loop {
            match self.source.get_byte()?.ok_or(Error::UnexpectedEof)? {
                0xFF => continue,
                0x00 => return Ok(0xFF),
                marker => return Err(Error::UnexpectedMarker(marker)),
            }
        }
    }

    /// Read one bit.
    pub fn get_bit(&mut self) -> Result<bool> {
        if self.register.count == 0 {
            self.register.value = self.fetch_byte()?;
            self.register.count = 8;
        }
        let bit = self.register.value & 0x80 != 0;
        self.register.value <<= 1;
        self.register.count -= 1;
        Ok(bit)
    }

    /// Read `size` bits (0-16), most significant first.
    pub fn get_bits(&mut self, size: u8) -> Result<u32> {
        debug_assert!(size <= 16, "Size must be <= 16 bits");
        let mut value = 0u32;
        for _ in 0..size {
            value = (value << 1) | self.get_bit()? as u32;
        }
        Ok(value)
    }

    /// Drop the remaining bits of the current byte.
    pub fn align(&mut self) {
        self.register = BitRegister::default();
    }

    /// Current byte position of the source.
    pub fn tell(&mut self) -> Result<u64> {
        self.source.tell()
    }

    /// Move the source to `position`, discarding buffered bits.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.register = BitRegister::default();
        self.source.seek(position)
    }

    /// Consume the reader and return the source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

//! Byte destinations for the bit writer and reader.
//!
//! [`BitSink`] is the byte-level interface the bitstream layer talks to.
//! Two backends are provided:
//! - [`MemorySink`]: in-memory buffer, either growable or bounded by a
//!   fixed capacity (writes past the bound fail with
//!   [`Error::StreamCapacityExceeded`], they never truncate silently)
//! - [`FileSink`]: buffered sequential file I/O

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::warn;

use crate::error::{Error, Result};

/// Byte destination/source with position query and seek.
pub trait BitSink {
    /// Write one byte at the current position and advance.
    fn put_byte(&mut self, byte: u8) -> Result<()>;

    /// Read one byte at the current position and advance.
    ///
    /// Returns `Ok(None)` at end of data.
    fn get_byte(&mut self) -> Result<Option<u8>>;

    /// Current byte position.
    fn tell(&mut self) -> Result<u64>;

    /// Move to an absolute byte position.
    fn seek(&mut self, position: u64) -> Result<()>;

    /// Push buffered bytes to the backing store.
    fn flush(&mut self) -> Result<()>;
}

impl<S: BitSink + ?Sized> BitSink for &mut S {
    fn put_byte(&mut self, byte: u8) -> Result<()> {
        (**self).put_byte(byte)
    }

    fn get_byte(&mut self) -> Result<Option<u8>> {
        (**self).get_byte()
    }

    fn tell(&mut self) -> Result<u64> {
        (**self).tell()
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        (**self).seek(position)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

// =============================================================================
// Memory sink
// =============================================================================

/// In-memory sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Vec<u8>,
    position: usize,
    /// Hard upper bound on the buffer length (None = growable)
    limit: Option<usize>,
}

impl MemorySink {
    /// Create a growable sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that refuses to grow beyond `capacity` bytes.
    pub fn with_fixed_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            position: 0,
            limit: Some(capacity),
        }
    }

    /// Create a growable sink positioned at the start of existing data
    /// (for reading back).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: bytes,
            position: 0,
            limit: None,
        }
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Borrow the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the sink and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl BitSink for MemorySink {
    fn put_byte(&mut self, byte: u8) -> Result<()> {
        if self.position < self.buffer.len() {
            self.buffer[self.position] = byte;
        } else {
            if let Some(limit) = self.limit {
                if self.buffer.len() >= limit {
                    warn!("memory sink full at {} bytes", limit);
                    return Err(Error::StreamCapacityExceeded { capacity: limit });
                }
            }
            self.buffer.try_reserve(1)?;
            self.buffer.push(byte);
        }
        self.position += 1;
        Ok(())
    }

    fn get_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.buffer.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.position as u64)
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        let len = self.buffer.len() as u64;
        if position > len {
            return Err(Error::InvalidSeek { position, len });
        }
        self.position = position as usize;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// File sink
// =============================================================================

enum FileMode {
    Write(BufWriter<File>),
    Read(BufReader<File>),
}

/// Sequential file sink, opened either for writing or for reading.
pub struct FileSink {
    mode: FileMode,
}

impl FileSink {
    /// Create (or truncate) a file for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            mode: FileMode::Write(BufWriter::new(file)),
        })
    }

    /// Open an existing file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            mode: FileMode::Read(BufReader::new(file)),
        })
    }

    fn len(&mut self) -> Result<u64> {
        let file = match &mut self.mode {
            FileMode::Write(w) => {
                w.flush()?;
                w.get_ref()
            }
            FileMode::Read(r) => r.get_ref(),
        };
        Ok(file.metadata()?.len())
    }
}

impl BitSink for FileSink {
    fn put_byte(&mut self, byte: u8) -> Result<()> {
        match &mut self.mode {
            FileMode::Write(w) => Ok(w.write_all(&[byte])?),
            FileMode::Read(_) => Err(Error::IoError("file sink opened for reading".into())),
        }
    }

    fn get_byte(&mut self) -> Result<Option<u8>> {
        match &mut self.mode {
            FileMode::Read(r) => {
                let mut byte = [0u8; 1];
                match r.read(&mut byte)? {
                    0 => Ok(None),
                    _ => Ok(Some(byte[0])),
                }
            }
            FileMode::Write(_) => Err(Error::IoError("file sink opened for writing".into())),
        }
    }

    fn tell(&mut self) -> Result<u64> {
        let position = match &mut self.mode {
            FileMode::Write(w) => w.stream_position()?,
            FileMode::Read(r) => r.stream_position()?,
        };
        Ok(position)
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        let len = self.len()?;
        if position > len {
            return Err(Error::InvalidSeek { position, len });
        }
        match &mut self.mode {
            FileMode::Write(w) => w.seek(SeekFrom::Start(position))?,
            FileMode::Read(r) => r.seek(SeekFrom::Start(position))?,
        };
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let FileMode::Write(w) = &mut self.mode {
            w.flush()?;
        }
        Ok(())
    }
}

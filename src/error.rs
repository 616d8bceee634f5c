//! Error types for the baseline JPEG encoder.

use std::fmt;

/// Result type for encoder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for encoder operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Subsampling code outside {444, 420, 422}
    UnsupportedFormat(u32),
    /// Invalid image dimensions (zero, or too large for a SOF0 header)
    InvalidDimensions {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },
    /// A block plane does not match the macroblock layout
    BlockCountMismatch {
        /// Component name ("Y", "Cb" or "Cr")
        component: &'static str,
        /// Number of blocks the layout requires
        expected: usize,
        /// Number of blocks supplied
        actual: usize,
    },
    /// Flat plane whose length is not a whole number of blocks
    PartialBlock {
        /// Component name ("Y", "Cb" or "Cr")
        component: &'static str,
        /// Length of the flat array
        len: usize,
    },
    /// Write past the end of a fixed-capacity sink
    StreamCapacityExceeded {
        /// Capacity of the sink in bytes
        capacity: usize,
    },
    /// Operation on a stream whose sink was already taken
    StreamClosed,
    /// Seek outside the valid range of a sink
    InvalidSeek {
        /// Requested position
        position: u64,
        /// Length of the sink at the time of the request
        len: u64,
    },
    /// Read path reached a marker (0xFF followed by a non-zero byte)
    UnexpectedMarker(u8),
    /// Read path ran out of data
    UnexpectedEof,
    /// Huffman counts/symbols do not describe a valid canonical code
    InvalidHuffmanTable,
    /// Coefficient magnitude has no code in the baseline Huffman tables
    CoefficientOutOfRange {
        /// Offending value (DC difference or AC coefficient)
        value: i32,
        /// Its magnitude category
        category: u8,
    },
    /// Entropy-coded data does not decode with the given tables
    CorruptData(&'static str),
    /// I/O error
    IoError(String),
    /// Memory allocation failed
    AllocationFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedFormat(code) => {
                write!(
                    f,
                    "Unsupported subsampling format: {} (expected 444, 420 or 422)",
                    code
                )
            }
            Error::InvalidDimensions { width, height } => {
                write!(f, "Invalid image dimensions: {}x{}", width, height)
            }
            Error::BlockCountMismatch {
                component,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Block count mismatch for {}: expected {}, got {}",
                    component, expected, actual
                )
            }
            Error::PartialBlock { component, len } => {
                write!(
                    f,
                    "{} plane length {} is not a multiple of 64",
                    component, len
                )
            }
            Error::StreamCapacityExceeded { capacity } => {
                write!(f, "Stream capacity exceeded ({} bytes)", capacity)
            }
            Error::StreamClosed => write!(f, "Stream is closed"),
            Error::InvalidSeek { position, len } => {
                write!(f, "Invalid seek to {} (stream length {})", position, len)
            }
            Error::UnexpectedMarker(marker) => {
                write!(
                    f,
                    "Unexpected marker 0xFF{:02X} in entropy-coded data",
                    marker
                )
            }
            Error::UnexpectedEof => write!(f, "Unexpected end of stream"),
            Error::InvalidHuffmanTable => write!(f, "Invalid Huffman table structure"),
            Error::CoefficientOutOfRange { value, category } => {
                write!(
                    f,
                    "Coefficient {} (category {}) exceeds the baseline range",
                    value, category
                )
            }
            Error::CorruptData(msg) => write!(f, "Corrupt entropy-coded data: {}", msg),
            Error::IoError(msg) => write!(f, "I/O error: {}", msg),
            Error::AllocationFailed => write!(f, "Memory allocation failed"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::AllocationFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = [
            (
                Error::UnsupportedFormat(411),
                "Unsupported subsampling format: 411 (expected 444, 420 or 422)",
            ),
            (
                Error::InvalidDimensions {
                    width: 0,
                    height: 100,
                },
                "Invalid image dimensions: 0x100",
            ),
            (
                Error::BlockCountMismatch {
                    component: "Cb",
                    expected: 4,
                    actual: 3,
                },
                "Block count mismatch for Cb: expected 4, got 3",
            ),
            (
                Error::PartialBlock {
                    component: "Y",
                    len: 100,
                },
                "Y plane length 100 is not a multiple of 64",
            ),
            (
                Error::StreamCapacityExceeded { capacity: 128 },
                "Stream capacity exceeded (128 bytes)",
            ),
            (Error::StreamClosed, "Stream is closed"),
            (
                Error::InvalidSeek {
                    position: 10,
                    len: 4,
                },
                "Invalid seek to 10 (stream length 4)",
            ),
            (
                Error::UnexpectedMarker(0xD9),
                "Unexpected marker 0xFFD9 in entropy-coded data",
            ),
            (Error::UnexpectedEof, "Unexpected end of stream"),
            (Error::InvalidHuffmanTable, "Invalid Huffman table structure"),
            (
                Error::CorruptData("bad run"),
                "Corrupt entropy-coded data: bad run",
            ),
            (Error::IoError("disk full".into()), "I/O error: disk full"),
            (Error::AllocationFailed, "Memory allocation failed"),
        ];

        for (error, expected_msg) in errors {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::IoError(_)));
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_clone_and_eq() {
        let error1 = Error::UnsupportedFormat(411);
        let error2 = error1.clone();
        assert_eq!(error1, error2);
        assert_ne!(error1, Error::UnsupportedFormat(440));
    }
}

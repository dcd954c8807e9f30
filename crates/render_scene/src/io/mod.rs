//! Binary stream primitives and format versioning
//!
//! Every scene record is written little-endian through [`BinaryWriter`] and read
//! back through [`BinaryReader`]. Readers always receive the format version the
//! stream was written with, so record layouts can branch on it.
//!
//! # Version history
//!
//! - `1`: initial layout.
//! - `2`: light records gain the area-light axes and per-axis sizes, appended
//!   after the version 1 fields.

mod reader;
mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;

use thiserror::Error;

// Raw Pod blocks are copied with their in-memory byte order.
#[cfg(target_endian = "big")]
compile_error!("scene streams store raw Pod blocks in little-endian order");

/// Magic bytes at the start of a serialized scene
pub const SCENE_MAGIC: [u8; 4] = *b"RSCN";

/// First released format version
pub const FORMAT_VERSION_INITIAL: u32 = 1;

/// Light records carry `axis_u`, `axis_v`, `size_u` and `size_v`
pub const FORMAT_VERSION_AREA_AXES: u32 = 2;

/// Version written by this build
pub const CURRENT_FORMAT_VERSION: u32 = FORMAT_VERSION_AREA_AXES;

/// Default upper bound for length-prefixed strings
pub const DEFAULT_MAX_STRING_LENGTH: u32 = 1 << 20;

/// Check that a version read from a stream can be decoded by this build
pub fn check_version(version: u32) -> Result<u32, FormatError> {
    if (FORMAT_VERSION_INITIAL..=CURRENT_FORMAT_VERSION).contains(&version) {
        Ok(version)
    } else {
        Err(FormatError::UnsupportedVersion(version))
    }
}

/// Errors raised while encoding or decoding a binary stream
#[derive(Error, Debug)]
pub enum FormatError {
    /// IO error on the backing stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream does not start with the scene magic
    #[error("Invalid magic number")]
    InvalidMagic,

    /// Version outside the supported range
    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u32),

    /// String payload is not valid UTF-8
    #[error("Invalid UTF-8 in string payload")]
    InvalidUtf8,

    /// String length prefix exceeds the configured limit
    #[error("String of {length} bytes exceeds limit of {limit} bytes")]
    StringTooLong {
        /// Length read from the prefix
        length: u64,
        /// Configured limit
        limit: u32,
    },

    /// Collection too large for a `u32` count prefix
    #[error("Collection of {0} elements does not fit a u32 count")]
    LengthOverflow(u64),

    /// Enum tag that does not name a known variant
    #[error("Invalid {kind} discriminant: {value}")]
    InvalidDiscriminant {
        /// Name of the enum being decoded
        kind: &'static str,
        /// Raw value read from the stream
        value: u32,
    },
}

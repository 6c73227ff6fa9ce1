//! Slab compression.
//!
//! Every sink works with an opaque compressed buffer plus the
//! [`Compression`] that produced it. Adding a format means adding a variant
//! and a [`SlabCodec`] implementation; sinks read the file suffix and query
//! value from the variant.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::CodecError;

// =============================================================================
// Compression
// =============================================================================

/// Supported slab compression modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Raw little-endian bytes.
    #[default]
    None,

    /// LZ4 block format (no size prefix).
    Lz4,

    /// Gzip-wrapped deflate.
    Gzip,
}

impl Compression {
    /// Name used on the command line and as the remote `compression` query value.
    pub const fn name(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Lz4 => "lz4",
            Compression::Gzip => "gzip",
        }
    }

    /// Suffix appended to `.dat` slab file names.
    pub const fn file_suffix(&self) -> &'static str {
        match self {
            Compression::None => "",
            Compression::Lz4 => ".lz4",
            Compression::Gzip => ".gz",
        }
    }

    /// Codec implementing this mode.
    pub fn codec(&self) -> Box<dyn SlabCodec> {
        match self {
            Compression::None => Box::new(Passthrough),
            Compression::Lz4 => Box::new(Lz4Codec),
            Compression::Gzip => Box::new(GzipCodec::default()),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Compression::None),
            "lz4" | "lz" => Ok(Compression::Lz4),
            "gzip" | "deflate" => Ok(Compression::Gzip),
            _ => Err(CodecError::UnknownCompressionMode(s.to_string())),
        }
    }
}

// =============================================================================
// Codecs
// =============================================================================

/// Byte-buffer compressor for serialized slabs.
pub trait SlabCodec: Send + Sync {
    fn compression(&self) -> Compression;

    fn compress(&self, raw: &[u8]) -> Result<Bytes, CodecError>;

    /// Restore the original bytes; `raw_len` is the uncompressed size.
    fn decompress(&self, data: &[u8], raw_len: usize) -> Result<Vec<u8>, CodecError>;
}

/// Leaves bytes untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl SlabCodec for Passthrough {
    fn compression(&self) -> Compression {
        Compression::None
    }

    fn compress(&self, raw: &[u8]) -> Result<Bytes, CodecError> {
        Ok(Bytes::copy_from_slice(raw))
    }

    fn decompress(&self, data: &[u8], raw_len: usize) -> Result<Vec<u8>, CodecError> {
        check_len("none", data.len(), raw_len)?;
        Ok(data.to_vec())
    }
}

/// LZ4 block compression.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Codec;

impl SlabCodec for Lz4Codec {
    fn compression(&self) -> Compression {
        Compression::Lz4
    }

    fn compress(&self, raw: &[u8]) -> Result<Bytes, CodecError> {
        Ok(Bytes::from(lz4_flex::block::compress(raw)))
    }

    fn decompress(&self, data: &[u8], raw_len: usize) -> Result<Vec<u8>, CodecError> {
        let out = lz4_flex::block::decompress(data, raw_len).map_err(|e| {
            CodecError::Decompress {
                codec: "lz4",
                message: e.to_string(),
            }
        })?;
        check_len("lz4", out.len(), raw_len)?;
        Ok(out)
    }
}

/// Gzip compression at a fixed level.
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    level: flate2::Compression,
}

impl GzipCodec {
    pub fn with_level(level: u32) -> Self {
        Self {
            level: flate2::Compression::new(level.min(9)),
        }
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self {
            level: flate2::Compression::default(),
        }
    }
}

impl SlabCodec for GzipCodec {
    fn compression(&self) -> Compression {
        Compression::Gzip
    }

    fn compress(&self, raw: &[u8]) -> Result<Bytes, CodecError> {
        let compress_error = |e: std::io::Error| CodecError::Compress {
            codec: "gzip",
            message: e.to_string(),
        };
        let mut encoder = GzEncoder::new(Vec::with_capacity(raw.len() / 4), self.level);
        encoder.write_all(raw).map_err(compress_error)?;
        let out = encoder.finish().map_err(compress_error)?;
        Ok(Bytes::from(out))
    }

    fn decompress(&self, data: &[u8], raw_len: usize) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(raw_len);
        GzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| CodecError::Decompress {
                codec: "gzip",
                message: e.to_string(),
            })?;
        check_len("gzip", out.len(), raw_len)?;
        Ok(out)
    }
}

fn check_len(codec: &'static str, got: usize, expected: usize) -> Result<(), CodecError> {
    if got != expected {
        return Err(CodecError::Decompress {
            codec,
            message: format!("expected {} bytes, got {}", expected, got),
        });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

//! Block decompression for TIFF strips and tiles

pub mod deflate;
pub mod lzw;
pub mod packbits;

use crate::error::{Error, Result};

/// Compression schemes the decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression
    None,
    /// Deflate/ZIP compression (Adobe code 8 and the legacy 32946)
    Deflate,
    /// LZW compression
    Lzw,
    /// PackBits compression
    PackBits,
}

impl Compression {
    /// Creates compression from TIFF compression tag value
    pub fn from_tag(value: u64) -> Result<Self> {
        match value {
            1 => Ok(Compression::None),
            5 => Ok(Compression::Lzw),
            8 | 32946 => Ok(Compression::Deflate),
            32773 => Ok(Compression::PackBits),
            _ => Err(Error::Unsupported(format!("Compression type {}", value))),
        }
    }

    /// Returns the name of this compression type
    pub fn name(&self) -> &'static str {
        match self {
            Compression::None => "None",
            Compression::Deflate => "Deflate/ZIP",
            Compression::Lzw => "LZW",
            Compression::PackBits => "PackBits",
        }
    }

    /// Decompresses one block. `expected_len` is the decoded size the block
    /// layout implies; decoders stop there and callers check for short output.
    pub fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Deflate => deflate::decompress(data, expected_len),
            Compression::Lzw => lzw::decompress(data, expected_len),
            Compression::PackBits => packbits::decompress(data, expected_len),
        }
    }
}

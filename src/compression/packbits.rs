//! PackBits decompression
//!
//! Each run starts with a signed header byte n:
//! 0..=127 copies the next n + 1 bytes, -127..=-1 repeats the next byte
//! 1 - n times, and -128 is skipped.

use crate::error::{Error, Result};

/// Expands a PackBits block, stopping once `expected_len` bytes are produced
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_len);
    let mut input = data.iter().copied();

    while output.len() < expected_len {
        let Some(header) = input.next() else {
            break;
        };

        match header as i8 {
            -128 => {}
            n @ 0..=127 => {
                for _ in 0..=n {
                    let byte = input.next().ok_or_else(|| {
                        Error::InvalidFormat("PackBits: literal run truncated".to_string())
                    })?;
                    output.push(byte);
                }
            }
            n => {
                let byte = input.next().ok_or_else(|| {
                    Error::InvalidFormat("PackBits: repeat run missing its byte".to_string())
                })?;
                let repeat = (1 - n as isize) as usize;
                output.resize(output.len() + repeat, byte);
            }
        }
    }

    output.truncate(expected_len);
    Ok(output)
}

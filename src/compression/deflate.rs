//! Deflate/ZIP decompression

use crate::error::Result;
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Inflates a zlib-wrapped block
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut decompressed = Vec::with_capacity(expected_len);
    ZlibDecoder::new(data).read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_inflate_float_block() {
        let original: Vec<u8> = [1.0f32, 95.5, -3.25]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&original).unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(decompress(&compressed, original.len()).unwrap(), original);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(decompress(&[0xde, 0xad, 0xbe, 0xef], 16).is_err());
    }
}

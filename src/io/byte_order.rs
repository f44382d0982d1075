//! Byte order (endianness) handling
//!
//! Decodes multi-byte values from in-memory buffers in either byte order.
//! TIFF files declare their byte order in the first two bytes of the header.

use crate::error::{Error, Result};

/// Represents the byte order (endianness) of binary data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (least significant byte first)
    LittleEndian,
    /// Big-endian byte order (most significant byte first)
    BigEndian,
}

impl ByteOrder {
    /// Detects byte order from TIFF magic bytes
    ///
    /// TIFF files start with either "II" (0x4949) for little-endian
    /// or "MM" (0x4D4D) for big-endian.
    pub fn from_tiff_magic(magic: [u8; 2]) -> Option<Self> {
        match &magic {
            b"II" => Some(ByteOrder::LittleEndian),
            b"MM" => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }

    /// Reads the byte order marker at the start of `data`
    pub fn detect(data: &[u8]) -> Result<Self> {
        let magic: [u8; 2] = take(data, 0)?;
        Self::from_tiff_magic(magic).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "Invalid byte order magic bytes: {:02X}{:02X}",
                magic[0], magic[1]
            ))
        })
    }

    pub fn u16(&self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
        }
    }

    pub fn u32(&self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
        }
    }

    pub fn u64(&self, bytes: [u8; 8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(bytes),
            ByteOrder::BigEndian => u64::from_be_bytes(bytes),
        }
    }

    pub fn f32(&self, bytes: [u8; 4]) -> f32 {
        f32::from_bits(self.u32(bytes))
    }

    pub fn f64(&self, bytes: [u8; 8]) -> f64 {
        f64::from_bits(self.u64(bytes))
    }

    /// Reads a u16 at `offset` in `data`
    pub fn read_u16(&self, data: &[u8], offset: usize) -> Result<u16> {
        Ok(self.u16(take(data, offset)?))
    }

    /// Reads a u32 at `offset` in `data`
    pub fn read_u32(&self, data: &[u8], offset: usize) -> Result<u32> {
        Ok(self.u32(take(data, offset)?))
    }

    /// Reads a u64 at `offset` in `data`
    pub fn read_u64(&self, data: &[u8], offset: usize) -> Result<u64> {
        Ok(self.u64(take(data, offset)?))
    }
}

/// Copies `N` bytes starting at `offset`, failing instead of panicking on short input
pub fn take<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    let end = offset.checked_add(N).filter(|&end| end <= data.len()).ok_or_else(|| {
        Error::OutOfBounds(format!(
            "Read of {} bytes at offset {} exceeds buffer length {}",
            N,
            offset,
            data.len()
        ))
    })?;

    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&data[offset..end]);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tiff_magic() {
        assert_eq!(ByteOrder::from_tiff_magic(*b"II"), Some(ByteOrder::LittleEndian));
        assert_eq!(ByteOrder::from_tiff_magic(*b"MM"), Some(ByteOrder::BigEndian));
        assert_eq!(ByteOrder::from_tiff_magic(*b"XX"), None);
    }

    #[test]
    fn test_detect() {
        assert_eq!(ByteOrder::detect(b"II*\0").unwrap(), ByteOrder::LittleEndian);
        assert_eq!(ByteOrder::detect(b"MM\0*").unwrap(), ByteOrder::BigEndian);
        assert!(ByteOrder::detect(b"XX").is_err());
        assert!(ByteOrder::detect(b"I").is_err());
    }

    #[test]
    fn test_read_u16_both_orders() {
        let data = [0x34u8, 0x12];
        assert_eq!(ByteOrder::LittleEndian.read_u16(&data, 0).unwrap(), 0x1234);
        assert_eq!(ByteOrder::BigEndian.read_u16(&data, 0).unwrap(), 0x3412);
    }

    #[test]
    fn test_read_u32_at_offset() {
        let data = [0u8, 0x12, 0x34, 0x56, 0x78];
        assert_eq!(ByteOrder::BigEndian.read_u32(&data, 1).unwrap(), 0x12345678);
    }

    #[test]
    fn test_read_u64() {
        let data = [0x88u8, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11];
        assert_eq!(
            ByteOrder::LittleEndian.read_u64(&data, 0).unwrap(),
            0x1122334455667788
        );
    }

    #[test]
    fn test_floats() {
        let value = std::f64::consts::PI;
        assert_eq!(ByteOrder::BigEndian.f64(value.to_be_bytes()), value);
        assert_eq!(ByteOrder::LittleEndian.f32(1.5f32.to_le_bytes()), 1.5);
    }

    #[test]
    fn test_take_out_of_bounds() {
        let data = [1u8, 2, 3];
        assert!(take::<4>(&data, 0).is_err());
        assert!(take::<2>(&data, usize::MAX).is_err());
        assert_eq!(take::<2>(&data, 1).unwrap(), [2, 3]);
    }
}

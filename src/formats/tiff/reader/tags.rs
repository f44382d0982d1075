//! Tag value reading operations

use crate::error::{Error, Result};
use crate::io::ByteOrder;
use crate::io::byte_order::take;
use crate::formats::tiff::IFDEntry;
use crate::formats::tiff::tags::field_types;

/// Decodes the values of IFD entries from an in-memory TIFF
pub struct TagReader<'a> {
    data: &'a [u8],
    byte_order: ByteOrder,
    is_big_tiff: bool,
}

impl<'a> TagReader<'a> {
    pub fn new(data: &'a [u8], byte_order: ByteOrder, is_big_tiff: bool) -> Self {
        Self {
            data,
            byte_order,
            is_big_tiff,
        }
    }

    /// Raw bytes of the entry's values, inline or out of line
    fn value_bytes<'e>(&self, entry: &'e IFDEntry) -> Result<&'e [u8]>
    where
        'a: 'e,
    {
        let len = entry.byte_len();

        if entry.is_inline(self.is_big_tiff) {
            return Ok(&entry.value[..len]);
        }

        let start = entry.scalar as usize;
        let end = start.checked_add(len).filter(|&end| end <= self.data.len()).ok_or_else(|| {
            Error::OutOfBounds(format!(
                "Tag {} data at offset {} ({} bytes) exceeds file length {}",
                entry.tag,
                start,
                len,
                self.data.len()
            ))
        })?;

        Ok(&self.data[start..end])
    }

    /// Reads integer tag values widened to u64
    pub fn read_u64s(&self, entry: &IFDEntry) -> Result<Vec<u64>> {
        let bytes = self.value_bytes(entry)?;
        let order = self.byte_order;

        let values = match entry.field_type {
            field_types::BYTE | field_types::UNDEFINED => bytes.iter().map(|&b| b as u64).collect(),
            field_types::SHORT => bytes
                .chunks_exact(2)
                .map(|c| order.u16([c[0], c[1]]) as u64)
                .collect(),
            field_types::LONG => bytes
                .chunks_exact(4)
                .map(|c| order.u32([c[0], c[1], c[2], c[3]]) as u64)
                .collect(),
            field_types::LONG8 | field_types::IFD8 => bytes
                .chunks_exact(8)
                .map(|c| order.u64([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect(),
            other => {
                return Err(Error::InvalidFormat(format!(
                    "Tag {} has field type {}, expected an unsigned integer",
                    entry.tag, other
                )))
            }
        };

        Ok(values)
    }

    /// Reads u16 tag values (GeoKey directory)
    pub fn read_u16s(&self, entry: &IFDEntry) -> Result<Vec<u16>> {
        if entry.field_type != field_types::SHORT {
            return Err(Error::InvalidFormat(format!(
                "Tag {} has field type {}, expected SHORT",
                entry.tag, entry.field_type
            )));
        }

        let bytes = self.value_bytes(entry)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|c| self.byte_order.u16([c[0], c[1]]))
            .collect())
    }

    /// Reads numeric tag values as f64
    pub fn read_doubles(&self, entry: &IFDEntry) -> Result<Vec<f64>> {
        match entry.field_type {
            field_types::DOUBLE => {
                let bytes = self.value_bytes(entry)?;
                let mut values = Vec::with_capacity(entry.count as usize);
                for i in 0..entry.count as usize {
                    values.push(self.byte_order.f64(take(bytes, i * 8)?));
                }
                Ok(values)
            }
            field_types::FLOAT => {
                let bytes = self.value_bytes(entry)?;
                let mut values = Vec::with_capacity(entry.count as usize);
                for i in 0..entry.count as usize {
                    values.push(self.byte_order.f32(take(bytes, i * 4)?) as f64);
                }
                Ok(values)
            }
            _ => Ok(self.read_u64s(entry)?.into_iter().map(|v| v as f64).collect()),
        }
    }

    /// Reads an ASCII tag, dropping the NUL terminator
    pub fn read_ascii(&self, entry: &IFDEntry) -> Result<String> {
        let bytes = self.value_bytes(entry)?;
        let text = String::from_utf8_lossy(bytes);
        Ok(text.trim_end_matches('\0').to_string())
    }
}

//! Image File Directory (IFD) structures

use std::collections::HashMap;

use crate::types::{DataType, Dimensions};
use super::tags::{self, field_types};

/// One IFD entry
///
/// `value` holds the raw value/offset field exactly as it appears in the
/// file (4 bytes in classic TIFF, 8 in BigTIFF). `scalar` is the first value
/// decoded in the file's byte order when it fits inline, otherwise the
/// offset of the out-of-line data.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u64,
    pub value: [u8; 8],
    pub scalar: u64,
}

impl IFDEntry {
    /// Entry with a little-endian value field, as used by tests
    pub fn new(tag: u16, field_type: u16, count: u64, scalar: u64) -> Self {
        Self {
            tag,
            field_type,
            count,
            value: scalar.to_le_bytes(),
            scalar,
        }
    }

    pub fn field_type_size(&self) -> usize {
        field_types::size(self.field_type)
    }

    /// Total size of the entry's values in bytes
    pub fn byte_len(&self) -> usize {
        self.field_type_size() * self.count as usize
    }

    /// Whether the values are stored inline in the value field
    pub fn is_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        self.byte_len() <= inline_size
    }
}

/// An Image File Directory
#[derive(Debug, Clone)]
pub struct IFD {
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in file
    pub offset: u64,
    pub entries: Vec<IFDEntry>,
    tag_map: HashMap<u16, usize>,
}

impl IFD {
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            number,
            offset,
            entries: Vec::new(),
            tag_map: HashMap::new(),
        }
    }

    pub fn add_entry(&mut self, entry: IFDEntry) {
        let index = self.entries.len();
        self.tag_map.insert(entry.tag, index);
        self.entries.push(entry);
    }

    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag).and_then(|&idx| self.entries.get(idx))
    }

    /// Scalar value of a single-valued tag
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.get_entry(tag).map(|e| e.scalar)
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some(Dimensions::new(width, height))
    }

    /// Compression tag, defaulting to 1 (none)
    pub fn compression(&self) -> u64 {
        self.get_tag_value(tags::COMPRESSION).unwrap_or(1)
    }

    pub fn samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Bits per sample of the first band
    pub fn bits_per_sample(&self) -> u64 {
        self.get_tag_value(tags::BITS_PER_SAMPLE).unwrap_or(1)
    }

    pub fn sample_format(&self) -> u64 {
        self.get_tag_value(tags::SAMPLE_FORMAT).unwrap_or(1)
    }

    pub fn predictor(&self) -> u64 {
        self.get_tag_value(tags::PREDICTOR).unwrap_or(1)
    }

    pub fn is_planar(&self) -> bool {
        self.get_tag_value(tags::PLANAR_CONFIGURATION) == Some(2)
    }

    pub fn data_type(&self) -> Option<DataType> {
        DataType::from_format(self.sample_format(), self.bits_per_sample())
    }

    pub fn is_tiled(&self) -> bool {
        self.get_entry(tags::TILE_WIDTH).is_some()
    }

    pub fn tile_dimensions(&self) -> Option<Dimensions> {
        let width = self.get_tag_value(tags::TILE_WIDTH)?;
        let height = self.get_tag_value(tags::TILE_LENGTH)?;
        Some(Dimensions::new(width, height))
    }

    /// Rows per strip, defaulting to the whole image
    pub fn rows_per_strip(&self) -> Option<u64> {
        self.get_tag_value(tags::ROWS_PER_STRIP)
            .or_else(|| self.dimensions().map(|d| d.height))
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_geotiff(&self) -> bool {
        self.entries.iter().any(|e| {
            matches!(
                e.tag,
                tags::MODEL_PIXEL_SCALE
                    | tags::MODEL_TIEPOINT
                    | tags::MODEL_TRANSFORMATION
                    | tags::GEO_KEY_DIRECTORY
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ifd_with(entries: &[(u16, u16, u64)]) -> IFD {
        let mut ifd = IFD::new(0, 8);
        for &(tag, field_type, value) in entries {
            ifd.add_entry(IFDEntry::new(tag, field_type, 1, value));
        }
        ifd
    }

    #[test]
    fn test_is_inline() {
        let entry = IFDEntry::new(256, field_types::SHORT, 2, 0);
        assert!(entry.is_inline(false));

        let entry = IFDEntry::new(256, field_types::LONG, 2, 0);
        assert!(!entry.is_inline(false));
        assert!(entry.is_inline(true));
    }

    #[test]
    fn test_defaults() {
        let ifd = IFD::new(0, 8);
        assert_eq!(ifd.compression(), 1);
        assert_eq!(ifd.samples_per_pixel(), 1);
        assert_eq!(ifd.predictor(), 1);
        assert!(!ifd.is_planar());
        assert!(!ifd.is_tiled());
        assert!(!ifd.is_geotiff());
    }

    #[test]
    fn test_strip_layout_defaults_to_full_height() {
        let ifd = ifd_with(&[
            (tags::IMAGE_WIDTH, field_types::LONG, 64),
            (tags::IMAGE_LENGTH, field_types::LONG, 48),
        ]);
        assert_eq!(ifd.dimensions(), Some(Dimensions::new(64, 48)));
        assert_eq!(ifd.rows_per_strip(), Some(48));
    }

    #[test]
    fn test_data_type() {
        let ifd = ifd_with(&[
            (tags::BITS_PER_SAMPLE, field_types::SHORT, 32),
            (tags::SAMPLE_FORMAT, field_types::SHORT, 3),
        ]);
        assert_eq!(ifd.data_type(), Some(DataType::F32));
    }

    #[test]
    fn test_tiled() {
        let ifd = ifd_with(&[
            (tags::TILE_WIDTH, field_types::SHORT, 256),
            (tags::TILE_LENGTH, field_types::SHORT, 128),
        ]);
        assert!(ifd.is_tiled());
        assert_eq!(ifd.tile_dimensions(), Some(Dimensions::new(256, 128)));
    }
}

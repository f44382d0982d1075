//! TIFF reader modules

pub mod tags;
pub mod tiles;
pub mod pixels;

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::io::ByteOrder;
use crate::io::byte_order::take;
use crate::formats::tiff::{Tiff, IFD, IFDEntry, GeoInfo, TIFF_MAGIC, BIGTIFF_MAGIC};
use crate::formats::tiff::tags as tiff_tags;
use crate::raster::RasterGrid;

use self::tags::TagReader;
use self::tiles::ChunkLayout;

/// Upper bound on IFDs walked before the chain is considered corrupt
const MAX_IFDS: usize = 1000;

/// Reader over a TIFF or BigTIFF file held in memory
pub struct TiffReader {
    data: Vec<u8>,
    byte_order: ByteOrder,
    is_big_tiff: bool,
}

impl TiffReader {
    /// Reads a TIFF file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        debug!(path = %path.as_ref().display(), bytes = data.len(), "Read TIFF file");
        Self::from_bytes(data)
    }

    /// Parses the header of an in-memory TIFF
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let byte_order = ByteOrder::detect(&data)?;
        let magic = byte_order.read_u16(&data, 2)?;

        let is_big_tiff = match magic {
            TIFF_MAGIC => false,
            BIGTIFF_MAGIC => true,
            _ => return Err(Error::InvalidMagic(magic)),
        };

        if is_big_tiff {
            let offset_size = byte_order.read_u16(&data, 4)?;
            if offset_size != 8 {
                return Err(Error::InvalidFormat(format!(
                    "Invalid BigTIFF offset size: {}",
                    offset_size
                )));
            }
        }

        Ok(Self {
            data,
            byte_order,
            is_big_tiff,
        })
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Reads a file offset field (4 bytes, or 8 in BigTIFF)
    fn read_offset(&self, position: usize) -> Result<u64> {
        if self.is_big_tiff {
            self.byte_order.read_u64(&self.data, position)
        } else {
            Ok(self.byte_order.read_u32(&self.data, position)? as u64)
        }
    }

    /// Walks the IFD chain and returns the file structure
    pub fn read(&self) -> Result<Tiff> {
        let mut tiff = Tiff::new(self.is_big_tiff);
        let mut next_ifd_offset = self.read_offset(if self.is_big_tiff { 8 } else { 4 })?;
        let mut seen = HashSet::new();

        while next_ifd_offset != 0 {
            if tiff.ifd_count() >= MAX_IFDS || !seen.insert(next_ifd_offset) {
                return Err(Error::InvalidFormat("IFD chain is cyclic or too long".to_string()));
            }

            let (ifd, following) = self.read_ifd(tiff.ifd_count(), next_ifd_offset)?;
            tiff.add_ifd(ifd);
            next_ifd_offset = following;
        }

        Ok(tiff)
    }

    /// Reads the IFD at `offset`, returning it with the offset of the next one
    fn read_ifd(&self, number: usize, offset: u64) -> Result<(IFD, u64)> {
        let (entry_count, entry_size, mut position) = if self.is_big_tiff {
            (self.byte_order.read_u64(&self.data, offset as usize)?, 20, offset as usize + 8)
        } else {
            (self.byte_order.read_u16(&self.data, offset as usize)? as u64, 12, offset as usize + 2)
        };

        let mut ifd = IFD::new(number, offset);

        for _ in 0..entry_count {
            let entry = self.read_entry(position)?;
            ifd.add_entry(entry);
            position += entry_size;
        }

        let next = self.read_offset(position)?;
        Ok((ifd, next))
    }

    fn read_entry(&self, position: usize) -> Result<IFDEntry> {
        let order = self.byte_order;
        let tag = order.read_u16(&self.data, position)?;
        let field_type = order.read_u16(&self.data, position + 2)?;

        let (count, value) = if self.is_big_tiff {
            (order.read_u64(&self.data, position + 4)?, take::<8>(&self.data, position + 12)?)
        } else {
            let count = order.read_u32(&self.data, position + 4)? as u64;
            let field: [u8; 4] = take(&self.data, position + 8)?;
            let mut value = [0u8; 8];
            value[..4].copy_from_slice(&field);
            (count, value)
        };

        let mut entry = IFDEntry {
            tag,
            field_type,
            count,
            value,
            scalar: 0,
        };

        entry.scalar = if entry.is_inline(self.is_big_tiff) {
            let reader = TagReader::new(&self.data, order, self.is_big_tiff);
            match field_type {
                tiff_tags::field_types::BYTE
                | tiff_tags::field_types::SHORT
                | tiff_tags::field_types::LONG
                | tiff_tags::field_types::LONG8
                | tiff_tags::field_types::IFD8 => reader.read_u64s(&entry)?.first().copied().unwrap_or(0),
                _ => 0,
            }
        } else if self.is_big_tiff {
            order.u64(value)
        } else {
            order.u32([value[0], value[1], value[2], value[3]]) as u64
        };

        Ok(entry)
    }

    fn tag_reader(&self) -> TagReader<'_> {
        TagReader::new(&self.data, self.byte_order, self.is_big_tiff)
    }

    pub fn read_tag_u64s(&self, entry: &IFDEntry) -> Result<Vec<u64>> {
        self.tag_reader().read_u64s(entry)
    }

    pub fn read_tag_u16s(&self, entry: &IFDEntry) -> Result<Vec<u16>> {
        self.tag_reader().read_u16s(entry)
    }

    pub fn read_tag_doubles(&self, entry: &IFDEntry) -> Result<Vec<f64>> {
        self.tag_reader().read_doubles(entry)
    }

    pub fn read_tag_ascii(&self, entry: &IFDEntry) -> Result<String> {
        self.tag_reader().read_ascii(entry)
    }

    /// Decodes the first band of an image into row-major f64 samples
    pub fn read_band(&self, ifd: &IFD) -> Result<Vec<f64>> {
        let layout = ChunkLayout::from_ifd(ifd)?;
        let compression = Compression::from_tag(ifd.compression())?;
        let predictor = ifd.predictor();

        let (offsets_tag, counts_tag) = if layout.tiled {
            (tiff_tags::TILE_OFFSETS, tiff_tags::TILE_BYTE_COUNTS)
        } else {
            (tiff_tags::STRIP_OFFSETS, tiff_tags::STRIP_BYTE_COUNTS)
        };

        let offsets = self.read_tag_u64s(ifd.get_entry(offsets_tag).ok_or(Error::MissingTag(offsets_tag))?)?;
        let counts = self.read_tag_u64s(ifd.get_entry(counts_tag).ok_or(Error::MissingTag(counts_tag))?)?;

        let chunks = layout.chunks_per_plane();
        if offsets.len() < chunks || counts.len() < chunks {
            return Err(Error::InvalidFormat(format!(
                "Image needs {} chunks, file lists {} offsets and {} byte counts",
                chunks,
                offsets.len(),
                counts.len()
            )));
        }

        debug!(
            chunks,
            tiled = layout.tiled,
            compression = compression.name(),
            data_type = layout.data_type.name(),
            "Decoding band"
        );

        let mut band = vec![0.0; layout.image.pixel_count() as usize];

        for index in 0..chunks {
            let start = offsets[index] as usize;
            let end = start
                .checked_add(counts[index] as usize)
                .filter(|&end| end <= self.data.len())
                .ok_or_else(|| Error::OutOfBounds(format!("Chunk {} extends past end of file", index)))?;

            let buffer = layout.decode_chunk(&self.data[start..end], index, compression, predictor, self.byte_order)?;
            layout.copy_into(&buffer, index, &mut band, self.byte_order)?;
        }

        Ok(band)
    }

    /// Decodes the first image into a geo-referenced raster grid
    pub fn read_raster(&self) -> Result<RasterGrid> {
        let tiff = self.read()?;
        let ifd = tiff
            .main_ifd()
            .ok_or_else(|| Error::InvalidFormat("File contains no images".to_string()))?;

        let dims = ifd
            .dimensions()
            .ok_or_else(|| Error::InvalidFormat("Image dimensions not declared".to_string()))?;

        let geo = GeoInfo::from_ifd(ifd, self)?;
        let transform = geo.geo_transform().ok_or_else(|| {
            Error::InvalidFormat("Raster has no georeferencing (transformation or tiepoint tags)".to_string())
        })?;

        let band = self.read_band(ifd)?;
        let grid = RasterGrid::new(dims.height as usize, dims.width as usize, band, transform)?
            .with_nodata(geo.nodata)
            .with_crs(geo.crs());

        info!(
            rows = grid.rows(),
            cols = grid.cols(),
            crs = %grid.crs().map_or_else(|| "none".to_string(), |c| c.to_string()),
            nodata = ?grid.nodata(),
            "Decoded raster"
        );

        Ok(grid)
    }
}

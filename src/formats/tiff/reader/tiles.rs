//! Strip and tile layout

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::formats::tiff::IFD;
use crate::io::ByteOrder;
use crate::types::{DataType, Dimensions};

use super::pixels::PixelReader;

/// How the first band of an image is split into independently
/// compressed chunks (strips or tiles)
#[derive(Debug, Clone)]
pub struct ChunkLayout {
    pub image: Dimensions,
    pub chunk: Dimensions,
    pub tiled: bool,
    pub planar: bool,
    pub samples_per_pixel: usize,
    pub data_type: DataType,
    chunks_across: u64,
    chunks_down: u64,
}

impl ChunkLayout {
    pub fn from_ifd(ifd: &IFD) -> Result<Self> {
        let image = ifd
            .dimensions()
            .ok_or_else(|| Error::InvalidFormat("Image dimensions not declared".to_string()))?;

        let data_type = ifd.data_type().ok_or_else(|| {
            Error::Unsupported(format!(
                "Sample format {} with {} bits per sample",
                ifd.sample_format(),
                ifd.bits_per_sample()
            ))
        })?;

        let tiled = ifd.is_tiled();
        let chunk = if tiled {
            ifd.tile_dimensions()
                .ok_or_else(|| Error::InvalidFormat("Incomplete tile dimensions".to_string()))?
        } else {
            let rows_per_strip = ifd.rows_per_strip().unwrap_or(image.height).min(image.height);
            Dimensions::new(image.width, rows_per_strip)
        };

        if chunk.width == 0 || chunk.height == 0 {
            return Err(Error::InvalidFormat(format!(
                "Degenerate chunk size {} x {}",
                chunk.width, chunk.height
            )));
        }

        Ok(Self {
            image,
            chunk,
            tiled,
            planar: ifd.is_planar(),
            samples_per_pixel: ifd.samples_per_pixel().max(1) as usize,
            data_type,
            chunks_across: image.width.div_ceil(chunk.width),
            chunks_down: image.height.div_ceil(chunk.height),
        })
    }

    /// Number of chunks holding the first band
    pub fn chunks_per_plane(&self) -> usize {
        (self.chunks_across * self.chunks_down) as usize
    }

    /// Samples interleaved per pixel inside one chunk
    pub fn stride(&self) -> usize {
        if self.planar {
            1
        } else {
            self.samples_per_pixel
        }
    }

    /// Image (row, col) of a chunk's upper-left pixel
    pub fn chunk_origin(&self, index: usize) -> (u64, u64) {
        let index = index as u64;
        let row = (index / self.chunks_across) * self.chunk.height;
        let col = (index % self.chunks_across) * self.chunk.width;
        (row, col)
    }

    /// Rows stored in a chunk; the last strip may be short, tiles never are
    pub fn chunk_rows(&self, index: usize) -> u64 {
        if self.tiled {
            return self.chunk.height;
        }
        let (row, _) = self.chunk_origin(index);
        self.chunk.height.min(self.image.height.saturating_sub(row))
    }

    /// Decoded size in bytes of chunk `index`
    pub fn decoded_len(&self, index: usize) -> usize {
        self.chunk.width as usize * self.chunk_rows(index) as usize * self.stride() * self.data_type.size()
    }

    /// Decompresses one chunk and reverses its predictor
    pub fn decode_chunk(
        &self,
        raw: &[u8],
        index: usize,
        compression: Compression,
        predictor: u64,
        order: ByteOrder,
    ) -> Result<Vec<u8>> {
        let expected = self.decoded_len(index);
        let mut buffer = compression.decompress(raw, expected)?;

        if buffer.len() < expected {
            return Err(Error::InvalidFormat(format!(
                "Chunk {} decoded to {} bytes, expected {}",
                index,
                buffer.len(),
                expected
            )));
        }
        buffer.truncate(expected);

        match predictor {
            1 => {}
            2 => PixelReader::undo_horizontal_predictor(
                &mut buffer,
                self.chunk.width as usize,
                self.stride(),
                self.data_type.size(),
                order,
            )?,
            other => return Err(Error::Unsupported(format!("Predictor {}", other))),
        }

        Ok(buffer)
    }

    /// Copies the first-band samples of a decoded chunk into the row-major band
    pub fn copy_into(&self, buffer: &[u8], index: usize, band: &mut [f64], order: ByteOrder) -> Result<()> {
        let (row0, col0) = self.chunk_origin(index);
        let width = self.image.width as usize;

        for r in 0..self.chunk_rows(index) {
            let row = row0 + r;
            if row >= self.image.height {
                break;
            }
            for c in 0..self.chunk.width {
                let col = col0 + c;
                if col >= self.image.width {
                    break;
                }
                let sample_index = (r * self.chunk.width + c) as usize * self.stride();
                band[row as usize * width + col as usize] =
                    PixelReader::sample(buffer, sample_index, self.data_type, order)?;
            }
        }

        Ok(())
    }
}

//! TIFF data structures

use std::fmt;

use super::ifd::IFD;
use crate::compression::Compression;

/// Represents a TIFF or BigTIFF file
#[derive(Debug)]
pub struct Tiff {
    /// Whether this is BigTIFF format
    pub is_big_tiff: bool,
    /// Image File Directories
    pub ifds: Vec<IFD>,
}

impl Tiff {
    pub fn new(is_big_tiff: bool) -> Self {
        Self {
            is_big_tiff,
            ifds: Vec::new(),
        }
    }

    pub fn add_ifd(&mut self, ifd: IFD) {
        self.ifds.push(ifd);
    }

    /// Returns the main (first) IFD, the only one the analysis reads
    pub fn main_ifd(&self) -> Option<&IFD> {
        self.ifds.first()
    }

    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }
}

impl fmt::Display for Tiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format: {}", if self.is_big_tiff { "BigTIFF" } else { "TIFF" })?;
        writeln!(f, "Images: {}", self.ifds.len())?;

        if let Some(ifd) = self.main_ifd() {
            if let Some(dims) = ifd.dimensions() {
                writeln!(f, "Dimensions: {} x {}", dims.width, dims.height)?;
            }
            writeln!(f, "Samples per pixel: {}", ifd.samples_per_pixel())?;
            match ifd.data_type() {
                Some(data_type) => writeln!(f, "Sample type: {}", data_type.name())?,
                None => writeln!(
                    f,
                    "Sample type: format {} / {} bits",
                    ifd.sample_format(),
                    ifd.bits_per_sample()
                )?,
            }
            match Compression::from_tag(ifd.compression()) {
                Ok(compression) => writeln!(f, "Compression: {}", compression.name())?,
                Err(_) => writeln!(f, "Compression: unsupported ({})", ifd.compression())?,
            }
            writeln!(f, "Layout: {}", if ifd.is_tiled() { "tiled" } else { "stripped" })?;
            writeln!(f, "GeoTIFF: {}", if ifd.is_geotiff() { "yes" } else { "no" })?;
        }

        Ok(())
    }
}

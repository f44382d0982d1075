//! GeoTIFF specific functionality

use std::fmt;

use tracing::warn;

use crate::error::Result;
use crate::projection::{epsg, Crs};
use crate::raster::GeoTransform;
use super::ifd::IFD;
use super::tags::{self, geo_keys};
use super::reader::TiffReader;

/// GeoTIFF information extracted from an IFD
#[derive(Debug, Default)]
pub struct GeoInfo {
    /// Model pixel scale (ScaleX, ScaleY, ScaleZ)
    pub pixel_scale: Option<[f64; 3]>,
    /// Model tiepoints (pixel coord -> model coord)
    pub tiepoints: Vec<TiePoint>,
    /// 4 x 4 ModelTransformation matrix, row-major
    pub model_transformation: Option<[f64; 16]>,
    /// Entries of the GeoKey directory
    pub geo_keys: Vec<GeoKey>,
    /// GDAL nodata sentinel
    pub nodata: Option<f64>,
}

/// Represents a GeoTIFF tiepoint
#[derive(Debug, Clone, Copy)]
pub struct TiePoint {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub geo_x: f64,
    pub geo_y: f64,
}

/// One GeoKey directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKey {
    pub id: u16,
    /// Tag holding the value, 0 when the value is stored inline
    pub location: u16,
    pub count: u16,
    pub value: u16,
}

impl GeoInfo {
    /// Extracts GeoTIFF information from an IFD
    pub fn from_ifd(ifd: &IFD, reader: &TiffReader) -> Result<Self> {
        let mut geo_info = GeoInfo::default();

        if let Some(entry) = ifd.get_entry(tags::MODEL_PIXEL_SCALE) {
            let values = reader.read_tag_doubles(entry)?;
            if let [x, y, z, ..] = values[..] {
                geo_info.pixel_scale = Some([x, y, z]);
            }
        }

        if let Some(entry) = ifd.get_entry(tags::MODEL_TIEPOINT) {
            let values = reader.read_tag_doubles(entry)?;
            geo_info.tiepoints = values
                .chunks_exact(6)
                .map(|c| TiePoint {
                    pixel_x: c[0],
                    pixel_y: c[1],
                    geo_x: c[3],
                    geo_y: c[4],
                })
                .collect();
        }

        if let Some(entry) = ifd.get_entry(tags::MODEL_TRANSFORMATION) {
            let values = reader.read_tag_doubles(entry)?;
            if let Ok(matrix) = <[f64; 16]>::try_from(values.as_slice()) {
                geo_info.model_transformation = Some(matrix);
            }
        }

        if let Some(entry) = ifd.get_entry(tags::GEO_KEY_DIRECTORY) {
            let keys = reader.read_tag_u16s(entry)?;
            if keys.len() >= 4 {
                let num_keys = keys[3] as usize;
                geo_info.geo_keys = keys[4..]
                    .chunks_exact(4)
                    .take(num_keys)
                    .map(|k| GeoKey {
                        id: k[0],
                        location: k[1],
                        count: k[2],
                        value: k[3],
                    })
                    .collect();
            }
        }

        if let Some(entry) = ifd.get_entry(tags::GDAL_NODATA) {
            let text = reader.read_tag_ascii(entry)?;
            match text.trim().parse::<f64>() {
                Ok(value) => geo_info.nodata = Some(value),
                Err(_) => warn!(value = %text, "Ignoring unparseable GDAL_NODATA"),
            }
        }

        Ok(geo_info)
    }

    /// Inline value of a GeoKey
    pub fn key_value(&self, id: u16) -> Option<u16> {
        self.geo_keys
            .iter()
            .find(|key| key.id == id && key.location == 0)
            .map(|key| key.value)
    }

    /// Whether pixel values refer to cell centres rather than cell areas
    pub fn is_pixel_is_point(&self) -> bool {
        self.key_value(geo_keys::RASTER_TYPE) == Some(geo_keys::RASTER_PIXEL_IS_POINT)
    }

    /// EPSG code from ProjectedCSType, falling back to GeographicType
    pub fn epsg_code(&self) -> Option<u32> {
        [geo_keys::PROJECTED_CS_TYPE, geo_keys::GEOGRAPHIC_TYPE]
            .iter()
            .filter_map(|&id| self.key_value(id))
            .map(u32::from)
            .find(|&code| code != 0 && code != epsg::USER_DEFINED)
    }

    pub fn crs(&self) -> Option<Crs> {
        self.epsg_code().map(Crs::epsg)
    }

    /// Affine transform from grid to model coordinates, with the origin at
    /// the upper-left corner of the upper-left cell
    pub fn geo_transform(&self) -> Option<GeoTransform> {
        let transform = if let Some(m) = &self.model_transformation {
            GeoTransform::new([m[0], m[1], m[3], m[4], m[5], m[7]])
        } else {
            let [scale_x, scale_y, _] = self.pixel_scale?;
            let tp = self.tiepoints.first()?;
            GeoTransform::new([
                scale_x,
                0.0,
                tp.geo_x - scale_x * tp.pixel_x,
                0.0,
                -scale_y,
                tp.geo_y + scale_y * tp.pixel_y,
            ])
        };

        if self.is_pixel_is_point() {
            let corner = transform.apply(-0.5, -0.5);
            return Some(GeoTransform {
                x_origin: corner.x,
                y_origin: corner.y,
                ..transform
            });
        }

        Some(transform)
    }
}

impl fmt::Display for GeoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GeoTIFF Information:")?;

        if let Some(code) = self.epsg_code() {
            writeln!(f, "  EPSG Code: {}", code)?;
        }

        if let Some([sx, sy, _]) = self.pixel_scale {
            writeln!(f, "  Pixel Size: {} x {}", sx, sy)?;
        }

        if let Some(tp) = self.tiepoints.first() {
            writeln!(f, "  Origin (geo): ({}, {})", tp.geo_x, tp.geo_y)?;
        }

        if let Some(nodata) = self.nodata {
            writeln!(f, "  NoData: {}", nodata)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tiff::fixture::TiffBuilder;
    use crate::io::ByteOrder;

    fn geo_info(builder: TiffBuilder) -> GeoInfo {
        let reader = TiffReader::from_bytes(builder.build()).unwrap();
        let tiff = reader.read().unwrap();
        GeoInfo::from_ifd(tiff.main_ifd().unwrap(), &reader).unwrap()
    }

    fn image() -> TiffBuilder {
        TiffBuilder::image(ByteOrder::BigEndian, 4, 4, 8, 1)
    }

    #[test]
    fn test_scale_and_tiepoint() {
        let info = geo_info(
            image()
                .doubles(tags::MODEL_PIXEL_SCALE, &[1000.0, 1000.0, 0.0])
                .doubles(tags::MODEL_TIEPOINT, &[2.0, 1.0, 0.0, 500_000.0, 4_000_000.0, 0.0]),
        );

        let t = info.geo_transform().unwrap();
        assert_eq!(t.coefficients(), [1000.0, 0.0, 498_000.0, 0.0, -1000.0, 4_001_000.0]);
    }

    #[test]
    fn test_model_transformation_wins() {
        let mut matrix = [0.0; 16];
        matrix[0] = 2.0;
        matrix[3] = 100.0;
        matrix[5] = -3.0;
        matrix[7] = 200.0;
        matrix[15] = 1.0;

        let info = geo_info(
            image()
                .doubles(tags::MODEL_TRANSFORMATION, &matrix)
                .doubles(tags::MODEL_PIXEL_SCALE, &[9.0, 9.0, 0.0])
                .doubles(tags::MODEL_TIEPOINT, &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        );

        let t = info.geo_transform().unwrap();
        assert_eq!(t.coefficients(), [2.0, 0.0, 100.0, 0.0, -3.0, 200.0]);
    }

    #[test]
    fn test_pixel_is_point_shifts_origin() {
        let info = geo_info(
            image()
                .doubles(tags::MODEL_PIXEL_SCALE, &[1.0, 1.0, 0.0])
                .doubles(tags::MODEL_TIEPOINT, &[0.0, 0.0, 0.0, 10.0, 20.0, 0.0])
                .shorts(tags::GEO_KEY_DIRECTORY, &[1, 1, 0, 1, geo_keys::RASTER_TYPE, 0, 1, 2]),
        );

        assert!(info.is_pixel_is_point());
        let t = info.geo_transform().unwrap();
        assert_eq!((t.x_origin, t.y_origin), (9.5, 20.5));
    }

    #[test]
    fn test_epsg_prefers_projected() {
        let info = geo_info(image().shorts(
            tags::GEO_KEY_DIRECTORY,
            &[1, 1, 0, 2, geo_keys::GEOGRAPHIC_TYPE, 0, 1, 4326, geo_keys::PROJECTED_CS_TYPE, 0, 1, 32633],
        ));
        assert_eq!(info.epsg_code(), Some(32633));
        assert_eq!(info.crs(), Some(Crs::epsg(32633)));
    }

    #[test]
    fn test_user_defined_crs_is_none() {
        let info = geo_info(image().shorts(
            tags::GEO_KEY_DIRECTORY,
            &[1, 1, 0, 1, geo_keys::PROJECTED_CS_TYPE, 0, 1, 32767],
        ));
        assert_eq!(info.crs(), None);
    }

    #[test]
    fn test_nodata() {
        assert_eq!(geo_info(image().ascii(tags::GDAL_NODATA, "-32768")).nodata, Some(-32768.0));
        assert!(geo_info(image().ascii(tags::GDAL_NODATA, "nan")).nodata.unwrap().is_nan());
        assert_eq!(geo_info(image().ascii(tags::GDAL_NODATA, "n/a")).nodata, None);
    }

    #[test]
    fn test_no_georeferencing() {
        let info = geo_info(image());
        assert!(info.geo_transform().is_none());
        assert!(info.crs().is_none());
    }
}

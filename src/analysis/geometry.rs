//! Matched cells to geometries

use geo::{Area, Geometry, Point};

use crate::raster::RasterGrid;
use super::{PixelGeometry, PixelSet, PixelShape};

/// Builds one geometry per matched cell in the raster's native CRS
///
/// Points sit on cell centres. Squares are the axis-aligned cell footprint
/// (pixel width x |pixel height|) centred on the same point, stored as a
/// polygon so reprojection can bend their edges. Each pixel carries the cell
/// area in native units.
pub fn build_pixel_geometries(raster: &RasterGrid, cells: &[(usize, usize)], shape: PixelShape) -> PixelSet {
    let transform = raster.transform();

    let pixels = cells
        .iter()
        .filter_map(|&(row, col)| {
            let value = raster.get(row, col)?;
            let (geometry, area) = match shape {
                PixelShape::Point => {
                    let center = transform.pixel_center(row, col);
                    (Geometry::Point(Point::from(center)), transform.pixel_area())
                }
                PixelShape::Square => {
                    let footprint = transform.pixel_footprint(row, col);
                    (Geometry::Polygon(footprint.to_polygon()), footprint.unsigned_area())
                }
            };

            Some(PixelGeometry {
                row,
                col,
                value,
                geometry,
                area,
            })
        })
        .collect();

    PixelSet::new(pixels, shape, raster.crs().cloned())
}

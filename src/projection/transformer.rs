use geo::{Coord, Geometry, MapCoords};
use proj::Proj;

use crate::error::{Error, Result};
use super::Crs;

/// Transforms coordinates between two coordinate reference systems
///
/// Axis order is always (x, y) = (easting/longitude, northing/latitude),
/// whatever the authority definition says.
pub struct Transformer {
    proj: Proj,
    from: Crs,
    to: Crs,
}

impl Transformer {
    /// Creates a new transformer from source to target CRS
    pub fn new(from: &Crs, to: &Crs) -> Result<Self> {
        let proj = Proj::new_known_crs(from.definition(), to.definition(), None)
            .map_err(|e| Error::Projection(format!("Failed to create projection {} -> {}: {}", from, to, e)))?;

        Ok(Self {
            proj,
            from: from.clone(),
            to: to.clone(),
        })
    }

    /// Transforms a single coordinate
    pub fn transform(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let (x, y) = self.proj.convert((coord.x, coord.y))
            .map_err(|e| {
                Error::Projection(format!(
                    "Transformation of ({}, {}) from {} failed: {}",
                    coord.x, coord.y, self.from, e
                ))
            })?;

        if !x.is_finite() || !y.is_finite() {
            return Err(Error::Projection(format!(
                "Coordinate ({}, {}) has no finite image in {}",
                coord.x, coord.y, self.to
            )));
        }

        Ok(Coord { x, y })
    }

    /// Transforms every vertex of a geometry
    pub fn transform_geometry(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        geometry.try_map_coords(|coord| self.transform(coord))
    }

    pub fn to_crs(&self) -> &Crs {
        &self.to
    }
}

//! Coordinate reference system identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

/// EPSG codes used by the analysis
pub mod epsg {
    /// WGS 84 geographic longitude/latitude
    pub const WGS84: u32 = 4326;
    /// WGS 84 / NSIDC EASE-Grid 2.0 Global, a cylindrical equal-area system in metres
    pub const EASE_GRID_2_GLOBAL: u32 = 6933;
    /// Raster GeoKey value meaning "user-defined"
    pub const USER_DEFINED: u32 = 32767;
}

/// A coordinate reference system, held as any definition PROJ accepts
/// ("EPSG:4326", a PROJ string or WKT)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(String);

impl Crs {
    pub fn epsg(code: u32) -> Self {
        Self(format!("EPSG:{}", code))
    }

    pub fn from_definition(definition: impl Into<String>) -> Self {
        Self(definition.into())
    }

    /// Geographic WGS 84, the CRS of GeoJSON boundaries
    pub fn wgs84() -> Self {
        Self::epsg(epsg::WGS84)
    }

    /// Default equal-area target for area measurement
    pub fn world_equal_area() -> Self {
        Self::epsg(epsg::EASE_GRID_2_GLOBAL)
    }

    pub fn definition(&self) -> &str {
        &self.0
    }

    /// EPSG code when the definition has the "EPSG:<code>" form
    pub fn epsg_code(&self) -> Option<u32> {
        let (authority, code) = self.0.split_once(':')?;
        if authority.eq_ignore_ascii_case("epsg") {
            code.trim().parse().ok()
        } else {
            None
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

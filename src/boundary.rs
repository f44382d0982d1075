//! Country boundary datasets

use std::collections::BTreeMap;
use std::path::Path;

use geo::{Area, Geometry, MapCoords, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::projection::{Crs, Reproject, Transformer};

/// Natural Earth 1:110m admin-0 countries
pub const DEFAULT_SOURCE: &str =
    "https://github.com/nvkelso/natural-earth-vector/raw/master/geojson/ne_110m_admin_0_countries.geojson";

/// Property carrying the country name in Natural Earth admin-0 data
pub const DEFAULT_NAME_FIELD: &str = "ADMIN";

/// One boundary polygon with its admin name
///
/// Several countries may share a name (overseas parts stored as separate
/// features); they are aggregated together.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl Country {
    pub fn new(name: impl Into<String>, geometry: impl Into<MultiPolygon<f64>>) -> Self {
        Self {
            name: name.into(),
            geometry: geometry.into(),
        }
    }
}

/// A set of country polygons in one coordinate reference system
#[derive(Debug, Clone)]
pub struct BoundarySet {
    crs: Option<Crs>,
    countries: Vec<Country>,
}

impl BoundarySet {
    pub fn new(countries: Vec<Country>, crs: Option<Crs>) -> Self {
        Self { crs, countries }
    }

    /// Parses a GeoJSON FeatureCollection in WGS 84
    ///
    /// Features are kept when their geometry is a Polygon or MultiPolygon and
    /// `name_field` is a string property; anything else is skipped.
    pub fn from_geojson_str(text: &str, name_field: &str) -> Result<Self> {
        let collection = FeatureCollection::try_from(text.parse::<GeoJson>()?)?;
        let total = collection.features.len();

        let mut countries = Vec::with_capacity(total);
        for (index, feature) in collection.features.into_iter().enumerate() {
            let Some(name) = feature.property(name_field).and_then(|v| v.as_str()).map(str::to_owned) else {
                debug!(index, field = name_field, "Skipping feature without a name");
                continue;
            };

            let Some(geometry) = feature.geometry else {
                debug!(index, name = %name, "Skipping feature without geometry");
                continue;
            };

            match Geometry::<f64>::try_from(geometry.value)? {
                Geometry::Polygon(polygon) => countries.push(Country::new(name, polygon)),
                Geometry::MultiPolygon(multi) => countries.push(Country::new(name, multi)),
                _ => debug!(index, name = %name, "Skipping non-polygonal feature"),
            }
        }

        if countries.is_empty() {
            return Err(Error::Boundary(format!(
                "None of {} features has polygon geometry and a '{}' property",
                total, name_field
            )));
        }

        debug!(kept = countries.len(), total, "Parsed boundaries");
        Ok(Self::new(countries, Some(Crs::wgs84())))
    }

    /// Loads boundaries from a GeoJSON file path or an http(s) URL
    pub fn load(source: &str, name_field: &str) -> Result<Self> {
        let text = if source.starts_with("http://") || source.starts_with("https://") {
            info!(url = source, "Downloading boundaries");
            reqwest::blocking::get(source)?.error_for_status()?.text()?
        } else {
            info!(path = source, "Reading boundaries");
            std::fs::read_to_string(Path::new(source))?
        };

        let set = Self::from_geojson_str(&text, name_field)?;
        info!(countries = set.len(), "Loaded boundaries");
        Ok(set)
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Area of all polygons sharing each name, in squared CRS units
    pub fn country_areas(&self) -> BTreeMap<String, f64> {
        let mut areas = BTreeMap::new();
        for country in &self.countries {
            *areas.entry(country.name.clone()).or_insert(0.0) += country.geometry.unsigned_area();
        }
        areas
    }
}

impl Reproject for BoundarySet {
    const DATASET: &'static str = "boundaries";

    fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    fn reproject_with(&self, transformer: &Transformer) -> Result<Self> {
        let countries = self
            .countries
            .iter()
            .map(|country| {
                let geometry = country.geometry.try_map_coords(|coord| transformer.transform(coord))?;
                Ok(Country {
                    name: country.name.clone(),
                    geometry,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(countries, Some(transformer.to_crs().clone())))
    }
}

//! Pixel-to-country coverage analysis
//!
//! A run matches raster cells against a value range, turns the matched cells
//! into geometries, reprojects pixels and boundaries into one equal-area
//! system, joins them spatially and aggregates the result per country.

pub mod aggregate;
pub mod geometry;
pub mod join;
pub mod pipeline;

pub use aggregate::{aggregate, AreaUnit, OverlapPolicy, SortKey, SummaryRow, SummaryTable};
pub use geometry::build_pixel_geometries;
pub use join::{spatial_join, JoinPair, JoinResult};
pub use pipeline::{Analysis, AnalysisParams, Outcome, Pipeline};

use std::fmt;
use std::str::FromStr;

use geo::{Area, Geometry};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::projection::{Crs, Reproject, Transformer};

/// How a matched cell is represented geometrically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelShape {
    /// Cell centre only
    Point,
    /// Full cell footprint
    #[default]
    Square,
}

impl FromStr for PixelShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "point" | "points" => Ok(PixelShape::Point),
            "square" | "squares" => Ok(PixelShape::Square),
            other => Err(Error::Config(format!("Unknown pixel shape '{}'", other))),
        }
    }
}

impl fmt::Display for PixelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PixelShape::Point => "point",
            PixelShape::Square => "square",
        })
    }
}

/// A matched raster cell as a geometry
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGeometry {
    pub row: usize,
    pub col: usize,
    pub value: f64,
    pub geometry: Geometry<f64>,
    /// Cell area in squared units of the set's current CRS
    pub area: f64,
}

/// Geometries of all matched cells of one run, tagged with their CRS
#[derive(Debug, Clone)]
pub struct PixelSet {
    crs: Option<Crs>,
    shape: PixelShape,
    pixels: Vec<PixelGeometry>,
}

impl PixelSet {
    pub fn new(pixels: Vec<PixelGeometry>, shape: PixelShape, crs: Option<Crs>) -> Self {
        Self { crs, shape, pixels }
    }

    pub fn shape(&self) -> PixelShape {
        self.shape
    }

    pub fn pixels(&self) -> &[PixelGeometry] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Gives every pixel the same nominal area (point mode)
    pub fn assign_uniform_area(&mut self, area: f64) {
        for pixel in &mut self.pixels {
            pixel.area = area;
        }
    }

    /// Sum of the pixels' own areas
    pub fn total_area(&self) -> f64 {
        self.pixels.iter().map(|p| p.area).sum()
    }
}

impl Reproject for PixelSet {
    const DATASET: &'static str = "raster";

    fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Squares get their area recomputed from the projected polygon; points
    /// keep theirs until a uniform area is assigned.
    fn reproject_with(&self, transformer: &Transformer) -> Result<Self> {
        let pixels = self
            .pixels
            .iter()
            .map(|pixel| {
                let geometry = transformer.transform_geometry(&pixel.geometry)?;
                let area = match self.shape {
                    PixelShape::Square => geometry.unsigned_area(),
                    PixelShape::Point => pixel.area,
                };
                Ok(PixelGeometry {
                    geometry,
                    area,
                    ..pixel.clone()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(pixels, self.shape, Some(transformer.to_crs().clone())))
    }
}

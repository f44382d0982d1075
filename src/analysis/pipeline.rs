//! End-to-end coverage run

use std::time::Instant;

use geo::{Area, Geometry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::boundary::BoundarySet;
use crate::error::{Error, Result};
use crate::projection::{epsg, Crs, Reproject, Transformer};
use crate::raster::{RasterGrid, ValueRange};
use super::{aggregate, build_pixel_geometries, spatial_join};
use super::{AreaUnit, OverlapPolicy, PixelShape, SortKey, SummaryTable};

/// Parameters of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub range: ValueRange,
    pub shape: PixelShape,
    /// Equal-area CRS both sets are measured in
    pub target_crs: Crs,
    pub unit: AreaUnit,
    pub overlap: OverlapPolicy,
    pub sort: SortKey,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            range: ValueRange::new(95.0, 100.0),
            shape: PixelShape::Square,
            target_crs: Crs::world_equal_area(),
            unit: AreaUnit::SquareKilometres,
            overlap: OverlapPolicy::FullCount,
            sort: SortKey::MatchedPixels,
        }
    }
}

impl AnalysisParams {
    pub fn new(range: ValueRange) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }
}

/// Result of a run
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No cell fell inside the value range
    NoMatches,
    /// Per-country rows; empty when matched pixels touched no country
    Summary(SummaryTable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Cells whose value fell inside the range
    pub matched_cells: usize,
    /// Matched pixels that intersected no country
    pub unjoined_pixels: usize,
    pub outcome: Outcome,
}

impl Analysis {
    pub fn summary(&self) -> Option<&SummaryTable> {
        match &self.outcome {
            Outcome::Summary(table) => Some(table),
            Outcome::NoMatches => None,
        }
    }
}

/// Runs coverage analyses of one raster against one boundary set
///
/// Both inputs are borrowed read-only, so the same pipeline can be run
/// repeatedly with different parameters.
pub struct Pipeline<'a> {
    raster: &'a RasterGrid,
    boundaries: &'a BoundarySet,
}

impl<'a> Pipeline<'a> {
    pub fn new(raster: &'a RasterGrid, boundaries: &'a BoundarySet) -> Self {
        Self { raster, boundaries }
    }

    pub fn run(&self, params: &AnalysisParams) -> Result<Analysis> {
        let started = Instant::now();

        if self.raster.crs().is_none() {
            return Err(Error::MissingCrs { dataset: "raster" });
        }
        if self.boundaries.crs().is_none() {
            return Err(Error::MissingCrs { dataset: "boundaries" });
        }
        if params.target_crs.epsg_code() == Some(epsg::WGS84) {
            warn!(target = %params.target_crs, "Target CRS is geographic, areas come out in square degrees");
        }

        let cells = self.raster.matching_cells(&params.range);
        debug!(min = params.range.min, max = params.range.max, matched = cells.len(), "Matched cells");

        if cells.is_empty() {
            info!(min = params.range.min, max = params.range.max, "No pixels in range");
            return Ok(Analysis {
                matched_cells: 0,
                unjoined_pixels: 0,
                outcome: Outcome::NoMatches,
            });
        }

        let mut pixels = build_pixel_geometries(self.raster, &cells, params.shape).reproject(&params.target_crs)?;

        if params.shape == PixelShape::Point {
            let area = self.nominal_pixel_area(&params.target_crs)?;
            debug!(area, "Uniform point area");
            pixels.assign_uniform_area(area);
        }

        let countries = self.boundaries.reproject(&params.target_crs)?;
        let join = spatial_join(&pixels, &countries);

        let mut table = aggregate(&join, &pixels, &countries, params.unit, params.overlap);
        table.sort_by(params.sort);

        info!(
            matched = cells.len(),
            countries = table.len(),
            unjoined = join.unjoined,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(Analysis {
            matched_cells: cells.len(),
            unjoined_pixels: join.unjoined,
            outcome: Outcome::Summary(table),
        })
    }

    /// Projected area of the raster's centre cell, used for every point
    ///
    /// Taken from the cell footprint alone, so it holds when the centre
    /// cell is nodata.
    fn nominal_pixel_area(&self, target: &Crs) -> Result<f64> {
        let (row, col) = (self.raster.rows() / 2, self.raster.cols() / 2);
        let footprint = Geometry::Polygon(self.raster.transform().pixel_footprint(row, col).to_polygon());

        let source = self.raster.crs().ok_or(Error::MissingCrs { dataset: "raster" })?;
        if source == target {
            return Ok(footprint.unsigned_area());
        }

        let projected = Transformer::new(source, target)?.transform_geometry(&footprint)?;
        Ok(projected.unsigned_area())
    }
}

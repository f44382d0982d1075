//! Single-band raster grid

use std::fmt;

use crate::error::{Error, Result};
use crate::projection::Crs;
use super::{GeoTransform, ValueRange};

/// A decoded raster band with its geo-referencing
///
/// Samples are stored row-major. The grid is never modified by an analysis
/// run; every run derives fresh geometries from it.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    transform: GeoTransform,
    nodata: Option<f64>,
    crs: Option<Crs>,
}

impl RasterGrid {
    /// Creates a grid from row-major samples
    pub fn new(rows: usize, cols: usize, data: Vec<f64>, transform: GeoTransform) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidFormat(format!(
                "Raster of {} x {} needs {} samples, got {}",
                rows,
                cols,
                rows * cols,
                data.len()
            )));
        }

        Ok(Self {
            rows,
            cols,
            data,
            transform,
            nodata: None,
            crs: None,
        })
    }

    /// Creates a grid from nested rows; every row must have the same length
    pub fn from_rows(values: Vec<Vec<f64>>, transform: GeoTransform) -> Result<Self> {
        let rows = values.len();
        let cols = values.first().map_or(0, Vec::len);

        if values.iter().any(|row| row.len() != cols) {
            return Err(Error::InvalidFormat("Ragged raster rows".to_string()));
        }

        Self::new(rows, cols, values.into_iter().flatten().collect(), transform)
    }

    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn with_crs(mut self, crs: Option<Crs>) -> Self {
        self.crs = crs;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Whether `value` is a real sample (not the nodata sentinel, not NaN)
    pub fn is_valid(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }

        match self.nodata {
            Some(nodata) if nodata.is_nan() => true,
            Some(nodata) => value != nodata,
            None => true,
        }
    }

    /// Sample at (row, col); `None` when outside the grid or nodata
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }

        let value = self.data[row * self.cols + col];
        self.is_valid(value).then_some(value)
    }

    /// All valid samples in row-major order, for the value histogram
    pub fn valid_values(&self) -> Vec<f64> {
        self.data.iter().copied().filter(|&v| self.is_valid(v)).collect()
    }

    /// (row, col) of every valid cell whose value lies in `range`, row-major
    pub fn matching_cells(&self, range: &ValueRange) -> Vec<(usize, usize)> {
        if range.is_empty() {
            return Vec::new();
        }

        self.data
            .iter()
            .enumerate()
            .filter(|(_, &value)| self.is_valid(value) && range.contains(value))
            .map(|(index, _)| (index / self.cols, index % self.cols))
            .collect()
    }

    /// Minimum and maximum of the valid samples
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|&v| self.is_valid(v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl fmt::Display for RasterGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Raster:")?;
        writeln!(f, "  Size: {} x {}", self.cols, self.rows)?;
        writeln!(
            f,
            "  Pixel Size: {} x {}",
            self.transform.pixel_width(),
            self.transform.pixel_height()
        )?;
        writeln!(f, "  Transform: {:?}", self.transform.coefficients())?;

        match self.crs {
            Some(ref crs) => writeln!(f, "  CRS: {}", crs)?,
            None => writeln!(f, "  CRS: (none)")?,
        }

        if let Some(nodata) = self.nodata {
            writeln!(f, "  NoData: {}", nodata)?;
        }

        if let Some((lo, hi)) = self.value_bounds() {
            writeln!(f, "  Value Range: {} .. {}", lo, hi)?;
        }

        Ok(())
    }
}

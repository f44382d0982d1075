//! Raster grid, geo-transform and value-range matching

pub mod geotransform;
pub mod grid;

pub use geotransform::GeoTransform;
pub use grid::RasterGrid;

use serde::{Deserialize, Serialize};

/// Inclusive [min, max] interval of sample values
///
/// An inverted interval (min > max) is legal and contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// True when no value can satisfy the range
    pub fn is_empty(&self) -> bool {
        self.min.partial_cmp(&self.max).map_or(true, |order| order.is_gt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_bounds() {
        let range = ValueRange::new(95.0, 100.0);
        assert!(range.contains(95.0));
        assert!(range.contains(100.0));
        assert!(!range.contains(94.999));
        assert!(!range.contains(f64::NAN));
    }

    #[test]
    fn test_inverted_is_empty() {
        assert!(ValueRange::new(5.0, 1.0).is_empty());
        assert!(ValueRange::new(f64::NAN, 1.0).is_empty());
        assert!(!ValueRange::new(1.0, 1.0).is_empty());
    }
}

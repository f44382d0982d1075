//! Spatial join of pixels against country polygons

use geo::{BoundingRect, Intersects, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use tracing::debug;

use crate::boundary::BoundarySet;
use super::PixelSet;

/// One intersecting (pixel, country) pair, as indices into the joined sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JoinPair {
    pub pixel: usize,
    pub country: usize,
}

/// Pairs sorted by (pixel, country), plus the number of pixels that touched
/// no country at all
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinResult {
    pub pairs: Vec<JoinPair>,
    pub unjoined: usize,
}

impl JoinResult {
    /// Distinct pixels with at least one country
    pub fn joined_pixels(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for pair in &self.pairs {
            if last != Some(pair.pixel) {
                count += 1;
                last = Some(pair.pixel);
            }
        }
        count
    }
}

type IndexedBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn envelope(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

fn index(boxes: impl Iterator<Item = (usize, Rect<f64>)>) -> RTree<IndexedBox> {
    let entries = boxes
        .map(|(i, rect)| {
            GeomWithData::new(
                Rectangle::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                i,
            )
        })
        .collect();
    RTree::bulk_load(entries)
}

/// Associates every pixel with each country polygon it intersects
///
/// Both sets must be in the same CRS. Touching counts as intersecting, and a
/// pixel straddling a border is paired with every country it touches. The
/// R-tree is built over whichever side is larger.
pub fn spatial_join(pixels: &PixelSet, boundaries: &BoundarySet) -> JoinResult {
    let pixel_boxes: Vec<(usize, Rect<f64>)> = pixels
        .pixels()
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.geometry.bounding_rect().map(|r| (i, r)))
        .collect();
    let country_boxes: Vec<(usize, Rect<f64>)> = boundaries
        .countries()
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.geometry.bounding_rect().map(|r| (i, r)))
        .collect();

    let confirm = |pixel: usize, country: usize| {
        pixels.pixels()[pixel]
            .geometry
            .intersects(&boundaries.countries()[country].geometry)
    };

    let mut pairs = Vec::new();

    if pixel_boxes.len() >= country_boxes.len() {
        let tree = index(pixel_boxes.iter().copied());
        for (country, rect) in &country_boxes {
            for candidate in tree.locate_in_envelope_intersecting(&envelope(rect)) {
                if confirm(candidate.data, *country) {
                    pairs.push(JoinPair { pixel: candidate.data, country: *country });
                }
            }
        }
    } else {
        let tree = index(country_boxes.iter().copied());
        for (pixel, rect) in &pixel_boxes {
            for candidate in tree.locate_in_envelope_intersecting(&envelope(rect)) {
                if confirm(*pixel, candidate.data) {
                    pairs.push(JoinPair { pixel: *pixel, country: candidate.data });
                }
            }
        }
    }

    pairs.sort_unstable();
    pairs.dedup();

    let mut result = JoinResult { pairs, unjoined: 0 };
    result.unjoined = pixels.len() - result.joined_pixels();

    debug!(
        pairs = result.pairs.len(),
        unjoined = result.unjoined,
        indexed = if pixels.len() >= boundaries.len() { "pixels" } else { "countries" },
        "Spatial join"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{boundaries, rect, wgs84_raster};
    use crate::analysis::{build_pixel_geometries, PixelShape};

    #[test]
    fn test_points_join_containing_country() {
        // centres at x = 0.5, 1.5, 2.5, 3.5 along y = 0.5
        let raster = wgs84_raster(vec![vec![1.0; 4]], 0.0, 1.0, 1.0);
        let cells: Vec<_> = (0..4).map(|c| (0, c)).collect();
        let pixels = build_pixel_geometries(&raster, &cells, PixelShape::Point);
        let countries = boundaries(&[("A", rect(0.0, 0.0, 2.0, 1.0)), ("B", rect(3.0, 0.0, 3.2, 1.0))]);

        let result = spatial_join(&pixels, &countries);
        assert_eq!(
            result.pairs,
            vec![
                JoinPair { pixel: 0, country: 0 },
                JoinPair { pixel: 1, country: 0 },
            ]
        );
        assert_eq!(result.unjoined, 2);
    }

    #[test]
    fn test_border_straddle_joins_both() {
        // one square spanning x 0.5..1.5 across a border at x = 1
        let raster = wgs84_raster(vec![vec![1.0]], 0.5, 1.0, 1.0);
        let pixels = build_pixel_geometries(&raster, &[(0, 0)], PixelShape::Square);
        let countries = boundaries(&[("West", rect(-1.0, -1.0, 1.0, 2.0)), ("East", rect(1.0, -1.0, 3.0, 2.0))]);

        let result = spatial_join(&pixels, &countries);
        assert_eq!(result.pairs.len(), 2);
        assert_eq!(result.joined_pixels(), 1);
        assert_eq!(result.unjoined, 0);
    }

    #[test]
    fn test_touching_counts() {
        let raster = wgs84_raster(vec![vec![1.0]], 0.0, 1.0, 1.0);
        let pixels = build_pixel_geometries(&raster, &[(0, 0)], PixelShape::Square);
        let countries = boundaries(&[("Neighbour", rect(1.0, 0.0, 2.0, 1.0))]);

        assert_eq!(spatial_join(&pixels, &countries).pairs.len(), 1);
    }

    #[test]
    fn test_order_independent_of_indexed_side() {
        // many countries, few pixels: countries get indexed
        let raster = wgs84_raster(vec![vec![1.0, 1.0]], 0.0, 1.0, 1.0);
        let pixels = build_pixel_geometries(&raster, &[(0, 1), (0, 0)], PixelShape::Square);
        let countries = boundaries(&[
            ("C", rect(1.5, 0.0, 2.0, 1.0)),
            ("B", rect(0.0, 0.0, 2.0, 1.0)),
            ("A", rect(0.0, 0.0, 0.5, 1.0)),
        ]);

        let result = spatial_join(&pixels, &countries);
        let expected = vec![
            JoinPair { pixel: 0, country: 0 },
            JoinPair { pixel: 0, country: 1 },
            JoinPair { pixel: 1, country: 1 },
            JoinPair { pixel: 1, country: 2 },
        ];
        assert_eq!(result.pairs, expected);

        // same data with more pixels than countries: pixels get indexed
        let few = boundaries(&[("B", rect(0.0, 0.0, 2.0, 1.0))]);
        let result = spatial_join(&pixels, &few);
        assert_eq!(
            result.pairs,
            vec![JoinPair { pixel: 0, country: 0 }, JoinPair { pixel: 1, country: 0 }]
        );
    }

    #[test]
    fn test_empty_inputs() {
        let raster = wgs84_raster(vec![vec![1.0]], 0.0, 1.0, 1.0);
        let pixels = build_pixel_geometries(&raster, &[], PixelShape::Point);
        let result = spatial_join(&pixels, &boundaries(&[("A", rect(0.0, 0.0, 1.0, 1.0))]));
        assert_eq!(result, JoinResult::default());
    }
}

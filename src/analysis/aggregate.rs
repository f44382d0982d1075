//! Per-country aggregation of joined pixels

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use geo::{Area, BooleanOps, Geometry, MultiPolygon};
use serde::{Deserialize, Serialize};

use crate::boundary::BoundarySet;
use crate::error::{Error, Result};
use super::{JoinResult, PixelSet};

/// Unit summary areas are reported in
///
/// Assumes the CRS the sets were projected into is measured in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    SquareMetres,
    #[default]
    SquareKilometres,
}

impl AreaUnit {
    /// Converts an area in square metres into this unit
    pub fn convert(&self, square_metres: f64) -> f64 {
        match self {
            AreaUnit::SquareMetres => square_metres,
            AreaUnit::SquareKilometres => square_metres / 1e6,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AreaUnit::SquareMetres => "m2",
            AreaUnit::SquareKilometres => "km2",
        }
    }
}

impl FromStr for AreaUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "m2" | "square_metres" | "square_meters" => Ok(AreaUnit::SquareMetres),
            "km2" | "square_kilometres" | "square_kilometers" => Ok(AreaUnit::SquareKilometres),
            other => Err(Error::Config(format!("Unknown area unit '{}'", other))),
        }
    }
}

/// What a pixel straddling a border contributes to each country it touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Its full area, to every country (area can be counted more than once)
    #[default]
    FullCount,
    /// Only the part lying inside the country
    AreaWeighted,
}

impl FromStr for OverlapPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "full_count" | "full" => Ok(OverlapPolicy::FullCount),
            "area_weighted" | "weighted" => Ok(OverlapPolicy::AreaWeighted),
            other => Err(Error::Config(format!("Unknown overlap policy '{}'", other))),
        }
    }
}

/// Summary table ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most matched pixels first
    #[default]
    MatchedPixels,
    /// Highest coverage first
    PercentCovered,
    /// Largest matched area first
    Area,
    /// Alphabetical
    Name,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "matched_pixels" | "pixels" => Ok(SortKey::MatchedPixels),
            "percent_covered" | "percent" => Ok(SortKey::PercentCovered),
            "area" => Ok(SortKey::Area),
            "name" | "country" => Ok(SortKey::Name),
            other => Err(Error::Config(format!("Unknown sort key '{}'", other))),
        }
    }
}

/// One country's coverage, at full precision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub country: String,
    pub matched_pixels: usize,
    /// Matched area in the table's unit
    pub area: f64,
    /// Total country area in the table's unit
    pub country_area: f64,
    /// 100 x area / country_area
    pub percent_covered: f64,
}

/// Coverage rows for every country with at least one joined pixel
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    unit: AreaUnit,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new(unit: AreaUnit, rows: Vec<SummaryRow>) -> Self {
        Self { unit, rows }
    }

    pub fn unit(&self) -> AreaUnit {
        self.unit
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_matched_pixels(&self) -> usize {
        self.rows.iter().map(|r| r.matched_pixels).sum()
    }

    /// Reorders rows; ties fall back to the country name
    pub fn sort_by(&mut self, key: SortKey) {
        self.rows.sort_by(|a, b| {
            let primary = match key {
                SortKey::MatchedPixels => b.matched_pixels.cmp(&a.matched_pixels),
                SortKey::PercentCovered => b.percent_covered.total_cmp(&a.percent_covered),
                SortKey::Area => b.area.total_cmp(&a.area),
                SortKey::Name => std::cmp::Ordering::Equal,
            };
            primary.then_with(|| a.country.cmp(&b.country))
        });
    }

    /// First `n` rows under `key`, leaving the table's own order alone
    pub fn top(&self, n: usize, key: SortKey) -> Vec<SummaryRow> {
        let mut sorted = self.clone();
        sorted.sort_by(key);
        sorted.rows.truncate(n);
        sorted.rows
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Countries: {}", self.rows.len())?;
        writeln!(f, "Matched pixels: {}", self.total_matched_pixels())?;
        writeln!(f, "Area unit: {}", self.unit.symbol())
    }
}

#[derive(Default)]
struct Accumulator {
    pixels: usize,
    area: f64,
}

/// Groups joined pixels by country name
///
/// `pixels` and `boundaries` must be the projected sets the join ran on.
/// Country area is the projected area of every polygon carrying the name.
/// Rows come out ordered by name.
pub fn aggregate(
    join: &JoinResult,
    pixels: &PixelSet,
    boundaries: &BoundarySet,
    unit: AreaUnit,
    policy: OverlapPolicy,
) -> SummaryTable {
    let mut per_country: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for pair in &join.pairs {
        let pixel = &pixels.pixels()[pair.pixel];
        let country = &boundaries.countries()[pair.country];

        let contribution = match (policy, &pixel.geometry) {
            (OverlapPolicy::AreaWeighted, Geometry::Polygon(square)) => MultiPolygon::new(vec![square.clone()])
                .intersection(&country.geometry)
                .unsigned_area(),
            _ => pixel.area,
        };

        let entry = per_country.entry(country.name.as_str()).or_default();
        entry.pixels += 1;
        entry.area += contribution;
    }

    let country_areas = boundaries.country_areas();

    let rows = per_country
        .into_iter()
        .map(|(name, acc)| {
            let country_area = country_areas.get(name).copied().unwrap_or(0.0);
            let percent_covered = if country_area > 0.0 { 100.0 * acc.area / country_area } else { 0.0 };
            SummaryRow {
                country: name.to_string(),
                matched_pixels: acc.pixels,
                area: unit.convert(acc.area),
                country_area: unit.convert(country_area),
                percent_covered,
            }
        })
        .collect();

    SummaryTable::new(unit, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{boundaries, rect};
    use crate::analysis::{JoinPair, PixelGeometry, PixelShape};
    use approx::assert_relative_eq;
    use geo::{Point, Polygon};

    fn square(min_x: f64, min_y: f64, side: f64) -> PixelGeometry {
        let polygon: Polygon<f64> = rect(min_x, min_y, min_x + side, min_y + side).0.remove(0);
        PixelGeometry {
            row: 0,
            col: 0,
            value: 1.0,
            geometry: Geometry::Polygon(polygon),
            area: side * side,
        }
    }

    fn pairs(list: &[(usize, usize)]) -> JoinResult {
        JoinResult {
            pairs: list.iter().map(|&(pixel, country)| JoinPair { pixel, country }).collect(),
            unjoined: 0,
        }
    }

    #[test]
    fn test_groups_by_name_and_sums_area() {
        // countries in "metres": Big 0..1000 x 0..1000 in two parts, Small 1000..1500
        let countries = boundaries(&[
            ("Big", rect(0.0, 0.0, 1000.0, 500.0)),
            ("Small", rect(1000.0, 0.0, 1500.0, 1000.0)),
            ("Big", rect(0.0, 500.0, 1000.0, 1000.0)),
        ]);
        let pixels = PixelSet::new(
            vec![square(0.0, 0.0, 100.0), square(0.0, 600.0, 100.0), square(1100.0, 0.0, 100.0)],
            PixelShape::Square,
            None,
        );

        let table = aggregate(
            &pairs(&[(0, 0), (1, 2), (2, 1)]),
            &pixels,
            &countries,
            AreaUnit::SquareMetres,
            OverlapPolicy::FullCount,
        );

        assert_eq!(table.len(), 2);
        let big = &table.rows()[0];
        assert_eq!(big.country, "Big");
        assert_eq!(big.matched_pixels, 2);
        assert_eq!(big.area, 20_000.0);
        assert_eq!(big.country_area, 1_000_000.0);
        assert_relative_eq!(big.percent_covered, 2.0);

        let small = &table.rows()[1];
        assert_eq!(small.matched_pixels, 1);
        assert_relative_eq!(small.percent_covered, 2.0);
    }

    #[test]
    fn test_unit_does_not_change_percent() {
        let countries = boundaries(&[("A", rect(0.0, 0.0, 3000.0, 3000.0))]);
        let pixels = PixelSet::new(vec![square(0.0, 0.0, 700.0)], PixelShape::Square, None);
        let join = pairs(&[(0, 0)]);

        let m2 = aggregate(&join, &pixels, &countries, AreaUnit::SquareMetres, OverlapPolicy::FullCount);
        let km2 = aggregate(&join, &pixels, &countries, AreaUnit::SquareKilometres, OverlapPolicy::FullCount);

        assert_relative_eq!(m2.rows()[0].area / 1e6, km2.rows()[0].area);
        assert_relative_eq!(m2.rows()[0].percent_covered, km2.rows()[0].percent_covered);
        assert_eq!(km2.unit().symbol(), "km2");
    }

    #[test]
    fn test_area_weighted_splits_straddling_square() {
        let countries = boundaries(&[("West", rect(0.0, 0.0, 100.0, 100.0)), ("East", rect(100.0, 0.0, 200.0, 100.0))]);
        let pixels = PixelSet::new(vec![square(75.0, 0.0, 100.0)], PixelShape::Square, None);
        let join = pairs(&[(0, 0), (0, 1)]);

        let full = aggregate(&join, &pixels, &countries, AreaUnit::SquareMetres, OverlapPolicy::FullCount);
        let total_full: f64 = full.rows().iter().map(|r| r.area).sum();
        assert_relative_eq!(total_full, 20_000.0);

        let weighted = aggregate(&join, &pixels, &countries, AreaUnit::SquareMetres, OverlapPolicy::AreaWeighted);
        let east = &weighted.rows()[0];
        let west = &weighted.rows()[1];
        assert_eq!((east.country.as_str(), west.country.as_str()), ("East", "West"));
        assert_relative_eq!(east.area, 7_500.0, epsilon = 1e-6);
        assert_relative_eq!(west.area, 2_500.0, epsilon = 1e-6);
        assert_eq!(east.matched_pixels + west.matched_pixels, 2);
    }

    #[test]
    fn test_points_contribute_full_area_under_weighting() {
        let countries = boundaries(&[("A", rect(0.0, 0.0, 10.0, 10.0))]);
        let mut pixels = PixelSet::new(
            vec![PixelGeometry {
                row: 0,
                col: 0,
                value: 1.0,
                geometry: Geometry::Point(Point::new(5.0, 5.0)),
                area: 0.0,
            }],
            PixelShape::Point,
            None,
        );
        pixels.assign_uniform_area(4.0);

        let table = aggregate(&pairs(&[(0, 0)]), &pixels, &countries, AreaUnit::SquareMetres, OverlapPolicy::AreaWeighted);
        assert_eq!(table.rows()[0].area, 4.0);
        assert_relative_eq!(table.rows()[0].percent_covered, 4.0);
    }

    #[test]
    fn test_sort_keys() {
        let row = |name: &str, pixels: usize, area: f64, percent: f64| SummaryRow {
            country: name.to_string(),
            matched_pixels: pixels,
            area,
            country_area: 100.0,
            percent_covered: percent,
        };
        let mut table = SummaryTable::new(
            AreaUnit::SquareKilometres,
            vec![row("A", 1, 50.0, 9.0), row("B", 5, 10.0, 1.0), row("C", 5, 20.0, 3.0)],
        );

        table.sort_by(SortKey::MatchedPixels);
        let names: Vec<_> = table.rows().iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);

        let top = table.top(2, SortKey::PercentCovered);
        assert_eq!(top.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(), vec!["A", "C"]);

        table.sort_by(SortKey::Area);
        assert_eq!(table.rows()[0].country, "A");

        table.sort_by(SortKey::Name);
        assert_eq!(table.rows()[2].country, "C");
        assert_eq!(table.total_matched_pixels(), 11);
    }

    #[test]
    fn test_parsing() {
        assert_eq!("area-weighted".parse::<OverlapPolicy>().unwrap(), OverlapPolicy::AreaWeighted);
        assert_eq!("percent".parse::<SortKey>().unwrap(), SortKey::PercentCovered);
        assert!("largest".parse::<SortKey>().is_err());
        assert_eq!("m2".parse::<AreaUnit>().unwrap(), AreaUnit::SquareMetres);
    }
}

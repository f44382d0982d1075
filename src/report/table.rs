//! Rounded summary table output

use std::io::Write;

use serde::Serialize;

use crate::analysis::{SortKey, SummaryTable};
use crate::error::Result;
use super::round_to;

/// Digits kept for matched area
pub const AREA_DIGITS: i32 = 2;
/// Digits kept for percent covered
pub const PERCENT_DIGITS: i32 = 4;

/// A summary row as presented to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub country: String,
    pub matched_pixels: usize,
    pub area: f64,
    pub percent_covered: f64,
}

/// Rows of `table` sorted by matched pixels, rounded for display
pub fn display_rows(table: &SummaryTable) -> Vec<DisplayRow> {
    table
        .top(table.len(), SortKey::MatchedPixels)
        .into_iter()
        .map(|row| DisplayRow {
            country: row.country,
            matched_pixels: row.matched_pixels,
            area: round_to(row.area, AREA_DIGITS),
            percent_covered: round_to(row.percent_covered, PERCENT_DIGITS),
        })
        .collect()
}

/// Renders the summary as a fixed-width text table
pub fn render_summary(table: &SummaryTable) -> String {
    let rows = display_rows(table);
    let name_width = rows.iter().map(|r| r.country.chars().count()).max().unwrap_or(0).max(7);
    let area_header = format!("area_{}", table.unit().symbol());

    let mut out = format!(
        "{:<name_width$}  {:>14}  {:>16}  {:>15}\n",
        "country", "matched_pixels", area_header, "percent_covered"
    );
    out.push_str(&format!("{}\n", "-".repeat(name_width + 2 + 14 + 2 + 16 + 2 + 15)));

    for row in &rows {
        out.push_str(&format!(
            "{:<name_width$}  {:>14}  {:>16.2}  {:>15.4}\n",
            row.country, row.matched_pixels, row.area, row.percent_covered
        ));
    }

    out
}

/// Writes the rounded rows as CSV with a header line
pub fn write_csv<W: Write>(table: &SummaryTable, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let area_header = format!("area_{}", table.unit().symbol());
    out.write_record(["country", "matched_pixels", area_header.as_str(), "percent_covered"])?;

    for row in display_rows(table) {
        out.serialize((row.country, row.matched_pixels, row.area, row.percent_covered))?;
    }

    out.flush()?;
    Ok(())
}

/// Writes the rounded rows as a JSON array of objects
pub fn write_json<W: Write>(table: &SummaryTable, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &display_rows(table))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AreaUnit, SummaryRow};

    fn table() -> SummaryTable {
        let row = |name: &str, pixels: usize, area: f64, percent: f64| SummaryRow {
            country: name.to_string(),
            matched_pixels: pixels,
            area,
            country_area: 1000.0,
            percent_covered: percent,
        };
        SummaryTable::new(
            AreaUnit::SquareKilometres,
            vec![row("Chad", 3, 12.345678, 1.23456789), row("Bosnia and Herzegovina", 8, 99.999, 9.99999)],
        )
    }

    #[test]
    fn test_display_rows_sorted_and_rounded() {
        let rows = display_rows(&table());
        assert_eq!(rows[0].country, "Bosnia and Herzegovina");
        assert_eq!(rows[0].area, 100.0);
        assert_eq!(rows[0].percent_covered, 10.0);
        assert_eq!(rows[1].area, 12.35);
        assert_eq!(rows[1].percent_covered, 1.2346);
    }

    #[test]
    fn test_render_summary() {
        let text = render_summary(&table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("area_km2"));
        assert!(lines[2].starts_with("Bosnia and Herzegovina"));
        assert!(lines[3].contains("12.35"));
        assert!(lines[3].contains("1.2346"));
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        write_csv(&table(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "country,matched_pixels,area_km2,percent_covered");
        assert_eq!(lines[1], "Bosnia and Herzegovina,8,100.0,10.0");
        assert_eq!(lines[2], "Chad,3,12.35,1.2346");
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&table(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["country"], "Bosnia and Herzegovina");
        assert_eq!(rows[0]["matched_pixels"], 8);
        assert_eq!(rows[1]["percent_covered"], 1.2346);
    }
}

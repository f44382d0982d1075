//! Horizontal text bar charts

use crate::analysis::{SortKey, SummaryRow, SummaryTable};

/// Width of the longest bar in characters
const BAR_WIDTH: usize = 50;

/// Label width used by the charts
pub const LABEL_CHARS: usize = 12;

/// Splits a label into lines of at most `max_chars` characters
pub fn wrap_label(label: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return vec![label.to_string()];
    }

    let chars: Vec<char> = label.chars().collect();
    chars.chunks(max_chars).map(|chunk| chunk.iter().collect()).collect()
}

/// Which quantity a chart plots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMetric {
    MatchedPixels,
    PercentCovered,
}

impl ChartMetric {
    fn value(&self, row: &SummaryRow) -> f64 {
        match self {
            ChartMetric::MatchedPixels => row.matched_pixels as f64,
            ChartMetric::PercentCovered => row.percent_covered,
        }
    }

    fn sort_key(&self) -> SortKey {
        match self {
            ChartMetric::MatchedPixels => SortKey::MatchedPixels,
            ChartMetric::PercentCovered => SortKey::PercentCovered,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartMetric::MatchedPixels => "Matched Pixel Count",
            ChartMetric::PercentCovered => "Country Area % Covered by Matched Pixels",
        }
    }
}

/// Draws the top `top_n` countries under `metric`, one bar per country
///
/// Long names wrap onto continuation lines under the bar.
pub fn render_bar_chart(table: &SummaryTable, metric: ChartMetric, top_n: usize) -> String {
    let rows = table.top(top_n, metric.sort_key());
    let peak = rows.iter().map(|r| metric.value(r)).fold(0.0, f64::max);

    let mut out = format!("Top {} Countries: {}\n", rows.len(), metric.title());

    for row in &rows {
        let value = metric.value(row);
        let len = if peak > 0.0 { ((value / peak) * BAR_WIDTH as f64).round() as usize } else { 0 };
        let label = wrap_label(&row.country, LABEL_CHARS);
        let shown = match metric {
            ChartMetric::MatchedPixels => format!("{}", row.matched_pixels),
            ChartMetric::PercentCovered => format!("{:.4}%", row.percent_covered),
        };

        let mut lines = label.iter();
        let first = lines.next().map(String::as_str).unwrap_or("");
        out.push_str(&format!("{:<width$} | {} {}\n", first, "█".repeat(len), shown, width = LABEL_CHARS));
        for line in lines {
            out.push_str(&format!("{:<width$} |\n", line, width = LABEL_CHARS));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AreaUnit;

    #[test]
    fn test_wrap_label() {
        assert_eq!(wrap_label("Chad", 12), vec!["Chad"]);
        assert_eq!(
            wrap_label("Bosnia and Herzegovina", 12),
            vec!["Bosnia and H", "erzegovina"]
        );
        assert_eq!(wrap_label("Côte d'Ivoire", 4), vec!["Côte", " d'I", "voir", "e"]);
        assert!(wrap_label("", 12).is_empty());
    }

    fn table() -> SummaryTable {
        let row = |name: &str, pixels: usize, percent: f64| SummaryRow {
            country: name.to_string(),
            matched_pixels: pixels,
            area: 1.0,
            country_area: 10.0,
            percent_covered: percent,
        };
        SummaryTable::new(
            AreaUnit::SquareKilometres,
            vec![
                row("Central African Republic", 10, 0.5),
                row("Niger", 5, 2.0),
                row("Chad", 1, 0.1),
            ],
        )
    }

    #[test]
    fn test_bar_chart_by_pixels() {
        let chart = render_bar_chart(&table(), ChartMetric::MatchedPixels, 2);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[0], "Top 2 Countries: Matched Pixel Count");
        assert!(lines[1].starts_with("Central Afri | "));
        assert_eq!(lines[1].matches('█').count(), 50);
        assert!(lines[2].starts_with("can Republic |"));
        assert!(lines[3].starts_with("Niger        | "));
        assert_eq!(lines[3].matches('█').count(), 25);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_bar_chart_by_percent() {
        let chart = render_bar_chart(&table(), ChartMetric::PercentCovered, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert!(lines[1].starts_with("Niger"));
        assert!(lines[1].ends_with("2.0000%"));
    }
}

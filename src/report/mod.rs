//! Presentation of analysis results

pub mod chart;
pub mod histogram;
pub mod table;

pub use chart::{render_bar_chart, wrap_label, ChartMetric};
pub use histogram::Histogram;
pub use table::{render_summary, write_csv, write_json};

/// Rounds half away from zero to `digits` decimal places
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.125, 1), -0.1);
        assert_eq!(round_to(42.0, 4), 42.0);
    }
}

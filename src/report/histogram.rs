//! Value distribution of a raster band

use std::fmt;

/// Number of bins used when none is given
pub const DEFAULT_BINS: usize = 50;

/// Equal-width histogram over the finite values of a band
///
/// The last bin is closed on the right so the maximum is counted.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: f64,
    max: f64,
    counts: Vec<usize>,
}

impl Histogram {
    /// Bins `values`; `None` when there is nothing finite to bin or `bins` is 0
    ///
    /// A constant band is binned over [v - 0.5, v + 0.5].
    pub fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        if bins == 0 {
            return None;
        }

        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (mut min, mut max) = finite
            .clone()
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        if min == max {
            min -= 0.5;
            max += 0.5;
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0; bins];
        for v in finite {
            let index = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[index] += 1;
        }

        Some(Self { min, max, counts })
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Lower and upper edge of bin `index`
    pub fn bin_edges(&self, index: usize) -> (f64, f64) {
        let width = (self.max - self.min) / self.counts.len() as f64;
        (self.min + width * index as f64, self.min + width * (index + 1) as f64)
    }

    /// One line per bin with a bar scaled to `bar_width` characters
    pub fn render(&self, bar_width: usize) -> String {
        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut out = String::new();

        for (i, &count) in self.counts.iter().enumerate() {
            let (lo, hi) = self.bin_edges(i);
            let len = (count * bar_width).div_ceil(peak);
            out.push_str(&format!("{:>12.4} - {:<12.4} {:>9} {}\n", lo, hi, count, "#".repeat(len)));
        }

        out
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Raster Value Distribution ({} values)", self.total())?;
        f.write_str(&self.render(40))
    }
}

//! Coordinate reference systems and reprojection
//!
//! Area is only meaningful in an equal-area projected system, so both the
//! matched pixels and the country boundaries go through [`Reproject`] into
//! the same target before they are joined or measured.

pub mod crs;
pub mod transformer;

pub use crs::{epsg, Crs};
pub use transformer::Transformer;

use tracing::debug;

use crate::error::{Error, Result};

/// A geometry collection tagged with the CRS its coordinates are expressed in
pub trait Reproject: Clone {
    /// Name used in errors when the collection has no CRS
    const DATASET: &'static str;

    /// Declared CRS of the collection, if any
    fn crs(&self) -> Option<&Crs>;

    /// Same collection with every coordinate pushed through `transformer`
    /// and the CRS replaced by the transformer's target
    fn reproject_with(&self, transformer: &Transformer) -> Result<Self>;

    /// Same collection expressed in `target`
    ///
    /// Fails with [`Error::MissingCrs`] when the collection declares no
    /// source CRS.
    fn reproject(&self, target: &Crs) -> Result<Self> {
        let source = self.crs().ok_or(Error::MissingCrs { dataset: Self::DATASET })?;

        if source == target {
            return Ok(self.clone());
        }

        debug!(dataset = Self::DATASET, from = %source, to = %target, "Reprojecting");
        let transformer = Transformer::new(source, target)?;
        self.reproject_with(&transformer)
    }
}

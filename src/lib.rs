//! raster-coverage - per-country coverage of raster value ranges
//!
//! Reads a single-band GeoTIFF, keeps the cells whose value lies in a
//! user-chosen range, and reports for every country how many of those cells
//! fall inside it, how much area they cover, and what share of the country
//! that is. Areas are measured after reprojecting both pixels and country
//! boundaries into an equal-area CRS (EPSG:6933 by default).
//!
//! # Examples
//!
//! ```no_run
//! use raster_coverage::{AnalysisParams, BoundarySet, Pipeline, TiffReader, ValueRange};
//! use raster_coverage::boundary::{DEFAULT_NAME_FIELD, DEFAULT_SOURCE};
//!
//! let raster = TiffReader::open("tif_directory/forest.tif")?.read_raster()?;
//! let boundaries = BoundarySet::load(DEFAULT_SOURCE, DEFAULT_NAME_FIELD)?;
//!
//! let params = AnalysisParams::new(ValueRange::new(95.0, 100.0));
//! let analysis = Pipeline::new(&raster, &boundaries).run(&params)?;
//!
//! if let Some(table) = analysis.summary() {
//!     println!("{}", table);
//! }
//! # Ok::<(), raster_coverage::Error>(())
//! ```

pub mod analysis;
pub mod boundary;
pub mod catalog;
pub mod compression;
pub mod config;
pub mod error;
pub mod formats;
pub mod io;
pub mod projection;
pub mod raster;
pub mod report;
pub mod types;

pub use analysis::{
    Analysis, AnalysisParams, AreaUnit, OverlapPolicy, Outcome, Pipeline, PixelShape, SortKey,
    SummaryRow, SummaryTable,
};
pub use boundary::{BoundarySet, Country};
pub use config::Config;
pub use error::{Error, Result};
pub use formats::tiff::{tags, GeoInfo, Tiff, TiffReader, IFD, IFDEntry, BIGTIFF_MAGIC, TIFF_MAGIC};
pub use io::ByteOrder;
pub use projection::{Crs, Reproject, Transformer};
pub use raster::{GeoTransform, RasterGrid, ValueRange};
pub use types::{DataType, Dimensions};

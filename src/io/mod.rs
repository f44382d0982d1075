//! I/O utilities for raster-coverage
//!
//! Byte-level primitives used by the GeoTIFF decoder.

pub mod byte_order;

pub use byte_order::ByteOrder;

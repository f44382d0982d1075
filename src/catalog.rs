//! Raster file discovery

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// File extensions treated as GeoTIFF rasters
const RASTER_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

fn is_raster(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| RASTER_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Lists the GeoTIFF files directly inside `dir`, sorted by file name
///
/// A missing directory is an error; an empty listing is not.
pub fn list_rasters(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::Config(format!("Raster directory not found: {}", dir.display())));
    }

    let mut rasters = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_raster(&path) {
            rasters.push(path);
        }
    }

    rasters.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = rasters.len(), "Listed rasters");
    Ok(rasters)
}

/// Picks a raster by file name, or the first one when no name is given
pub fn select<'a>(rasters: &'a [PathBuf], name: Option<&str>) -> Option<&'a PathBuf> {
    match name {
        Some(name) => rasters
            .iter()
            .find(|path| path.file_name().and_then(|f| f.to_str()) == Some(name)),
        None => rasters.first(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_lists_only_tiffs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.tif");
        touch(dir.path(), "a.TIFF");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "c.tif.aux.xml");
        fs::create_dir(dir.path().join("nested.tif")).unwrap();

        let rasters = list_rasters(dir.path()).unwrap();
        let names: Vec<_> = rasters
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.TIFF", "b.tif"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_rasters(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_rasters(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_select() {
        let rasters = vec![PathBuf::from("/data/a.tif"), PathBuf::from("/data/b.tif")];
        assert_eq!(select(&rasters, None), Some(&rasters[0]));
        assert_eq!(select(&rasters, Some("b.tif")), Some(&rasters[1]));
        assert_eq!(select(&rasters, Some("missing.tif")), None);
        assert_eq!(select(&[], None), None);
    }
}

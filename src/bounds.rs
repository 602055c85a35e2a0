//! Region-of-interest bounds, read from a shapefile in the working directory.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Geographic bounding box of the region of interest, WGS84 degrees.
/// Computed once at startup and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

#[derive(Debug, Error)]
pub enum BoundsError {
    #[error("Failed to list working directory '{0}'")]
    WorkingDirRead(PathBuf, #[source] std::io::Error),

    #[error("No .shp file found in '{0}'")]
    NoShapefile(PathBuf),

    #[error("Failed to read shapefile '{0}'")]
    ShapefileRead(PathBuf, #[source] std::io::Error),

    #[error("'{0}' is not an ESRI shapefile")]
    NotAShapefile(PathBuf),
}

/// Supplies the bounding box the remote subset requests are clipped to.
pub trait BoundsProvider {
    fn region_bounds(&self) -> Result<RegionBounds, BoundsError>;
}

/// Reads the bounding box out of the first `.shp` file in a directory.
///
/// The box is taken straight from the shapefile main-file header (Xmin,
/// Ymin, Xmax, Ymax as little-endian doubles at bytes 36..68), so no
/// geometry parsing is involved. When several shapefiles are present the
/// lexicographically first one wins, which keeps repeat runs deterministic.
#[derive(Debug, Clone)]
pub struct ShapefileBounds {
    dir: PathBuf,
}

const SHP_FILE_CODE: u32 = 9994;
const SHP_HEADER_LEN: usize = 100;

impl ShapefileBounds {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ShapefileBounds { dir: dir.into() }
    }

    fn find_shapefile(&self) -> Result<PathBuf, BoundsError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| BoundsError::WorkingDirRead(self.dir.clone(), e))?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "shp"))
            .collect();
        candidates.sort();
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| BoundsError::NoShapefile(self.dir.clone()))
    }

    fn read_header(path: &Path) -> Result<RegionBounds, BoundsError> {
        let mut file =
            File::open(path).map_err(|e| BoundsError::ShapefileRead(path.to_path_buf(), e))?;
        let mut header = [0u8; SHP_HEADER_LEN];
        file.read_exact(&mut header)
            .map_err(|e| BoundsError::ShapefileRead(path.to_path_buf(), e))?;

        let mut code = [0u8; 4];
        code.copy_from_slice(&header[0..4]);
        if u32::from_be_bytes(code) != SHP_FILE_CODE {
            return Err(BoundsError::NotAShapefile(path.to_path_buf()));
        }

        Ok(RegionBounds {
            west: read_f64_le(&header, 36),
            south: read_f64_le(&header, 44),
            east: read_f64_le(&header, 52),
            north: read_f64_le(&header, 60),
        })
    }
}

impl BoundsProvider for ShapefileBounds {
    fn region_bounds(&self) -> Result<RegionBounds, BoundsError> {
        let path = self.find_shapefile()?;
        log::debug!("reading region bounds from {}", path.display());
        Self::read_header(&path)
    }
}

/// A fixed, caller-supplied bounding box.
#[derive(Debug, Clone, Copy)]
pub struct FixedBounds(pub RegionBounds);

impl BoundsProvider for FixedBounds {
    fn region_bounds(&self) -> Result<RegionBounds, BoundsError> {
        Ok(self.0)
    }
}

fn read_f64_le(header: &[u8; SHP_HEADER_LEN], offset: usize) -> f64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&header[offset..offset + 8]);
    f64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_shapefile(path: &Path, bounds: RegionBounds) {
        let mut header = vec![0u8; SHP_HEADER_LEN];
        header[0..4].copy_from_slice(&SHP_FILE_CODE.to_be_bytes());
        header[36..44].copy_from_slice(&bounds.west.to_le_bytes());
        header[44..52].copy_from_slice(&bounds.south.to_le_bytes());
        header[52..60].copy_from_slice(&bounds.east.to_le_bytes());
        header[60..68].copy_from_slice(&bounds.north.to_le_bytes());
        std::fs::write(path, header).unwrap();
    }

    #[test]
    fn reads_bounds_from_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let bounds = RegionBounds {
            west: -3.25,
            south: 4.75,
            east: 1.25,
            north: 11.5,
        };
        write_shapefile(&dir.path().join("ghana.shp"), bounds);

        let read = ShapefileBounds::new(dir.path()).region_bounds().unwrap();
        assert_eq!(read, bounds);
    }

    #[test]
    fn missing_shapefile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShapefileBounds::new(dir.path()).region_bounds().unwrap_err();
        assert!(matches!(err, BoundsError::NoShapefile(_)));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("region.shp"), vec![0u8; SHP_HEADER_LEN]).unwrap();
        let err = ShapefileBounds::new(dir.path()).region_bounds().unwrap_err();
        assert!(matches!(err, BoundsError::NotAShapefile(_)));
    }

    #[test]
    fn first_shapefile_in_name_order_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = RegionBounds {
            west: 1.0,
            south: 2.0,
            east: 3.0,
            north: 4.0,
        };
        let second = RegionBounds {
            west: 9.0,
            south: 9.0,
            east: 9.0,
            north: 9.0,
        };
        write_shapefile(&dir.path().join("b_region.shp"), second);
        write_shapefile(&dir.path().join("a_region.shp"), first);

        let read = ShapefileBounds::new(dir.path()).region_bounds().unwrap();
        assert_eq!(read, first);
    }
}

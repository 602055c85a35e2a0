//! Grid-cell locations and the per-location identifiers derived from them.

use std::fmt;

/// Maps a longitude from the archive's [0, 360) convention onto [-180, 180).
///
/// The source grids count longitude eastward from Greenwich without a sign,
/// while the SWAT metadata tables expect the signed convention.
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon >= 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// One cell of the spatial grid, longitude already normalized to [-180, 180).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLocation {
    pub lat: f64,
    pub lon: f64,
}

impl GridLocation {
    /// Builds a location from raw archive coordinates, normalizing the
    /// longitude on the way in.
    pub fn from_archive(lat: f64, lon: f64) -> Self {
        GridLocation {
            lat,
            lon: normalize_longitude(lon),
        }
    }

    /// Stable per-location identifier: latitude and longitude scaled to
    /// millidegrees and truncated toward zero, joined by an underscore.
    ///
    /// Collision-free as long as no two grid cells truncate to the same
    /// millidegree, which holds for the archive's 0.25-degree grid.
    pub fn key(&self) -> String {
        format!(
            "{}_{}",
            (self.lat * 1000.0).trunc() as i64,
            (self.lon * 1000.0).trunc() as i64
        )
    }
}

impl fmt::Display for GridLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Whether two location axes describe the same cells, compared by key so
/// that float noise below a millidegree does not matter.
pub(crate) fn same_grid(a: &[GridLocation], b: &[GridLocation]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.key() == y.key())
}

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ndarray::{Array2, Axis};

use crate::grid::calendar::TimeEncoding;
use crate::grid::error::GridError;
use crate::grid::reader::{GridReader, RawGrid};
use crate::types::{same_grid, GridLocation, Variable};

/// One variable's daily record over every cell of the subset grid,
/// concatenated from the per-year files of one scenario directory.
///
/// Dates follow file order and may contain calendar gaps; reconciliation
/// against the real calendar happens downstream.
#[derive(Debug, Clone)]
pub struct GridFrame {
    pub dates: Vec<NaiveDate>,
    /// Cells in latitude-outer, longitude-inner order, identical for every
    /// file that contributed to the frame.
    pub locations: Vec<GridLocation>,
    /// Samples in `[day][location]` order.
    pub values: Array2<f64>,
}

/// Builds a [`GridFrame`] from every `.nc` file in `dir`.
///
/// Files are visited in name order, which matches chronological order for
/// the archive's year-stamped names. Each file's calendar is decoded
/// independently; source days with no real-calendar equivalent are dropped
/// and surface later as reported gaps.
pub fn assemble<R: GridReader>(
    dir: &Path,
    variable: Variable,
    reader: &R,
) -> Result<GridFrame, GridError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| GridError::DirRead(dir.to_path_buf(), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "nc"))
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(GridError::NoGridFiles(dir.to_path_buf()));
    }

    let mut locations: Vec<GridLocation> = Vec::new();
    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut flat: Vec<f64> = Vec::new();

    for (file_index, path) in files.iter().enumerate() {
        let raw = reader.read(path, variable)?;
        check_shape(&raw, variable, path)?;
        let encoding = TimeEncoding::parse(&raw.time_units, &raw.calendar)
            .map_err(|e| GridError::Time(path.clone(), e))?;

        let file_locations = location_axis(&raw);
        if file_index == 0 {
            locations = file_locations;
        } else if !same_grid(&locations, &file_locations) {
            return Err(GridError::AxisMismatch(path.clone()));
        }

        for (step, &offset) in raw.time_offsets.iter().enumerate() {
            match encoding
                .decode(offset)
                .map_err(|e| GridError::Time(path.clone(), e))?
            {
                Some(date) => {
                    dates.push(date);
                    flat.extend(raw.values.index_axis(Axis(0), step).iter().copied());
                }
                None => log::debug!(
                    "Dropped step {step} of '{}': day does not exist in the real calendar",
                    path.display()
                ),
            }
        }
    }

    if dates.is_empty() {
        return Err(GridError::NoDays(dir.to_path_buf()));
    }
    let values = Array2::from_shape_vec((dates.len(), locations.len()), flat).map_err(|_| {
        GridError::ShapeMismatch {
            name: variable.name().to_string(),
            path: dir.to_path_buf(),
        }
    })?;
    Ok(GridFrame {
        dates,
        locations,
        values,
    })
}

fn check_shape(raw: &RawGrid, variable: Variable, path: &Path) -> Result<(), GridError> {
    let (time, lat, lon) = raw.values.dim();
    if raw.time_offsets.len() != time
        || raw.latitudes.len() != lat
        || raw.longitudes.len() != lon
    {
        return Err(GridError::ShapeMismatch {
            name: variable.name().to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn location_axis(raw: &RawGrid) -> Vec<GridLocation> {
    let mut locations = Vec::with_capacity(raw.latitudes.len() * raw.longitudes.len());
    for &lat in &raw.latitudes {
        for &lon in &raw.longitudes {
            locations.push(GridLocation::from_archive(lat, lon));
        }
    }
    locations
}

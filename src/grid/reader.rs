use std::path::Path;

use ndarray::Array3;

use crate::grid::error::GridError;
use crate::types::Variable;

/// Raw content of one grid file, before any calendar or unit handling.
#[derive(Debug, Clone)]
pub struct RawGrid {
    /// Time values as stored, to be decoded against `time_units`.
    pub time_offsets: Vec<f64>,
    /// CF units string of the time variable, e.g. `days since 1850-01-01`.
    pub time_units: String,
    /// CF calendar name, `standard` when the file does not carry one.
    pub calendar: String,
    pub latitudes: Vec<f64>,
    /// Longitudes as stored by the archive, possibly on the 0..360 axis.
    pub longitudes: Vec<f64>,
    /// Samples in `[time][lat][lon]` order. Masked samples are NaN.
    pub values: Array3<f64>,
}

/// Decodes one grid file into a [`RawGrid`].
///
/// The production implementation wraps the system NetCDF library; tests
/// substitute readers that serve grids from memory.
pub trait GridReader {
    fn read(&self, path: &Path, variable: Variable) -> Result<RawGrid, GridError>;
}

/// Reads grid files through the system NetCDF library.
///
/// Only functional when the crate is built with the `netcdf` feature; without
/// it every read fails with [`GridError::FeatureDisabled`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NetcdfReader;

#[cfg(feature = "netcdf")]
impl GridReader for NetcdfReader {
    fn read(&self, path: &Path, variable: Variable) -> Result<RawGrid, GridError> {
        let file = netcdf::open(path).map_err(|e| GridError::NetCdf(path.to_path_buf(), e))?;

        let time_var = file.variable("time").ok_or_else(|| GridError::MissingVariable {
            name: "time".to_string(),
            path: path.to_path_buf(),
        })?;
        let time_offsets = time_var
            .get_values::<f64, _>(..)
            .map_err(|e| GridError::NetCdf(path.to_path_buf(), e))?;
        let time_units = string_attr(&time_var, "units")
            .ok_or_else(|| GridError::MissingTimeUnits(path.to_path_buf()))?;
        let calendar =
            string_attr(&time_var, "calendar").unwrap_or_else(|| "standard".to_string());

        let latitudes = read_axis(&file, &["lat", "latitude"], path)?;
        let longitudes = read_axis(&file, &["lon", "longitude"], path)?;

        let var = file
            .variable(variable.name())
            .ok_or_else(|| GridError::MissingVariable {
                name: variable.name().to_string(),
                path: path.to_path_buf(),
            })?;
        let dims = var.dimensions();
        if dims.len() != 3 {
            return Err(GridError::DimensionMismatch {
                name: variable.name().to_string(),
                path: path.to_path_buf(),
                got: dims.len(),
            });
        }
        let shape = (dims[0].len(), dims[1].len(), dims[2].len());

        let mut data = var
            .get_values::<f64, _>(..)
            .map_err(|e| GridError::NetCdf(path.to_path_buf(), e))?;
        if let Some(fill) = f64_attr(&var, "_FillValue").or_else(|| f64_attr(&var, "missing_value"))
        {
            for value in &mut data {
                if *value == fill {
                    *value = f64::NAN;
                }
            }
        }
        let values = Array3::from_shape_vec(shape, data).map_err(|_| GridError::ShapeMismatch {
            name: variable.name().to_string(),
            path: path.to_path_buf(),
        })?;

        Ok(RawGrid {
            time_offsets,
            time_units,
            calendar,
            latitudes,
            longitudes,
            values,
        })
    }
}

#[cfg(not(feature = "netcdf"))]
impl GridReader for NetcdfReader {
    fn read(&self, _path: &Path, _variable: Variable) -> Result<RawGrid, GridError> {
        Err(GridError::FeatureDisabled)
    }
}

/// Read a 1-D `f64` coordinate variable, trying each alias in order.
#[cfg(feature = "netcdf")]
fn read_axis(file: &netcdf::File, aliases: &[&str], path: &Path) -> Result<Vec<f64>, GridError> {
    for &alias in aliases {
        if let Some(var) = file.variable(alias) {
            return var
                .get_values::<f64, _>(..)
                .map_err(|e| GridError::NetCdf(path.to_path_buf(), e));
        }
    }
    Err(GridError::MissingVariable {
        name: aliases.first().copied().unwrap_or("unknown").to_string(),
        path: path.to_path_buf(),
    })
}

#[cfg(feature = "netcdf")]
fn string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

#[cfg(feature = "netcdf")]
fn f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    let value = var.attribute_value(name)?.ok()?;
    f64::try_from(value).ok()
}

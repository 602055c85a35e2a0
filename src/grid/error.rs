use std::path::PathBuf;

use thiserror::Error;

use crate::grid::calendar::CalendarError;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Failed to list grid directory '{0}'")]
    DirRead(PathBuf, #[source] std::io::Error),

    #[error("No grid files found in '{0}'")]
    NoGridFiles(PathBuf),

    #[error("No usable days decoded from the files in '{0}'")]
    NoDays(PathBuf),

    #[cfg(feature = "netcdf")]
    #[error("NetCDF error in '{0}'")]
    NetCdf(PathBuf, #[source] netcdf::Error),

    #[error("Variable '{name}' missing from grid file '{path}'")]
    MissingVariable { name: String, path: PathBuf },

    #[error("Variable '{name}' in '{path}' has {got} dimensions, expected time x lat x lon")]
    DimensionMismatch {
        name: String,
        path: PathBuf,
        got: usize,
    },

    #[error("Data length of '{name}' in '{path}' does not match its dimensions")]
    ShapeMismatch { name: String, path: PathBuf },

    #[error("Time variable in '{0}' has no units attribute")]
    MissingTimeUnits(PathBuf),

    #[error("Bad time axis in '{0}'")]
    Time(PathBuf, #[source] CalendarError),

    #[error("Spatial axis of '{0}' differs from earlier files of the same variable")]
    AxisMismatch(PathBuf),

    #[error("Reading grid files requires the 'netcdf' feature")]
    FeatureDisabled,
}

//! Climate variables of the daily archive and their SWAT-side units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One modeled physical quantity of the daily NEX-GDDP-CMIP6 archive.
///
/// The archive stores every variable in SI-flavored units; [`Variable::convert`]
/// maps a raw value to the unit the SWAT input formats expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    /// Near-surface relative humidity (%).
    #[serde(rename = "hurs")]
    Hurs,
    /// Near-surface specific humidity (kg/kg).
    #[serde(rename = "huss")]
    Huss,
    /// Precipitation rate (kg m-2 s-1).
    #[serde(rename = "pr")]
    Pr,
    /// Surface downwelling longwave radiation (W m-2).
    #[serde(rename = "rlds")]
    Rlds,
    /// Surface downwelling shortwave radiation (W m-2).
    #[serde(rename = "rsds")]
    Rsds,
    /// Daily-mean near-surface wind speed (m/s).
    #[serde(rename = "sfcWind")]
    SfcWind,
    /// Daily-mean near-surface air temperature (K).
    #[serde(rename = "tas")]
    Tas,
    /// Daily-maximum near-surface air temperature (K).
    #[serde(rename = "tasmax")]
    Tasmax,
    /// Daily-minimum near-surface air temperature (K).
    #[serde(rename = "tasmin")]
    Tasmin,
}

impl Variable {
    /// Every variable the archive serves, in archive (alphabetical) order.
    pub const ALL: [Variable; 9] = [
        Variable::Hurs,
        Variable::Huss,
        Variable::Pr,
        Variable::Rlds,
        Variable::Rsds,
        Variable::SfcWind,
        Variable::Tas,
        Variable::Tasmax,
        Variable::Tasmin,
    ];

    /// Archive spelling, as used in remote filenames, URLs and directory names.
    pub fn name(&self) -> &'static str {
        match self {
            Variable::Hurs => "hurs",
            Variable::Huss => "huss",
            Variable::Pr => "pr",
            Variable::Rlds => "rlds",
            Variable::Rsds => "rsds",
            Variable::SfcWind => "sfcWind",
            Variable::Tas => "tas",
            Variable::Tasmax => "tasmax",
            Variable::Tasmin => "tasmin",
        }
    }

    pub(crate) fn description(&self) -> &'static str {
        match self {
            Variable::Hurs => "relative humidity",
            Variable::Huss => "specific humidity",
            Variable::Pr => "precipitation",
            Variable::Rlds => "longwave radiation",
            Variable::Rsds => "solar radiation",
            Variable::SfcWind => "wind speed",
            Variable::Tas => "mean air temperature",
            Variable::Tasmax => "maximum air temperature",
            Variable::Tasmin => "minimum air temperature",
        }
    }

    /// Converts a raw archive value to the unit the SWAT formats expect.
    ///
    /// Temperatures drop from kelvin to degrees Celsius, precipitation goes
    /// from kg m-2 s-1 to mm/day, the two radiation variables go from W m-2
    /// to MJ m-2 day-1. Everything else is already in the expected unit.
    pub fn convert(&self, value: f64) -> f64 {
        match self {
            Variable::Tas | Variable::Tasmax | Variable::Tasmin => value - 273.15,
            Variable::Pr => value * 86400.0,
            Variable::Rlds | Variable::Rsds => value * 0.0036,
            _ => value,
        }
    }

    /// True for the max/min temperature pair, which the output formats emit
    /// jointly as one two-column group instead of two independent series.
    pub fn is_temp_extreme(&self) -> bool {
        matches!(self, Variable::Tasmax | Variable::Tasmin)
    }
}

/// Formats a `Variable` as its archive spelling.
///
/// # Examples
///
/// ```
/// use nexswat::Variable;
///
/// assert_eq!(format!("{}", Variable::SfcWind), "sfcWind");
/// assert_eq!(Variable::Tasmax.to_string(), "tasmax");
/// ```
impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A unit of SWAT output: either a variable on its own, or the max/min
/// temperature pair emitted as a single two-column group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableGroup {
    Single(Variable),
    TempMaxMin,
}

impl VariableGroup {
    /// Group name used for metadata tables and generated per-location names.
    pub fn name(&self) -> &'static str {
        match self {
            VariableGroup::Single(var) => var.name(),
            VariableGroup::TempMaxMin => "temp_max_min",
        }
    }

    /// Fixed manifest file name in the SWAT+ output tree. Variables SWAT+
    /// has no input slot for keep their archive name with a `.cli` extension.
    pub(crate) fn manifest_name(&self) -> &'static str {
        match self {
            VariableGroup::Single(Variable::Pr) => "pcp.cli",
            VariableGroup::Single(Variable::Hurs) => "hmd.cli",
            VariableGroup::Single(Variable::Rsds) => "slr.cli",
            VariableGroup::Single(Variable::SfcWind) => "wnd.cli",
            VariableGroup::Single(Variable::Huss) => "huss.cli",
            VariableGroup::Single(Variable::Rlds) => "rlds.cli",
            VariableGroup::Single(Variable::Tas) => "tas.cli",
            VariableGroup::Single(Variable::Tasmax) => "tasmax.cli",
            VariableGroup::Single(Variable::Tasmin) => "tasmin.cli",
            VariableGroup::TempMaxMin => "tmp.cli",
        }
    }

    pub(crate) fn description(&self) -> &'static str {
        match self {
            VariableGroup::Single(var) => var.description(),
            VariableGroup::TempMaxMin => "air temperature",
        }
    }
}

impl fmt::Display for VariableGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

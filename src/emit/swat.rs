//! SWAT (format A) tree: per-group CSV station tables at the root, body
//! files under one directory per scenario.

use std::path::Path;

use crate::convert::GroupSeries;
use crate::emit::{format_value, write_bodies, EmitError, DEFAULT_ELEVATION};
use crate::types::{GridLocation, Scenario, VariableGroup};

/// Writes one `<group>.txt` station table per group.
///
/// Rows carry a 1-based id, the generated station name, the cell coordinates
/// and a fixed elevation. Names match the body file stems so SWAT can pair
/// a table row with its series.
pub fn write_metadata(
    root: &Path,
    groups: &[VariableGroup],
    locations: &[GridLocation],
) -> Result<(), EmitError> {
    std::fs::create_dir_all(root).map_err(|e| EmitError::DirCreation(root.to_path_buf(), e))?;
    for &group in groups {
        let path = root.join(format!("{}.txt", group.name()));
        let mut text = String::from("ID,NAME,LAT,LONG,ELEVATION\n");
        for (index, location) in locations.iter().enumerate() {
            text.push_str(&format!(
                "{},{}_{},{},{},{}\n",
                index + 1,
                group.name(),
                location.key(),
                format_value(location.lat),
                format_value(location.lon),
                DEFAULT_ELEVATION
            ));
        }
        std::fs::write(&path, text).map_err(|e| EmitError::Write(path.clone(), e))?;
    }
    Ok(())
}

/// Writes every group's body files for one scenario.
pub fn write_scenario(
    root: &Path,
    scenario: Scenario,
    bundle: &[GroupSeries],
) -> Result<(), EmitError> {
    for group in bundle {
        write_bodies(root, scenario, group)?;
    }
    Ok(())
}

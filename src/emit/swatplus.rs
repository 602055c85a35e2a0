//! SWAT+ (format B) tree: per-group `.cli` manifests at the root, body files
//! under one directory per scenario.

use std::path::Path;

use crate::convert::GroupSeries;
use crate::emit::{body_file_name, write_bodies, EmitError};
use crate::types::{GridLocation, Scenario, VariableGroup};

/// Writes one manifest per group, listing every body file name under a
/// two-line header. SWAT+ treats the first line as free text and expects the
/// literal column label `filename` on the second.
pub fn write_manifests(
    root: &Path,
    groups: &[VariableGroup],
    locations: &[GridLocation],
) -> Result<(), EmitError> {
    std::fs::create_dir_all(root).map_err(|e| EmitError::DirCreation(root.to_path_buf(), e))?;
    for &group in groups {
        let path = root.join(group.manifest_name());
        let mut text = format!(
            "{}: {} file names\nfilename\n",
            group.manifest_name(),
            group.description()
        );
        for location in locations {
            text.push_str(&body_file_name(group, location));
            text.push('\n');
        }
        std::fs::write(&path, text).map_err(|e| EmitError::Write(path.clone(), e))?;
    }
    Ok(())
}

/// Writes every group's body files for one scenario. Bodies are identical to
/// the SWAT tree's, only the index files differ between the two formats.
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

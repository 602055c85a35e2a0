//! Writers for the two legacy SWAT text trees.
//!
//! Both formats share the same per-location body files: a start-date header
//! line followed by one value per day, or a `max,min` pair for the joined
//! temperature group. They differ in their index files, a per-group CSV
//! metadata table for SWAT and a per-group file-name manifest for SWAT+.

mod error;
pub mod swat;
pub mod swatplus;

use std::path::Path;

use crate::convert::GroupSeries;
use crate::types::{GridLocation, Scenario, VariableGroup};

pub use error::EmitError;

/// Sentinel the SWAT formats use for a day without data.
pub(crate) const SENTINEL: &str = "-99.0";

/// The archive carries no elevation, the legacy tables want one anyway.
pub(crate) const DEFAULT_ELEVATION: i32 = 100;

/// Formats one table value: integral values keep a single trailing decimal,
/// everything else prints in its shortest exact form, gaps become the
/// sentinel.
pub(crate) fn format_value(value: f64) -> String {
    if value.is_nan() {
        SENTINEL.to_string()
    } else if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Body file name for one group at one grid cell, shared by both formats.
pub(crate) fn body_file_name(group: VariableGroup, location: &GridLocation) -> String {
    format!("{}_{}.txt", group.name(), location.key())
}

/// Writes one group's per-location body files under `root/<scenario>/`.
pub(crate) fn write_bodies(
    root: &Path,
    scenario: Scenario,
    group: &GroupSeries,
) -> Result<(), EmitError> {
    let scenario_dir = root.join(scenario.path_segment());
    std::fs::create_dir_all(&scenario_dir)
        .map_err(|e| EmitError::DirCreation(scenario_dir.clone(), e))?;

    let dates = &group.primary.dates;
    let start = match dates.first() {
        Some(start) => start,
        None => return Ok(()),
    };
    for (column, location) in group.primary.locations.iter().enumerate() {
        let path = scenario_dir.join(body_file_name(group.group, location));
        let mut text = String::with_capacity(dates.len() * 8 + 16);
        text.push_str(&start.format("%Y%m%d").to_string());
        text.push('\n');
        for row in 0..dates.len() {
            let value = group.primary.values[[row, column]];
            match &group.secondary {
                Some(secondary) => {
                    let paired = secondary.values[[row, column]];
                    text.push_str(&format_value(value));
                    text.push(',');
                    text.push_str(&format_value(paired));
                }
                None => text.push_str(&format_value(value)),
            }
            text.push('\n');
        }
        std::fs::write(&path, text).map_err(|e| EmitError::Write(path.clone(), e))?;
    }
    Ok(())
}

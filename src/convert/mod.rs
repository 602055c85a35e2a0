//! Grid-to-series conversion: assembles the downloaded per-year grids,
//! merges each projected scenario with the historical baseline, and writes
//! both legacy output trees.

mod error;
mod reconcile;

use std::collections::HashMap;

use crate::config::Config;
use crate::emit;
use crate::grid::{self, GridFrame, GridReader};
use crate::types::{same_grid, GridLocation, Scenario, Variable, VariableGroup};

pub use error::ConvertError;
pub use reconcile::{reconcile, ClimateSeries};

/// One output group ready for emission: a single variable's series, or the
/// temperature pair with tasmax as the primary series and tasmin alongside.
#[derive(Debug, Clone)]
pub struct GroupSeries {
    pub group: VariableGroup,
    pub primary: ClimateSeries,
    pub secondary: Option<ClimateSeries>,
}

/// Runs the whole conversion over a download tree.
///
/// The historical baseline is assembled once per variable and reused for
/// every projected scenario. Station tables and manifests describe the grid,
/// not a scenario, so they are written once at the root of each tree.
///
/// # Examples
///
/// ```
/// # use nexswat::{convert_all, Config, NetcdfReader, NexswatError};
/// # fn run() -> Result<(), NexswatError> {
/// let config = Config::load("data/ghana")?;
/// convert_all(&config, &NetcdfReader)?;
/// # Ok(())
/// # }
/// ```
pub fn convert_all<R: GridReader>(config: &Config, reader: &R) -> Result<(), ConvertError> {
    let dataset = &config.dataset;
    let projected: Vec<Scenario> = dataset.projected_scenarios().collect();
    if projected.is_empty() {
        log::warn!("No projected scenarios configured, nothing to convert");
        return Ok(());
    }
    if !dataset.scenarios.contains(&Scenario::Historical) {
        return Err(ConvertError::MissingHistorical);
    }

    let mut historical: HashMap<Variable, GridFrame> = HashMap::new();
    for &variable in &dataset.variables {
        let dir = config.variable_dir(Scenario::Historical, variable);
        historical.insert(variable, grid::assemble(&dir, variable, reader)?);
    }
    let locations = canonical_locations(&dataset.variables, &historical)?;
    let groups = variable_groups(&dataset.variables);

    let swat_root = config.swat_dir();
    let swatplus_root = config.swatplus_dir();
    emit::swat::write_metadata(&swat_root, &groups, &locations)?;
    emit::swatplus::write_manifests(&swatplus_root, &groups, &locations)?;

    for &scenario in &projected {
        let mut series: HashMap<Variable, ClimateSeries> = HashMap::new();
        for (&variable, baseline) in &historical {
            let dir = config.variable_dir(scenario, variable);
            let frame = grid::assemble(&dir, variable, reader)?;
            series.insert(variable, reconcile(baseline, &frame, scenario, variable)?);
        }
        let bundle = group_series(&dataset.variables, series, scenario)?;
        emit::swat::write_scenario(&swat_root, scenario, &bundle)?;
        emit::swatplus::write_scenario(&swatplus_root, scenario, &bundle)?;
        log::info!("Wrote {} output groups for {scenario}", bundle.len());
    }
    Ok(())
}

/// The spatial axis every variable must share. Station tables are written
/// once per tree, so a variable subset on a different grid is unusable.
fn canonical_locations(
    variables: &[Variable],
    frames: &HashMap<Variable, GridFrame>,
) -> Result<Vec<GridLocation>, ConvertError> {
    let mut reference: Option<(Variable, &GridFrame)> = None;
    for &variable in variables {
        let frame = match frames.get(&variable) {
            Some(frame) => frame,
            None => continue,
        };
        match reference {
            None => reference = Some((variable, frame)),
            Some((first, reference_frame)) => {
                if !same_grid(&reference_frame.locations, &frame.locations) {
                    return Err(ConvertError::VariableAxisMismatch(first, variable));
                }
            }
        }
    }
    Ok(reference
        .map(|(_, frame)| frame.locations.clone())
        .unwrap_or_default())
}

/// Output groups in configuration order. tasmax and tasmin collapse into the
/// joined temperature group when both are configured, at the position of
/// whichever comes first; on its own, either stays a single-column group.
fn variable_groups(variables: &[Variable]) -> Vec<VariableGroup> {
    let paired = variables.contains(&Variable::Tasmax) && variables.contains(&Variable::Tasmin);
    let mut groups = Vec::new();
    for &variable in variables {
        if paired && variable.is_temp_extreme() {
            if !groups.contains(&VariableGroup::TempMaxMin) {
                groups.push(VariableGroup::TempMaxMin);
            }
        } else {
            groups.push(VariableGroup::Single(variable));
        }
    }
    groups
}

fn group_series(
    variables: &[Variable],
    mut series: HashMap<Variable, ClimateSeries>,
    scenario: Scenario,
) -> Result<Vec<GroupSeries>, ConvertError> {
    let mut bundle = Vec::new();
    for group in variable_groups(variables) {
        match group {
            VariableGroup::TempMaxMin => {
                match (
                    series.remove(&Variable::Tasmax),
                    series.remove(&Variable::Tasmin),
                ) {
                    (Some(max), Some(min)) => {
                        if max.dates != min.dates {
                            return Err(ConvertError::PairMismatch(scenario));
                        }
                        bundle.push(GroupSeries {
                            group,
                            primary: max,
                            secondary: Some(min),
                        });
                    }
                    _ => return Err(ConvertError::PairMismatch(scenario)),
                }
            }
            VariableGroup::Single(variable) => {
                if let Some(single) = series.remove(&variable) {
                    bundle.push(GroupSeries {
                        group,
                        primary: single,
                        secondary: None,
                    });
                }
            }
        }
    }
    Ok(bundle)
}

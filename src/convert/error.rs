use chrono::NaiveDate;
use thiserror::Error;

use crate::emit::EmitError;
use crate::grid::GridError;
use crate::types::{Scenario, Variable};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Projected scenarios need the historical scenario as their baseline")]
    MissingHistorical,

    #[error("Duplicate day {date} for {scenario}/{variable}")]
    DuplicateDate {
        scenario: Scenario,
        variable: Variable,
        date: NaiveDate,
    },

    #[error("Spatial axes of {0} and {1} do not match")]
    VariableAxisMismatch(Variable, Variable),

    #[error("Spatial axis of {variable} under {scenario} differs from its historical axis")]
    ScenarioAxisMismatch {
        scenario: Scenario,
        variable: Variable,
    },

    #[error("tasmax and tasmin cover different days under {0}")]
    PairMismatch(Scenario),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

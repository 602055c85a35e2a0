use thiserror::Error;

use crate::bounds::BoundsError;
use crate::config::ConfigError;
use crate::convert::ConvertError;
use crate::emit::EmitError;
use crate::fetch::FetchError;
use crate::grid::GridError;

#[derive(Debug, Error)]
pub enum NexswatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

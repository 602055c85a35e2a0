mod bounds;
mod config;
mod convert;
mod emit;
mod error;
mod fetch;
mod grid;
mod types;

pub use error::NexswatError;

pub use bounds::{BoundsError, BoundsProvider, FixedBounds, RegionBounds, ShapefileBounds};
pub use config::{
    Config, ConfigError, DatasetConfig, RetryPolicy, CONFIG_FILE_NAME, LEDGER_FILE_NAME,
};
pub use convert::{convert_all, reconcile, ClimateSeries, ConvertError, GroupSeries};
pub use emit::EmitError;
pub use fetch::{
    download_all, DownloadSummary, FetchCandidate, FetchError, FetchOutcome, FetchSpec,
    FetchStatus, Fetcher, HttpSource, Ledger, RemoteSource,
};
pub use grid::{
    assemble, Calendar, CalendarError, GridError, GridFrame, GridReader, NetcdfReader, RawGrid,
    TimeEncoding,
};
pub use types::{normalize_longitude, GridLocation, Scenario, Variable, VariableGroup};

//! Run configuration: built-in archive defaults plus an optional JSON
//! overlay read from the working directory.
//!
//! The configuration is resolved once at startup and passed down immutably;
//! each component receives only the pieces it needs.

use std::fs;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::types::{Scenario, Variable};

/// File name of the optional configuration overlay, looked up in the
/// working directory. Its absence is not an error.
pub const CONFIG_FILE_NAME: &str = "nexswat.json";

/// Name of the append-only download outcome ledger.
pub const LEDGER_FILE_NAME: &str = "download_log.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// Everything one run needs to know, resolved and immutable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the region shapefile, the download tree, the ledger
    /// and both output trees.
    pub working_dir: PathBuf,
    pub dataset: DatasetConfig,
    pub retry: RetryPolicy,
    /// Concurrent downloads in flight; defaults to the physical core count.
    pub parallel_downloads: usize,
}

/// The archive coordinates of one model run and the subset of it to fetch.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub base_url: String,
    pub dataset: String,
    pub model: String,
    /// Variant label of the ensemble member, e.g. `r1i1p1f1`.
    pub variant: String,
    pub scenarios: Vec<Scenario>,
    pub variables: Vec<Variable>,
    /// Known dataset version suffixes, oldest first. Fetching walks them
    /// newest first.
    pub version_suffixes: Vec<String>,
    pub historical_years: (i32, i32),
    pub projected_years: (i32, i32),
}

impl DatasetConfig {
    /// Calendar years covered by one scenario, one remote file per year.
    pub fn years(&self, scenario: Scenario) -> RangeInclusive<i32> {
        let (start, end) = if scenario.is_historical() {
            self.historical_years
        } else {
            self.projected_years
        };
        start..=end
    }

    /// Scenarios other than the historical baseline, in configured order.
    pub fn projected_scenarios(&self) -> impl Iterator<Item = Scenario> + '_ {
        self.scenarios.iter().copied().filter(|s| !s.is_historical())
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            base_url: "https://ds.nccs.nasa.gov/thredds/ncss/grid/AMES/NEX".to_string(),
            dataset: "GDDP-CMIP6".to_string(),
            model: "ACCESS-CM2".to_string(),
            variant: "r1i1p1f1".to_string(),
            scenarios: Scenario::ALL.to_vec(),
            variables: Variable::ALL.to_vec(),
            version_suffixes: vec!["".to_string(), "_v1.1".to_string(), "_v1.2".to_string()],
            historical_years: (1950, 2014),
            projected_years: (2015, 2100),
        }
    }
}

/// Retry behavior for transient remote failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per candidate identifier, first try included.
    pub max_attempts: u32,
    /// Fixed pause between attempts on the same candidate.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Built-in defaults rooted at `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Config {
            working_dir: working_dir.into(),
            dataset: DatasetConfig::default(),
            retry: RetryPolicy::default(),
            parallel_downloads: num_cpus::get_physical(),
        }
    }

    /// Defaults overlaid with `nexswat.json` from the working directory,
    /// when present.
    pub fn load(working_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Config::new(working_dir);
        let path = config.working_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(config);
        }
        let content =
            fs::read_to_string(&path).map_err(|e| ConfigError::Read(path.clone(), e))?;
        let overlay: ConfigOverlay =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(path.clone(), e))?;
        config.apply(overlay);
        Ok(config)
    }

    fn apply(&mut self, overlay: ConfigOverlay) {
        let d = &mut self.dataset;
        if let Some(v) = overlay.base_url {
            d.base_url = v;
        }
        if let Some(v) = overlay.dataset {
            d.dataset = v;
        }
        if let Some(v) = overlay.model {
            d.model = v;
        }
        if let Some(v) = overlay.variant {
            d.variant = v;
        }
        if let Some(v) = overlay.scenarios {
            d.scenarios = v;
        }
        if let Some(v) = overlay.variables {
            d.variables = v;
        }
        if let Some(v) = overlay.version_suffixes {
            d.version_suffixes = v;
        }
        if let Some(v) = overlay.historical_years {
            d.historical_years = v;
        }
        if let Some(v) = overlay.projected_years {
            d.projected_years = v;
        }
        if let Some(v) = overlay.retry_attempts {
            self.retry.max_attempts = v;
        }
        if let Some(v) = overlay.retry_delay_secs {
            self.retry.delay = Duration::from_secs(v);
        }
        if let Some(v) = overlay.parallel_downloads {
            self.parallel_downloads = v.max(1);
        }
    }

    /// Directory the downloaded grid files for one (scenario, variable)
    /// land in, mirroring the archive's own layout.
    pub fn variable_dir(&self, scenario: Scenario, variable: Variable) -> PathBuf {
        self.working_dir
            .join(&self.dataset.dataset)
            .join(&self.dataset.model)
            .join(scenario.path_segment())
            .join(&self.dataset.variant)
            .join(variable.name())
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.working_dir.join(LEDGER_FILE_NAME)
    }

    /// Root of the SWAT (format A) output tree.
    pub fn swat_dir(&self) -> PathBuf {
        self.working_dir
            .join(format!("{}_SWAT_files", self.dataset.model))
    }

    /// Root of the SWAT+ (format B) output tree.
    pub fn swatplus_dir(&self) -> PathBuf {
        self.working_dir
            .join(format!("{}_SWATplus_files", self.dataset.model))
    }
}

/// Raw shape of `nexswat.json`; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverlay {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    dataset: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    scenarios: Option<Vec<Scenario>>,
    #[serde(default)]
    variables: Option<Vec<Variable>>,
    #[serde(default)]
    version_suffixes: Option<Vec<String>>,
    #[serde(default)]
    historical_years: Option<(i32, i32)>,
    #[serde(default)]
    projected_years: Option<(i32, i32)>,
    #[serde(default)]
    retry_attempts: Option<u32>,
    #[serde(default)]
    retry_delay_secs: Option<u64>,
    #[serde(default)]
    parallel_downloads: Option<usize>,
}

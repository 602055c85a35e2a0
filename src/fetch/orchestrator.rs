//! Fan-out of the full download space onto a bounded worker pool, fan-in of
//! outcomes into the ledger.

use std::fmt;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use log::{error, info};

use crate::bounds::RegionBounds;
use crate::config::Config;
use crate::fetch::error::FetchError;
use crate::fetch::fetcher::{FetchOutcome, FetchStatus, Fetcher};
use crate::fetch::ledger::Ledger;
use crate::fetch::source::RemoteSource;
use crate::fetch::spec::FetchSpec;

/// Tally of one download run. Every submitted spec lands in exactly one
/// bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DownloadSummary {
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded, {} skipped, {} failed",
            self.downloaded, self.skipped, self.failed
        )
    }
}

/// Drives every (scenario, variable, year) combination to a terminal
/// outcome.
///
/// Tasks run on a bounded pool and complete in any order; the collector side
/// of the stream is the single writer of the ledger, recording each outcome
/// as it lands. Transfer failures never abort the run. The only hard errors
/// here are local ones: destination directories and ledger writes.
///
/// # Examples
///
/// ```
/// # use nexswat::{download_all, BoundsProvider, Config, HttpSource, NexswatError, ShapefileBounds};
/// # async fn run() -> Result<(), NexswatError> {
/// let config = Config::load("data/ghana")?;
/// let bounds = ShapefileBounds::new(&config.working_dir).region_bounds()?;
/// let summary = download_all(&config, bounds, HttpSource::new()?).await?;
/// println!("{summary}");
/// # Ok(())
/// # }
/// ```
pub async fn download_all<S>(
    config: &Config,
    bounds: RegionBounds,
    source: S,
) -> Result<DownloadSummary, FetchError>
where
    S: RemoteSource,
{
    let mut specs = Vec::new();
    for &scenario in &config.dataset.scenarios {
        for &variable in &config.dataset.variables {
            let dir = config.variable_dir(scenario, variable);
            std::fs::create_dir_all(&dir).map_err(|e| FetchError::DirCreation(dir.clone(), e))?;
            for year in config.dataset.years(scenario) {
                specs.push(FetchSpec::new(scenario, variable, year));
            }
        }
    }

    let mut ledger = Ledger::create(&config.ledger_path())?;
    info!(
        "fetching {} grid files with {} parallel downloads",
        specs.len(),
        config.parallel_downloads
    );

    let fetcher = Arc::new(Fetcher::new(source, config.retry));
    let tasks = specs.into_iter().map(|spec| {
        let fetcher = Arc::clone(&fetcher);
        let candidates = spec.candidates(&config.dataset, &bounds);
        let dest_dir = config.variable_dir(spec.scenario, spec.variable);
        async move {
            let status = fetcher.fetch(&spec, &candidates, &dest_dir).await;
            FetchOutcome { spec, status }
        }
    });

    let mut completed = stream::iter(tasks).buffer_unordered(config.parallel_downloads.max(1));
    let mut summary = DownloadSummary::default();
    while let Some(outcome) = completed.next().await {
        match &outcome.status {
            FetchStatus::Downloaded { version } => {
                summary.downloaded += 1;
                if version.is_empty() {
                    info!("{}: downloaded (base version)", outcome.spec);
                } else {
                    info!("{}: downloaded (version {version})", outcome.spec);
                }
            }
            FetchStatus::Skipped => {
                summary.skipped += 1;
                info!("{}: already on disk", outcome.spec);
            }
            FetchStatus::Failed { error } => {
                summary.failed += 1;
                error!("{}: all candidate versions failed: {error}", outcome.spec);
            }
        }
        ledger.record(&outcome)?;
    }

    info!("download run complete: {summary}");
    Ok(summary)
}

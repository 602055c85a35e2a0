//! Two-level retry around a single logical download: transient errors are
//! retried on the same candidate, anything else walks down the version list.

use std::path::Path;

use log::{debug, warn};

use crate::config::RetryPolicy;
use crate::fetch::error::FetchError;
use crate::fetch::source::RemoteSource;
use crate::fetch::spec::{FetchCandidate, FetchSpec};

/// Terminal state of one [`FetchSpec`]. Every spec ends in exactly one of
/// these; transfer errors never propagate past the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// Fetched over the network under the given version suffix.
    Downloaded { version: String },
    /// A file for some candidate version was already on disk, so no network
    /// attempt was made. This is the resumability contract: presence of the
    /// target file alone decides, never the ledger.
    Skipped,
    /// Every candidate version failed; carries the last failure's text.
    Failed { error: String },
}

impl FetchStatus {
    pub fn is_ok(&self) -> bool {
        !matches!(self, FetchStatus::Failed { .. })
    }

    /// Status column value in the outcome ledger.
    pub(crate) fn ledger_status(&self) -> &'static str {
        if self.is_ok() {
            "ok"
        } else {
            "failed"
        }
    }
}

/// A spec together with its terminal status; one per spec per run.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub spec: FetchSpec,
    pub status: FetchStatus,
}

/// Drives one logical download to a terminal [`FetchStatus`].
pub struct Fetcher<S> {
    source: S,
    retry: RetryPolicy,
}

impl<S: RemoteSource> Fetcher<S> {
    pub fn new(source: S, retry: RetryPolicy) -> Self {
        Fetcher { source, retry }
    }

    /// Fetches `spec` into `dest_dir`, trying `candidates` in order.
    ///
    /// If any candidate's file already exists the spec is satisfied without
    /// touching the network, and an existing file is never overwritten.
    pub async fn fetch(
        &self,
        spec: &FetchSpec,
        candidates: &[FetchCandidate],
        dest_dir: &Path,
    ) -> FetchStatus {
        for candidate in candidates {
            let target = dest_dir.join(&candidate.filename);
            if target.exists() {
                debug!("{spec}: {} already present, skipping", candidate.filename);
                return FetchStatus::Skipped;
            }
        }

        let mut last_error: Option<FetchError> = None;
        for candidate in candidates {
            let target = dest_dir.join(&candidate.filename);
            match self.fetch_candidate(spec, candidate, &target).await {
                Ok(()) => {
                    return FetchStatus::Downloaded {
                        version: candidate.version.clone(),
                    }
                }
                Err(e) => {
                    warn!(
                        "{spec}: candidate '{}' failed ({e}), falling back",
                        candidate.filename
                    );
                    last_error = Some(e);
                }
            }
        }

        FetchStatus::Failed {
            error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no candidate versions configured".to_string()),
        }
    }

    /// Inner retry loop: the same candidate is attempted up to the retry
    /// ceiling, sleeping between attempts, but only for transient failures.
    async fn fetch_candidate(
        &self,
        spec: &FetchSpec,
        candidate: &FetchCandidate,
        target: &Path,
    ) -> Result<(), FetchError> {
        let mut attempt = 1;
        loop {
            match self.source.transfer(&candidate.url, target).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(
                        "{spec}: transient failure on attempt {attempt}/{} ({e}), retrying in {:?}",
                        self.retry.max_attempts, self.retry.delay
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::RegionBounds;
    use crate::config::DatasetConfig;
    use crate::types::{Scenario, Variable};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records every attempted URL; per-URL behavior is scripted by the test.
    /// Clones share the recorder, so a test can keep a handle after moving
    /// the source into the fetcher.
    #[derive(Clone)]
    struct ScriptedSource {
        calls: Arc<Mutex<Vec<String>>>,
        behavior: Behavior,
    }

    #[derive(Clone, Copy)]
    enum Behavior {
        /// Always fail with this status.
        AlwaysStatus(StatusCode),
        /// Fail URLs containing the marker with the status, succeed otherwise.
        FailMatching(&'static str, StatusCode),
        /// Succeed everywhere.
        Succeed,
    }

    impl ScriptedSource {
        fn new(behavior: Behavior) -> Self {
            ScriptedSource {
                calls: Arc::new(Mutex::new(Vec::new())),
                behavior,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteSource for ScriptedSource {
        async fn transfer(&self, url: &str, target: &Path) -> Result<(), FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            let fail = |status: StatusCode| {
                Err(FetchError::HttpStatus {
                    url: url.to_string(),
                    status,
                })
            };
            match self.behavior {
                Behavior::AlwaysStatus(status) => fail(status),
                Behavior::FailMatching(marker, status) if url.contains(marker) => fail(status),
                _ => {
                    std::fs::write(target, b"netcdf-bytes").unwrap();
                    Ok(())
                }
            }
        }
    }

    fn no_delay() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        }
    }

    fn spec_and_candidates() -> (FetchSpec, Vec<FetchCandidate>) {
        let dataset = DatasetConfig::default();
        let bounds = RegionBounds {
            west: -3.25,
            south: 4.75,
            east: 1.25,
            north: 11.5,
        };
        let spec = FetchSpec::new(Scenario::Ssp126, Variable::Tas, 2030);
        let candidates = spec.candidates(&dataset, &bounds);
        (spec, candidates)
    }

    #[tokio::test]
    async fn non_transient_failures_walk_all_versions_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(Behavior::AlwaysStatus(StatusCode::NOT_FOUND));
        let fetcher = Fetcher::new(source.clone(), no_delay());
        let (spec, candidates) = spec_and_candidates();

        let status = fetcher.fetch(&spec, &candidates, dir.path()).await;

        assert!(matches!(status, FetchStatus::Failed { .. }));
        let calls = source.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains("_v1.2.nc?"));
        assert!(calls[1].contains("_v1.1.nc?"));
        assert!(calls[2].contains("_gn_2030.nc?"));
    }

    #[tokio::test]
    async fn transient_failures_retry_the_same_candidate_first() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(Behavior::AlwaysStatus(StatusCode::GATEWAY_TIMEOUT));
        let fetcher = Fetcher::new(source.clone(), no_delay());
        let (spec, candidates) = spec_and_candidates();

        let status = fetcher.fetch(&spec, &candidates, dir.path()).await;

        assert!(matches!(status, FetchStatus::Failed { .. }));
        // 3 attempts per candidate, then fall back, for all 3 candidates
        let calls = source.calls();
        assert_eq!(calls.len(), 9);
        assert!(calls[0..3].iter().all(|u| u.contains("_v1.2.nc?")));
        assert!(calls[3..6].iter().all(|u| u.contains("_v1.1.nc?")));
        assert!(calls[6..9].iter().all(|u| u.contains("_gn_2030.nc?")));
    }

    #[tokio::test]
    async fn falls_back_until_a_candidate_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(Behavior::FailMatching("_v1.2", StatusCode::NOT_FOUND));
        let fetcher = Fetcher::new(source.clone(), no_delay());
        let (spec, candidates) = spec_and_candidates();

        let status = fetcher.fetch(&spec, &candidates, dir.path()).await;

        assert_eq!(
            status,
            FetchStatus::Downloaded {
                version: "_v1.1".to_string()
            }
        );
        assert!(dir.path().join(&candidates[1].filename).exists());
    }

    #[tokio::test]
    async fn existing_file_short_circuits_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(Behavior::Succeed);
        let fetcher = Fetcher::new(source.clone(), no_delay());
        let (spec, candidates) = spec_and_candidates();

        // A file fetched under an older version in a previous run still counts.
        let existing = dir.path().join(&candidates[2].filename);
        std::fs::write(&existing, b"previous-run").unwrap();

        let status = fetcher.fetch(&spec, &candidates, dir.path()).await;

        assert_eq!(status, FetchStatus::Skipped);
        assert!(source.calls().is_empty());
        assert_eq!(std::fs::read(&existing).unwrap(), b"previous-run");
    }

    #[tokio::test]
    async fn empty_candidate_list_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(Behavior::Succeed);
        let fetcher = Fetcher::new(source.clone(), no_delay());
        let spec = FetchSpec::new(Scenario::Historical, Variable::Pr, 1960);

        let status = fetcher.fetch(&spec, &[], dir.path()).await;

        assert!(matches!(status, FetchStatus::Failed { .. }));
        assert!(source.calls().is_empty());
    }
}

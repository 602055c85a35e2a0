//! Append-only ledger of download outcomes.
//!
//! One line per completed fetch task, flushed as it lands, so the audit
//! trail survives a mid-run crash. The ledger is written by a single
//! collector task and never read back during a run; resumability comes from
//! the downloaded files themselves, not from this file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::fetch::error::FetchError;
use crate::fetch::fetcher::FetchOutcome;

pub struct Ledger {
    file: File,
    path: PathBuf,
}

impl Ledger {
    /// Truncates any previous ledger and stamps the creation header. Called
    /// once at the start of every download run.
    pub fn create(path: &Path) -> Result<Ledger, FetchError> {
        let mut file = File::create(path).map_err(|e| FetchError::Ledger(path.to_path_buf(), e))?;
        writeln!(file, "# created {}", Utc::now().to_rfc3339())
            .map_err(|e| FetchError::Ledger(path.to_path_buf(), e))?;
        Ok(Ledger {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Appends one `scenario,variable,year,status` line. The file is
    /// unbuffered, so a recorded outcome is on disk before the next task's
    /// result is observed.
    pub fn record(&mut self, outcome: &FetchOutcome) -> Result<(), FetchError> {
        writeln!(
            self.file,
            "{},{},{},{}",
            outcome.spec.scenario,
            outcome.spec.variable,
            outcome.spec.year,
            outcome.status.ledger_status()
        )
        .map_err(|e| FetchError::Ledger(self.path.clone(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fetcher::FetchStatus;
    use crate::fetch::spec::FetchSpec;
    use crate::types::{Scenario, Variable};

    #[test]
    fn writes_header_then_one_line_per_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download_log.txt");

        let mut ledger = Ledger::create(&path).unwrap();
        ledger
            .record(&FetchOutcome {
                spec: FetchSpec::new(Scenario::Historical, Variable::Tas, 1950),
                status: FetchStatus::Downloaded {
                    version: "_v1.2".to_string(),
                },
            })
            .unwrap();
        ledger
            .record(&FetchOutcome {
                spec: FetchSpec::new(Scenario::Ssp585, Variable::SfcWind, 2100),
                status: FetchStatus::Failed {
                    error: "boom".to_string(),
                },
            })
            .unwrap();
        ledger
            .record(&FetchOutcome {
                spec: FetchSpec::new(Scenario::Ssp126, Variable::Pr, 2015),
                status: FetchStatus::Skipped,
            })
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("# created "));
        assert_eq!(lines[1], "historical,tas,1950,ok");
        assert_eq!(lines[2], "ssp585,sfcWind,2100,failed");
        assert_eq!(lines[3], "ssp126,pr,2015,ok");
    }

    #[test]
    fn create_truncates_the_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download_log.txt");
        std::fs::write(&path, "# created old\nhistorical,tas,1950,ok\n").unwrap();

        let _ledger = Ledger::create(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("# created "));
        assert!(!content.contains("historical"));
    }
}

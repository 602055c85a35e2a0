mod error;
mod fetcher;
mod ledger;
mod orchestrator;
mod source;
mod spec;

pub use error::FetchError;
pub use fetcher::{FetchOutcome, FetchStatus, Fetcher};
pub use ledger::Ledger;
pub use orchestrator::{download_all, DownloadSummary};
pub use source::{HttpSource, RemoteSource};
pub use spec::{FetchCandidate, FetchSpec};

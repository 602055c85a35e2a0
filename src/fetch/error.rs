use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    Network(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("Failed to write downloaded file '{0}'")]
    TargetWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to create download directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write download ledger '{0}'")]
    Ledger(PathBuf, #[source] std::io::Error),
}

impl FetchError {
    /// Transient failures are retried on the same candidate; every other
    /// class falls straight through to the next candidate version.
    pub(crate) fn is_transient(&self) -> bool {
        match self {
            FetchError::HttpStatus { status, .. } => *status == StatusCode::GATEWAY_TIMEOUT,
            FetchError::Network(_, source) => source.is_timeout() || source.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_timeout_is_transient() {
        let err = FetchError::HttpStatus {
            url: "http://example/file.nc".to_string(),
            status: StatusCode::GATEWAY_TIMEOUT,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn other_statuses_are_not_transient() {
        for status in [
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::FORBIDDEN,
        ] {
            let err = FetchError::HttpStatus {
                url: "http://example/file.nc".to_string(),
                status,
            };
            assert!(!err.is_transient());
        }
    }

    #[test]
    fn local_write_failures_are_not_transient() {
        let err = FetchError::TargetWrite(
            PathBuf::from("/nope"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_transient());
    }
}

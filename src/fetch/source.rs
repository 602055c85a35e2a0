//! The remote-transfer seam and its HTTP implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::fetch::error::FetchError;

/// Transfers one remote identifier to one local file.
///
/// Implementations must create `target` only on success; a failed transfer
/// leaves no file behind. Everything above this trait (retry, version
/// fallback, orchestration) is exercised in tests through mock sources.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn transfer(&self, url: &str, target: &Path) -> Result<(), FetchError>;
}

/// Subset requests can take minutes server-side before the first byte.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Production source: streams the response body to `<target>.partial` and
/// renames into place, so an interrupted transfer never leaves a truncated
/// file under the final name.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(HttpSource { client })
    }

    async fn stream_to(
        &self,
        response: reqwest::Response,
        url: &str,
        partial: &Path,
    ) -> Result<(), FetchError> {
        let mut file = tokio::fs::File::create(partial)
            .await
            .map_err(|e| FetchError::TargetWrite(partial.to_path_buf(), e))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::Network(url.to_string(), e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::TargetWrite(partial.to_path_buf(), e))?;
        }
        file.flush()
            .await
            .map_err(|e| FetchError::TargetWrite(partial.to_path_buf(), e))
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn transfer(&self, url: &str, target: &Path) -> Result<(), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(url.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let partial = partial_path(target);
        if let Err(e) = self.stream_to(response, url, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, target)
            .await
            .map_err(|e| FetchError::TargetWrite(target.to_path_buf(), e))
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};
use url::Url;

use crate::config::{DEFAULT_RETRY_MAX_SECS, DEFAULT_RETRY_MIN_SECS};
use crate::error::SinkError;
use crate::slab::{Compression, Slab, SlabBounds};

use super::SlabSink;

// =============================================================================
// Retry Policy
// =============================================================================

/// Randomized wait between attempts while the store reports overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    min_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Waits are drawn uniformly from `[min_delay, max_delay)`.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay: max_delay.max(min_delay),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Draw the next wait.
    pub fn next_delay(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max <= min {
            return self.min_delay;
        }
        Duration::from_millis(rand::rng().random_range(min..max))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_RETRY_MIN_SECS),
            Duration::from_secs(DEFAULT_RETRY_MAX_SECS),
        )
    }
}

// =============================================================================
// HTTP Sink
// =============================================================================

/// Endpoint for a slab under the store's data URL.
///
/// `<base>/raw/0_1_2/<nx>_<ny>_<nz>/<ox>_<oy>_<oz>?compression=<mode>`
pub fn slab_url(base: &Url, bounds: &SlabBounds, compression: Compression) -> Result<Url, SinkError> {
    let raw = format!(
        "{}/raw/0_1_2/{}_{}_{}/{}_{}_{}?compression={}",
        base.as_str().trim_end_matches('/'),
        bounds.nx,
        bounds.ny,
        bounds.nz,
        bounds.ox,
        bounds.oy,
        bounds.oz,
        compression.name()
    );
    Url::parse(&raw).map_err(|e| SinkError::InvalidUrl {
        url: raw,
        message: e.to_string(),
    })
}

/// POSTs slabs to a remote volume store.
///
/// A `503 Service Unavailable` means the store is temporarily overloaded:
/// the request is retried after a [`RetryPolicy`] wait, without limit. Any
/// other non-success status or a transport failure is returned as an error.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    base: Url,
    retry: RetryPolicy,
    dry_run: bool,
}

impl HttpSink {
    pub fn new(
        base_url: &str,
        retry: RetryPolicy,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self, SinkError> {
        let base = Url::parse(base_url).map_err(|e| SinkError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(SinkError::InvalidUrl {
                url: base_url.to_string(),
                message: "URL must start with http:// or https://".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Connection {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base,
            retry,
            dry_run,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl SlabSink for HttpSink {
    async fn put(&self, slab: &Slab) -> Result<(), SinkError> {
        let url = slab_url(&self.base, &slab.bounds, slab.compression)?;
        if self.dry_run {
            info!(%url, bytes = slab.data.len(), "Dry run: would POST slab");
            return Ok(());
        }

        let mut attempt = 1u32;
        loop {
            let response = self
                .client
                .post(url.clone())
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(slab.data.clone())
                .send()
                .await
                .map_err(|e| SinkError::Connection {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            if status == StatusCode::SERVICE_UNAVAILABLE {
                let wait = self.retry.next_delay();
                warn!(%url, attempt, wait = ?wait, "Remote store overloaded, retrying");
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            let message = response.text().await.unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }
    }

    fn identifier(&self) -> &str {
        self.base.as_str()
    }
}

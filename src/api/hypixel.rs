use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::types::{AuctionsPage, PageFetch, ProbeResult};
use crate::core::SniperError;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const PROBE_ATTEMPTS: u32 = 3;
const PROBE_RETRY_DELAY_SECS: u64 = 1;

/// Seam between the snapshot coordinator and the marketplace API, so scan
/// cycles can be driven against a mock page source in tests.
#[async_trait]
pub trait AuctionPageSource: Send + Sync {
    /// Discover the snapshot dimensions before a cycle starts. Retried a
    /// bounded number of times; exhaustion yields an empty snapshot.
    async fn probe(&self) -> ProbeResult;

    /// Best-effort fetch of one page. Never retried; failure degrades the
    /// page to empty.
    async fn fetch_page(&self, page: u64) -> PageFetch;
}

pub struct HypixelClient {
    client: Client,
    base_url: String,
}

impl HypixelClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_page(&self, page: u64) -> Result<AuctionsPage, SniperError> {
        let url = format!("{}/skyblock/auctions?page={}", self.base_url, page);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SniperError::Data(format!("HTTP {} on page {}", status, page)));
        }

        let payload: AuctionsPage = response
            .json()
            .await
            .map_err(|e| SniperError::Data(format!("page {}: {}", page, e)))?;

        if !payload.success {
            return Err(SniperError::Data(format!("page {} reported success=false", page)));
        }

        Ok(payload)
    }
}

#[async_trait]
impl AuctionPageSource for HypixelClient {
    async fn probe(&self) -> ProbeResult {
        for attempt in 1..=PROBE_ATTEMPTS {
            match self.get_page(0).await {
                Ok(page) => {
                    return ProbeResult {
                        total_pages: page.total_pages,
                        last_updated: page.last_updated,
                    };
                }
                Err(e) if attempt == PROBE_ATTEMPTS => {
                    tracing::error!("❌ Probe failed after {} attempts: {}", PROBE_ATTEMPTS, e);
                }
                Err(e) => {
                    tracing::warn!("Probe attempt {}/{} failed: {}", attempt, PROBE_ATTEMPTS, e);
                    tokio::time::sleep(Duration::from_secs(PROBE_RETRY_DELAY_SECS)).await;
                }
            }
        }

        // Exhausted retries: the cycle proceeds trivially with no pages.
        ProbeResult::default()
    }

    async fn fetch_page(&self, page: u64) -> PageFetch {
        match self.get_page(page).await {
            Ok(payload) => PageFetch {
                auctions: payload.auctions,
                reported_total_pages: payload.total_pages,
                success: true,
            },
            Err(e) => {
                tracing::warn!("Fetch failed on page {}: {}", page, e);
                PageFetch::default()
            }
        }
    }
}

//! Subtitle segment download

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{CaptionError, Result};

/// Fetches the text body of a segment
pub trait SegmentFetcher: Send + Sync + 'static {
    fn fetch_text(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP GET fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl SegmentFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CaptionError::Http(format!("{} returned {}", url, status)));
        }
        Ok(response.text().await?)
    }
}

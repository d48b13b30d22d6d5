//! Page transport for Google Scholar.
//!
//! [`PageFetcher`] is the seam between the pagination loops and the network.
//! [`HttpFetcher`] is the reqwest implementation used in production.

use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default Google Scholar URL
pub const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com";

/// User agent string for requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameters in request order.
pub type Params = Vec<(String, String)>;

/// Which Scholar page family a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/citations`: author search and profile pages
    Citations,
    /// `/scholar`: article search
    Articles,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Citations => "/citations",
            Self::Articles => "/scholar",
        }
    }
}

/// Fetches one Scholar page as HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, endpoint: Endpoint, params: &[(String, String)]) -> Result<String>;
}

/// reqwest-backed fetcher with a fixed browser header set
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Build the HTTP client, optionally routed through a proxy.
    pub fn new(proxy: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true);

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                HarvestError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| HarvestError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: DEFAULT_SCHOLAR_URL.to_string(),
        })
    }

    /// Use a mirror site or test server instead of scholar.google.com.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn build_url(&self, endpoint: Endpoint, params: &[(String, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint.path()))
            .map_err(|e| HarvestError::Config(format!("Invalid base URL: {}", e)))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, endpoint: Endpoint, params: &[(String, String)]) -> Result<String> {
        let url = self.build_url(endpoint, params)?;
        debug!(url = %url, "Fetching Scholar page");

        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(HarvestError::RateLimited("Google Scholar".to_string()));
        }
        if !status.is_success() {
            return Err(HarvestError::Api {
                code: status.as_u16(),
                message: format!("HTTP error: {}", status),
            });
        }

        let html = response.text().await?;
        if html.contains("Solving the above CAPTCHA") || html.contains("unusual traffic") {
            return Err(HarvestError::Captcha);
        }
        Ok(html)
    }
}

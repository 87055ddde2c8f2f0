//! Headless-browser fetch abstraction. The real implementation drives
//! Chrome through an authenticated forward proxy to get fully-rendered
//! HTML; `fetch` returning `Err` is what drives the category scrape's
//! per-URL fallback path (§4.3 failure handling).

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};

use crate::error::ScrapeError;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Fetches through a real Chrome instance, proxied when `proxy_url` is set.
/// `headless_chrome`'s API is blocking, so every call runs on the blocking
/// thread pool via `spawn_blocking`.
pub struct ChromeFetcher {
    proxy_url: Option<String>,
}

impl ChromeFetcher {
    pub fn new(proxy_url: Option<String>) -> Self {
        Self { proxy_url }
    }

    fn fetch_blocking(url: &str, proxy_url: Option<&str>) -> Result<String, ScrapeError> {
        let mut builder = LaunchOptions::default_builder();
        builder.headless(true);
        if let Some(proxy) = proxy_url {
            builder.proxy_server(Some(proxy));
        }
        let options = builder.build().map_err(|e| ScrapeError::Fetch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        let tab = browser.new_tab().map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        tab.navigate_to(url).map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        tab.wait_until_navigated().map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        let content = tab
            .get_content()
            .map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        Ok(content)
    }
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let url = url.to_string();
        let proxy_url = self.proxy_url.clone();
        tokio::task::spawn_blocking(move || Self::fetch_blocking(&url, proxy_url.as_deref()))
            .await
            .map_err(|e| ScrapeError::Fetch(e.to_string()))?
    }
}

//! Page fetching with a try-proxy-then-direct fallback.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;
use crate::proxy::{build_proxy_request, ProxySettings};

/// Per-call header overrides. `None` fields use the fetcher's defaults.
#[derive(Debug, Clone, Default)]
pub struct PageHeaders {
    pub user_agent: Option<String>,
    pub accept_language: Option<String>,
}

/// HTTP client for merchant product pages.
///
/// Every fetch attaches a browser-like `User-Agent`, an `Accept-Language`,
/// and `Cache-Control: no-cache`. When a scrape-proxy provider is
/// configured the relay is tried first; any relay failure falls through
/// silently to a single direct request. The direct body is returned
/// regardless of status (extraction is best effort), so only a transport
/// failure of the direct request surfaces as an error.
pub struct PageFetcher {
    client: Client,
    user_agent: String,
    accept_language: String,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with the configured timeout and defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        accept_language: &str,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_owned(),
            accept_language: accept_language.to_owned(),
        })
    }

    /// Fetches `url`, re-reading the proxy settings from the environment;
    /// the provider chain is re-evaluated on every call.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] only when the direct request itself
    /// fails; proxy failures fall through silently.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        self.fetch_page_with(url, &ProxySettings::from_env(), &PageHeaders::default())
            .await
    }

    /// Fetches `url` with explicit proxy settings and header overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] only when the direct request itself
    /// fails.
    pub async fn fetch_page_with(
        &self,
        url: &str,
        settings: &ProxySettings,
        headers: &PageHeaders,
    ) -> Result<String, ScrapeError> {
        if let Some(provider) = settings.select_provider() {
            match self.try_proxy(url, &provider, headers).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::debug!(
                        provider = provider.name(),
                        error = %e,
                        "proxy fetch failed; falling back to direct request"
                    );
                }
            }
        }

        let response = self.request(url, &[], headers).send().await?;
        // No status check on the fallback path: non-2xx bodies still go
        // through extraction.
        Ok(response.text().await?)
    }

    async fn try_proxy(
        &self,
        url: &str,
        provider: &crate::proxy::ProxyProvider,
        headers: &PageHeaders,
    ) -> Result<String, ScrapeError> {
        let proxy_request = build_proxy_request(url, provider)?;
        let extra: Vec<(&str, &str)> = proxy_request
            .headers
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();

        let response = self.request(&proxy_request.url, &extra, headers).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: proxy_request.url,
            });
        }
        Ok(response.text().await?)
    }

    fn request(
        &self,
        url: &str,
        extra_headers: &[(&str, &str)],
        overrides: &PageHeaders,
    ) -> reqwest::RequestBuilder {
        let user_agent = overrides.user_agent.as_deref().unwrap_or(&self.user_agent);
        let accept_language = overrides
            .accept_language
            .as_deref()
            .unwrap_or(&self.accept_language);

        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(reqwest::header::ACCEPT_LANGUAGE, accept_language)
            .header(reqwest::header::CACHE_CONTROL, "no-cache");

        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }
        request
    }
}

use reqwest::{Client, Response, header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT}};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use crate::config::ScrapingConfig;
use crate::error::{StudioError, StudioResult};

/// HTTP client wrapper presenting a fixed desktop-browser identity
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create new HTTP client from scraping settings
    pub fn new(config: &ScrapingConfig) -> StudioResult<Self> {
        let headers = Self::browser_headers(config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .pool_max_idle_per_host(config.max_concurrent_requests)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| StudioError::config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            "HTTP client initialized (timeout {}s, max redirects {})",
            config.request_timeout_seconds, config.max_redirects
        );

        Ok(Self { client })
    }

    fn browser_headers(config: &ScrapingConfig) -> StudioResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (USER_AGENT, &config.user_agent),
            (ACCEPT, &config.accept),
            (ACCEPT_LANGUAGE, &config.accept_language),
        ] {
            let value = HeaderValue::from_str(value)
                .map_err(|e| StudioError::config(format!("invalid {} header: {}", name, e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Issue a single GET. Non-success statuses are returned as errors; there
    /// are no retries.
    pub async fn get(&self, url: &Url) -> StudioResult<Response> {
        let start_time = Instant::now();
        debug!("HTTP GET: {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| map_transport_error(url, e))?;

        let status = response.status();
        debug!("HTTP GET {} -> {} in {}ms", url, status, start_time.elapsed().as_millis());

        if !status.is_success() {
            return Err(StudioError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

/// Map a reqwest transport failure onto the fetch error taxonomy
pub(crate) fn map_transport_error(url: &Url, error: reqwest::Error) -> StudioError {
    if error.is_timeout() {
        StudioError::Timeout { url: url.to_string() }
    } else if error.is_builder() {
        StudioError::invalid_url(url.as_str(), error.to_string())
    } else {
        StudioError::network(url.as_str(), error.to_string())
    }
}

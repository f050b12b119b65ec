//! HTTP GET with bounded retry and exponential backoff.
//!
//! Transport errors (connect failures, timeouts) and the configured server
//! error statuses are retried up to `retries` extra times; anything else is
//! returned immediately.

use crate::config::HttpConfig;
use crate::error::FetchError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Response};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    fn default_headers(&self, extra: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(&self.config.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        for (name, value) in extra {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Skipping invalid header {}", name),
            }
        }
        headers
    }

    /// GET `url`, retrying transient failures.
    ///
    /// `headers` override the defaults (User-Agent, Accept-Language).
    /// Accept-Encoding is negotiated by the client itself.
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<Response, FetchError> {
        let headers = self.default_headers(headers);
        let max_attempts = self.config.retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = self
                .client
                .get(url)
                .query(params)
                .headers(headers.clone())
                .send()
                .await;

            let last_error = match result {
                Ok(resp) if resp.status().is_success() => {
                    debug!("GET {} -> {} (attempt {})", url, resp.status(), attempt);
                    return Ok(resp);
                }
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if !self.config.is_retryable_status(status) {
                        return Err(FetchError::Status {
                            url: url.to_string(),
                            status,
                        });
                    }
                    format!("HTTP {}", status)
                }
                Err(e) if e.is_timeout() || e.is_connect() => e.to_string(),
                Err(e) => {
                    return Err(FetchError::Request {
                        url: url.to_string(),
                        source: e,
                    })
                }
            };

            if attempt >= max_attempts {
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last_error,
                });
            }

            let delay = self.config.backoff(attempt);
            warn!(
                "GET {} failed (attempt {}/{}): {}. Retrying in {:?}",
                url, attempt, max_attempts, last_error, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the checker, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests returning raw bytes
//! - Error classification into network and HTTP status failures
//!
//! There is no retry logic: a failed request is final for that document.

use crate::config::Config;
use crate::CheckerError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// A successfully fetched document
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// The URL that was requested
    pub url: Url,

    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Response body (transport encodings already removed)
    pub body: Vec<u8>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The checker configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitemap_checker::config::Config;
/// use sitemap_checker::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.fetch.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.fetch.connect_timeout_secs))
        .redirect(Policy::limited(config.fetch.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues single GET requests on a shared client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client configured from `config`
    pub fn from_config(config: &Config) -> Result<Self, CheckerError> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Fetches a URL, giving up at the run deadline
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `deadline` - Instant at which the request is abandoned, if any
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedDocument)` - 2xx response with its body
    /// * `Err(CheckerError::Http)` - Non-2xx response
    /// * `Err(CheckerError::Timeout)` - Request or run deadline elapsed
    /// * `Err(CheckerError::Network)` - Connection, DNS, TLS or redirect failure
    /// * `Err(CheckerError::Document)` - Transport content-encoding was corrupt
    pub async fn fetch(
        &self,
        url: &Url,
        deadline: Option<Instant>,
    ) -> Result<FetchedDocument, CheckerError> {
        match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, self.send(url)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::debug!("Run deadline reached while fetching {}", url);
                    Err(CheckerError::Timeout {
                        url: url.to_string(),
                    })
                }
            },
            None => self.send(url).await,
        }
    }

    async fn send(&self, url: &Url) -> Result<FetchedDocument, CheckerError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(CheckerError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| classify_error(url, e))?;

        tracing::debug!(
            "Fetched {} ({} bytes, {})",
            final_url,
            body.len(),
            content_type.as_deref().unwrap_or("no content type")
        );

        Ok(FetchedDocument {
            url: url.clone(),
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

/// Maps a reqwest error onto the error taxonomy
fn classify_error(url: &Url, e: reqwest::Error) -> CheckerError {
    let url = url.to_string();

    if e.is_timeout() {
        CheckerError::Timeout { url }
    } else if e.is_connect() {
        CheckerError::Network {
            url,
            message: format!("Connection failed: {}", e),
        }
    } else if e.is_redirect() {
        CheckerError::Network {
            url,
            message: "Too many redirects".to_string(),
        }
    } else if e.is_decode() {
        CheckerError::Document {
            url,
            source: crate::DocumentError::Gzip(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            )),
        }
    } else {
        CheckerError::Network {
            url,
            message: e.to_string(),
        }
    }
}

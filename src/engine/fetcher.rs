//! HTTP fetcher
//!
//! Builds the reqwest client the engine uses for every request and wraps
//! the fetch of a single page. Fetch failures are fatal to the whole run:
//! the engine makes no attempt to retry or skip a bad link.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while fetching pages
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Domain of {url} is not in allowed_domains")]
    DomainNotAllowed { url: String },

    #[error("URL disallowed by robots.txt: {url}")]
    RobotsDenied { url: String },

    #[error("Cannot resolve link {href:?}: {message}")]
    InvalidLink { href: String, message: String },
}

/// A successful page response
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, empty when absent
    pub content_type: String,
    /// Response body
    pub body: String,
}

impl FetchedPage {
    /// Whether the response looks like an HTML document
    ///
    /// Pipeline rules only run against HTML; anything else is skipped.
    pub fn is_html(&self) -> bool {
        self.content_type.to_lowercase().contains("html")
    }
}

/// Builds the HTTP client used for the whole run
pub fn build_http_client(user_agent: &str) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(FetchError::Client)
}

/// Fetches a single page
///
/// Transport failures and non-2xx statuses are both errors; the caller
/// decides nothing, it just propagates.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::Http {
            url: url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response.text().await.map_err(|e| FetchError::Http {
        url: url.to_string(),
        source: e,
    })?;

    Ok(FetchedPage {
        final_url,
        status: status.as_u16(),
        content_type,
        body,
    })
}

//! Typed errors for the scrape pass

use thiserror::Error;

/// Errors that can occur fetching a page. Treated as transient.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

/// No registered adapter handles the URL's host
#[derive(Debug, Error)]
#[error("no site adapter handles {url}")]
pub struct UnsupportedSiteError {
    pub url: String,
}

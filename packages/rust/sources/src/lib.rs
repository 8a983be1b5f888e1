//! Remote sources feeding the README: GitHub contributions, notes, and the blog feed.
//!
//! Every fetcher takes an explicitly constructed [`reqwest::Client`] (or a
//! [`GithubClient`] wrapping one) so tests can point it at a mock server.
//! No fetcher retries; the first failure is returned to the caller.

mod feed;
mod github;
mod notes;

use std::time::Duration;

use readmegen_shared::{HttpConfig, ReadmeError, Result};
use reqwest::{Client, Response};

pub use feed::{fetch_feed, parse_atom};
pub use github::GithubClient;
pub use notes::fetch_sql_notes;

/// User-Agent string for all outgoing requests. GitHub rejects requests without one.
const USER_AGENT: &str = concat!("readmegen/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client with the configured timeout.
pub fn build_client(http: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(http.timeout_secs))
        .build()
        .map_err(|e| ReadmeError::Network(format!("failed to build HTTP client: {e}")))
}

/// Read the body of a successful response, mapping failures to [`ReadmeError`].
async fn read_body(response: Response, url: &str) -> Result<String> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = response.text().await.unwrap_or_default();
        return Err(ReadmeError::Api(format!("{url}: HTTP {status}: {}", body.trim())));
    }
    if !status.is_success() {
        return Err(ReadmeError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| ReadmeError::Network(format!("{url}: failed to read body: {e}")))
}

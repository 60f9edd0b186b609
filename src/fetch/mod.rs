//! HTTP plumbing shared by all upstream fetchers.

mod client;
pub mod auth;

#[cfg(test)]
pub(crate) mod stub;

pub use client::{BasicClient, HttpClient};

use reqwest::{Method, Request};

use crate::error::FetchError;

/// Issues one GET for `url` and returns the response body as text.
///
/// # Errors
///
/// `UpstreamUnavailable` on a connection failure, timeout, or non-success
/// status; `MalformedResponse` if the body cannot be read as text.
#[tracing::instrument(skip(client))]
pub async fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<String, FetchError> {
    let parsed = url
        .parse()
        .map_err(|e| FetchError::UpstreamUnavailable(format!("invalid url {url}: {e}")))?;

    let resp = client
        .execute(Request::new(Method::GET, parsed))
        .await
        .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?
        .error_for_status()
        .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

    resp.text()
        .await
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))
}

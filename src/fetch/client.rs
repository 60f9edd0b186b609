use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Abstraction over the HTTP transport.
///
/// Fetchers only ever issue GETs through this trait, so production code can
/// wrap the transport with auth decorators and tests can substitute a stub
/// serving canned payloads.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for Box<T> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}

/// Plain reqwest-backed client with bounded timeouts.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// Every upstream call is capped at 30 s overall and 10 s to connect.
    /// Expiry shows up as a request error, which the fetch helpers surface
    /// as `UpstreamUnavailable`.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("building the HTTP client");
        Self(client)
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.0.execute(req).await
    }
}

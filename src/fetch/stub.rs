//! Test double for [`HttpClient`] serving canned responses keyed by URL.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Request, Response};

use super::HttpClient;

/// Replays configured `(status, body)` pairs and records every requested URL.
/// Unknown URLs answer with HTTP 500 so tests exercise the failure path
/// without any network.
pub(crate) struct StubClient {
    responses: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<String>>,
}

impl StubClient {
    pub(crate) fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    /// URLs requested so far, in order.
    pub(crate) fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        let url = req.url().to_string();
        self.requests.lock().unwrap().push(url.clone());

        let (status, body) = self
            .responses
            .get(&url)
            .map(|(s, b)| (*s, b.clone()))
            .unwrap_or((500, String::new()));

        let resp = http::Response::builder()
            .status(status)
            .body(body)
            .expect("stub response");
        Ok(resp.into())
    }
}

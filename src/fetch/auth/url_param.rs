use async_trait::async_trait;

use crate::fetch::HttpClient;

/// An [`HttpClient`] wrapper that appends an application key as a URL query
/// parameter.
///
/// TfL serves anonymous requests at a reduced rate cap; a registered
/// `app_key` raises it. The wrapper leaves everything else about the request
/// untouched, so it composes with any inner transport.
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

impl<C> UrlParam<C> {
    /// Convenience constructor for the TfL unified API's `app_key` parameter.
    pub fn app_key(inner: C, key: String) -> Self {
        Self {
            inner,
            param_name: "app_key".to_string(),
            key,
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}

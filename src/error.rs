//! Error taxonomy shared by every upstream fetcher.

use thiserror::Error;

/// Failure modes of one upstream fetch.
///
/// The variants keep three situations distinguishable for the caller: the
/// upstream could not be reached at all, the body was not the expected
/// format, or the body parsed but an expected field is gone (upstream
/// contract drift).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network failure, timeout, or a non-success HTTP status.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The response body could not be parsed as the expected format.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The body parsed, but an expected field or key is absent or unusable.
    /// Never substituted with a default.
    #[error("unexpected upstream schema: {0}")]
    SchemaMismatch(String),
}

//! Client decorators for upstream authentication.

mod url_param;

pub use url_param::UrlParam;

//! Credential wrappers around an [`HttpClient`](crate::fetch::HttpClient).

mod url_param;

pub use url_param::UrlParam;

//! HTTP transport for the feed requests.
//!
//! Predictors talk to an [`HttpClient`] rather than `reqwest` directly so
//! credentials can be layered on with wrappers such as [`auth::UrlParam`] and
//! tests can substitute canned responses.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use reqwest::Url;

/// Builds a request URL from an endpoint and query parameters.
pub fn feed_url(endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
    Url::parse_with_params(endpoint, params)
        .with_context(|| format!("invalid feed endpoint '{endpoint}'"))
}

/// Issues a GET for `url` and returns the body.
///
/// # Errors
///
/// Fails on transport errors (including timeouts) and on any non-2xx status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: Url) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_url_encodes_params() {
        let url = feed_url(
            "http://lapi.transitchicago.com/api/1.0/ttarrivals.aspx",
            &[("mapid", "40330"), ("max", "5"), ("outputType", "XML")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://lapi.transitchicago.com/api/1.0/ttarrivals.aspx?mapid=40330&max=5&outputType=XML"
        );
    }

    #[test]
    fn test_feed_url_rejects_relative_endpoint() {
        assert!(feed_url("bustime/api/v2/getpredictions", &[]).is_err());
    }
}

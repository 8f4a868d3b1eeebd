//! Outbound request path.

use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method};
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::routing::UpstreamTarget;

/// Inbound headers copied to the origin. Everything else is dropped to
/// keep credentials and custom headers from leaking cross-origin.
const FORWARDED_HEADERS: [&str; 3] = ["accept", "accept-language", "user-agent"];

/// Failures on the outbound leg. All of them surface as a bad gateway.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream url: {0}")]
    Address(#[from] url::ParseError),

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Thin wrapper over the shared HTTP client.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_secs))
            .timeout(Duration::from_secs(config.request_secs))
            .build()?;
        Ok(Self { client })
    }

    /// Issue the single outbound request for an inbound request.
    ///
    /// The outbound method is HEAD when the caller sent HEAD (no point
    /// downloading a body that will be discarded) and GET otherwise,
    /// whatever the inbound method was.
    pub async fn fetch(
        &self,
        target: &UpstreamTarget,
        inbound_method: &Method,
        inbound_headers: &HeaderMap,
    ) -> Result<reqwest::Response, UpstreamError> {
        let url = Url::parse(&target.url())?;

        let method = if *inbound_method == Method::HEAD {
            Method::HEAD
        } else {
            Method::GET
        };

        let mut headers = HeaderMap::new();
        for name in FORWARDED_HEADERS {
            if let Some(value) = inbound_headers.get(name) {
                headers.insert(name, value.clone());
            }
        }
        if let Some(auth) = inbound_headers.get(AUTHORIZATION) {
            headers.insert(AUTHORIZATION, auth.clone());
        }

        let response = self
            .client
            .request(method, url)
            .headers(headers)
            .send()
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn allow_list_matches_the_contract() {
        assert_eq!(
            FORWARDED_HEADERS,
            ["accept", "accept-language", "user-agent"]
        );
    }

    #[test]
    fn client_builds_from_default_config() {
        let client = UpstreamClient::new(&UpstreamConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn header_names_are_valid() {
        // insert() with a str name panics on invalid names; exercise them once.
        let mut headers = HeaderMap::new();
        for name in FORWARDED_HEADERS {
            headers.insert(name, HeaderValue::from_static("x"));
        }
        assert_eq!(headers.len(), FORWARDED_HEADERS.len());
    }
}

//! Upstream target extraction from the inbound request path.
//!
//! # Responsibilities
//! - Parse `/{protocol}/{host}` and `/{protocol}/{host}/{rest...}` paths
//! - Enforce the http/https scheme allow-list
//! - Rebuild the upstream URL without decoding or re-encoding anything
//!
//! # Design Decisions
//! - Works on the raw request path, not router-decoded parameters, so
//!   percent-encoded segments reach the origin untouched
//! - An empty rest yields `protocol://host` with no trailing slash
//! - The query string is appended verbatim when present

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Rejection for a path whose first segment is not `http` or `https`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid protocol {0:?}: use http or https")]
pub struct InvalidProtocol(pub String);

/// Upstream scheme allow-list. Matching is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl FromStr for Protocol {
    type Err = InvalidProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(InvalidProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated upstream destination, derived from the inbound path.
///
/// Never persisted; rebuilt deterministically on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub protocol: Protocol,
    pub host: String,
    /// Path segments after the host, rejoined with `/`. May be empty.
    pub rest: String,
    /// Raw query string without the leading `?`, if the request had one.
    pub query: Option<String>,
}

impl UpstreamTarget {
    /// Parse an inbound request path of the form `/{protocol}/{host}/{rest...}`.
    ///
    /// `path` is the raw request path; `query` the raw query string when
    /// present. Returns `InvalidProtocol` for any first segment outside
    /// the allow-list, which callers must map to a 400 without touching
    /// the cache or the upstream.
    pub fn from_path(path: &str, query: Option<&str>) -> Result<Self, InvalidProtocol> {
        let mut segments = path.trim_start_matches('/').splitn(3, '/');

        let protocol: Protocol = segments.next().unwrap_or("").parse()?;
        let host = segments.next().unwrap_or("").to_string();
        let rest = segments.next().unwrap_or("").to_string();

        Ok(Self {
            protocol,
            host,
            rest,
            query: query.map(str::to_string),
        })
    }

    /// Build the outbound URL by concatenation, exactly as received.
    pub fn url(&self) -> String {
        let mut url = match self.rest.is_empty() {
            true => format!("{}://{}", self.protocol, self.host),
            false => format!("{}://{}/{}", self.protocol, self.host, self.rest),
        };
        if let Some(query) = &self.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_only_path() {
        let target = UpstreamTarget::from_path("/https/example.com", None).unwrap();
        assert_eq!(target.protocol, Protocol::Https);
        assert_eq!(target.host, "example.com");
        assert_eq!(target.rest, "");
        assert_eq!(target.url(), "https://example.com");
    }

    #[test]
    fn rejoins_rest_segments() {
        let target = UpstreamTarget::from_path("/http/example.com/v1/ping/deep", None).unwrap();
        assert_eq!(target.rest, "v1/ping/deep");
        assert_eq!(target.url(), "http://example.com/v1/ping/deep");
    }

    #[test]
    fn appends_query_verbatim() {
        let target =
            UpstreamTarget::from_path("/https/example.com/v1/ping", Some("ttl=60&a=b%20c"))
                .unwrap();
        assert_eq!(target.url(), "https://example.com/v1/ping?ttl=60&a=b%20c");
    }

    #[test]
    fn empty_rest_has_no_trailing_slash() {
        let target = UpstreamTarget::from_path("/http/example.com", Some("x=1")).unwrap();
        assert_eq!(target.url(), "http://example.com?x=1");
    }

    #[test]
    fn protocol_matching_is_case_sensitive() {
        assert!(UpstreamTarget::from_path("/HTTP/example.com", None).is_err());
        assert!(UpstreamTarget::from_path("/Https/example.com", None).is_err());
    }

    #[test]
    fn unknown_protocol_is_rejected() {
        let err = UpstreamTarget::from_path("/ftp/example.com/file", None).unwrap_err();
        assert_eq!(err, InvalidProtocol("ftp".to_string()));
    }

    #[test]
    fn percent_encoded_segments_pass_through() {
        let target =
            UpstreamTarget::from_path("/https/example.com/a%2Fb/c", None).unwrap();
        assert_eq!(target.url(), "https://example.com/a%2Fb/c");
    }
}

//! Absolute URL parsing for URL-valued backends.
//!
//! Mirrors the original `lb::Url` (a regex-matched value type over
//! protocol/hostname/port/path/query/fragment) but expressed the idiomatic
//! Rust way: an immutable struct built once by [`Url::parse`], backed by
//! the `regex` crate instead of hand-rolled scanning.

use crate::models::error::LbError;
use once_cell::sync::Lazy;
use regex::Regex;

/// `scheme://host:port/path?query#fragment`, every group optional except
/// the host. Mirrors the original's ctre pattern group-for-group.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\w+)://)?([^/\s:]+)(?::(\d{2,5}))?([^?\s#]*)(?:\?([^\s#]*))?(?:#(\S*))?$")
        .expect("URL_PATTERN is a valid regex")
});

fn default_port_for(protocol: &str) -> Option<&'static str> {
    match protocol {
        "http" => Some("80"),
        "https" => Some("443"),
        "ftp" => Some("21"),
        "ssh" => Some("22"),
        _ => None,
    }
}

/// An immutable, structurally-comparable absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url {
    protocol: String,
    hostname: String,
    port: String,
    path: String,
    query: String,
    fragment: String,
}

impl Url {
    /// Parses `s` into a `Url`, defaulting a missing scheme to `http` and
    /// a missing port from the scheme's well-known default. Fails with
    /// [`LbError::MalformedUrl`] if `s` doesn't match the URL grammar, or
    /// [`LbError::UnknownProtocol`] if the port is missing and the scheme
    /// has no default.
    pub fn parse(s: &str) -> Result<Url, LbError> {
        let caps = URL_PATTERN
            .captures(s)
            .ok_or_else(|| LbError::MalformedUrl(s.to_string()))?;

        let protocol = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "http".to_string());

        let hostname = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| LbError::MalformedUrl(s.to_string()))?;

        let port = match caps.get(3).map(|m| m.as_str()) {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => default_port_for(&protocol)
                .ok_or_else(|| LbError::UnknownProtocol(protocol.clone()))?
                .to_string(),
        };

        let path = caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default();
        let query = caps.get(5).map(|m| m.as_str().to_string()).unwrap_or_default();
        let fragment = caps.get(6).map(|m| m.as_str().to_string()).unwrap_or_default();

        Ok(Url {
            protocol,
            hostname,
            port,
            path,
            query,
            fragment,
        })
    }

    /// Whether `s` matches the URL grammar, without building a `Url`.
    pub fn is_url(s: &str) -> bool {
        URL_PATTERN.is_match(s)
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Canonical string form, e.g. `https://host:443/path?query#fragment`.
    pub fn to_canonical_string(&self) -> String {
        let mut s = format!("{}://{}:{}{}", self.protocol, self.hostname, self.port, self.path);
        if !self.query.is_empty() {
            s.push('?');
            s.push_str(&self.query);
        }
        if !self.fragment.is_empty() {
            s.push('#');
            s.push_str(&self.fragment);
        }
        s
    }
}

impl std::fmt::Display for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

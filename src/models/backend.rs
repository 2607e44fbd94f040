//! Backend values: the thing a selector hands back to the connector.

use crate::models::error::LbError;
use crate::models::url::Url;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

/// A selectable upstream endpoint: either a concrete `ip:port`, or a URL
/// that must be DNS-resolved before connecting. Mirrors the original's
/// `std::variant<EndpointType, UrlType>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Endpoint(SocketAddr),
    UrlRef(Url),
}

impl Backend {
    pub fn endpoint(addr: SocketAddr) -> Backend {
        Backend::Endpoint(addr)
    }

    pub fn url(url: Url) -> Backend {
        Backend::UrlRef(url)
    }

    /// Parses a `{ip, port}` pair into an endpoint backend.
    pub fn from_ip_port(ip: &str, port: u16) -> Result<Backend, LbError> {
        let ip: std::net::IpAddr = ip
            .parse()
            .map_err(|_| LbError::Config(format!("invalid ip address: {ip}")))?;
        Ok(Backend::Endpoint(SocketAddr::new(ip, port)))
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Backend::UrlRef(_))
    }

    pub fn is_endpoint(&self) -> bool {
        matches!(self, Backend::Endpoint(_))
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Backend::UrlRef(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_endpoint(&self) -> Option<SocketAddr> {
        match self {
            Backend::Endpoint(e) => Some(*e),
            _ => None,
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Endpoint(addr) => write!(f, "{}:{}", addr.ip(), addr.port()),
            Backend::UrlRef(url) => write!(f, "{}", url.to_canonical_string()),
        }
    }
}

impl Hash for Backend {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_to_string() {
        let b = Backend::from_ip_port("127.0.0.1", 9001).unwrap();
        assert_eq!(b.to_string(), "127.0.0.1:9001");
    }

    #[test]
    fn url_to_string_is_canonical_form() {
        let b = Backend::url(Url::parse("http://upstream:8080/").unwrap());
        assert_eq!(b.to_string(), "http://upstream:8080/");
    }

    #[test]
    fn equality_respects_variant() {
        let ep = Backend::from_ip_port("127.0.0.1", 9001).unwrap();
        let url = Backend::url(Url::parse("http://127.0.0.1:9001").unwrap());
        assert_ne!(ep, url);
    }
}

//! DNS resolution for URL-valued backends.
//!
//! The original resolves through a dedicated `boost::asio::ip::tcp::resolver`
//! bound to its own strand (`Connector::resolver`). Tokio's resolver is
//! already a plain async function safe to call from any task, so the
//! strand collapses into this free function; no new DNS crate is pulled
//! in beyond what `tokio`'s `net` feature already provides.

use crate::models::error::LbError;
use std::net::SocketAddr;
use tokio::net::lookup_host;

/// Resolves `hostname:port` to its candidate socket addresses, in the
/// order the resolver returns them.
pub async fn resolve(hostname: &str, port: &str) -> Result<Vec<SocketAddr>, LbError> {
    let query = format!("{hostname}:{port}");
    let addrs: Vec<SocketAddr> = lookup_host(&query)
        .await
        .map_err(|e| LbError::Connect(format!("resolving {query}: {e}")))?
        .collect();
    if addrs.is_empty() {
        return Err(LbError::Connect(format!("no addresses found for {query}")));
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_localhost() {
        let addrs = resolve("localhost", "9001").await.unwrap();
        assert!(addrs.iter().all(|a| a.port() == 9001));
        assert!(addrs.iter().any(|a| a.ip().is_loopback()));
    }
}

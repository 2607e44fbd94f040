//! IP hash: the same client address always maps to the same backend, as
//! long as the backend set doesn't change.
//!
//! Grounded in `kairos-rs::services::load_balancer::IpHashBalancer`
//! (hashes the client's octets into an index modulo the backend count);
//! extended here to also fold in the client port, matching the original
//! `lb::tcp` selector's `hash(ip.toString()) * 37 + port * 37^2`
//! combination.

use super::{LoadBalancingConfig, Selector, SelectorKind};
use crate::models::backend::Backend;
use crate::models::error::LbError;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Mutex;

pub struct IpHashSelector {
    backends: Mutex<Vec<Backend>>,
}

impl IpHashSelector {
    pub fn new() -> IpHashSelector {
        IpHashSelector {
            backends: Mutex::new(Vec::new()),
        }
    }
}

impl Default for IpHashSelector {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_client(client: SocketAddr) -> u64 {
    let mut hasher = DefaultHasher::new();
    client.ip().to_string().hash(&mut hasher);
    let ip_hash = hasher.finish();
    ip_hash
        .wrapping_mul(37)
        .wrapping_add((client.port() as u64).wrapping_mul(37 * 37))
}

impl Selector for IpHashSelector {
    fn configure(&self, config: &LoadBalancingConfig) -> Result<(), LbError> {
        let backends = config.backends()?;
        if backends.is_empty() {
            return Err(LbError::Config("ip_hash requires at least one endpoint".to_string()));
        }
        *self.backends.lock().unwrap() = backends;
        Ok(())
    }

    fn select_backend(&self, client: SocketAddr) -> Result<Backend, LbError> {
        let backends = self.backends.lock().unwrap();
        if backends.is_empty() {
            return Err(LbError::AllBackendsExcluded);
        }
        let i = (hash_client(client) as usize) % backends.len();
        Ok(backends[i].clone())
    }

    fn exclude_backend(&self, backend: &Backend) -> Result<(), LbError> {
        let mut backends = self.backends.lock().unwrap();
        if backends.iter().filter(|b| *b != backend).count() == 0 {
            return Err(LbError::AllBackendsExcluded);
        }
        backends.retain(|b| b != backend);
        Ok(())
    }

    fn kind(&self) -> SelectorKind {
        SelectorKind::IpHash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::EndpointConfig;

    fn cfg(n: usize) -> LoadBalancingConfig {
        LoadBalancingConfig {
            algorithm: "ip_hash".to_string(),
            replicas: None,
            endpoints: (0..n)
                .map(|i| EndpointConfig {
                    ip: Some("127.0.0.1".to_string()),
                    port: Some(9000 + i as u16),
                    url: None,
                    weight: None,
                })
                .collect(),
        }
    }

    #[test]
    fn same_client_always_maps_to_same_backend() {
        let s = IpHashSelector::new();
        s.configure(&cfg(5)).unwrap();
        let client: SocketAddr = "203.0.113.9:51000".parse().unwrap();
        let a = s.select_backend(client).unwrap();
        let b = s.select_backend(client).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_ports_can_map_differently() {
        let s = IpHashSelector::new();
        s.configure(&cfg(8)).unwrap();
        let picks: std::collections::HashSet<Backend> = (0..20)
            .map(|p| {
                let client: SocketAddr = format!("203.0.113.9:{}", 40000 + p).parse().unwrap();
                s.select_backend(client).unwrap()
            })
            .collect();
        assert!(picks.len() > 1, "expected port to influence the mapping");
    }
}

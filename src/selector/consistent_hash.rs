//! Consistent hash: wraps a [`HashRing`] so a client's mapping only moves
//! to another backend when its own successor is excluded.
//!
//! Grounded in the original `lb::tcp::ConsistentHashSelector`
//! (`selectors.hpp`/`.cpp`): the ring itself is a virtual-replica
//! structure (see [`super::ring`]); this module is the thin `Selector`
//! adapter around it, matching how the original layers `ISelector` over
//! its ring class.

use super::ring::HashRing;
use super::{LoadBalancingConfig, Selector, SelectorKind};
use crate::models::backend::Backend;
use crate::models::error::LbError;
use std::net::SocketAddr;
use std::sync::Mutex;

pub struct ConsistentHashSelector {
    ring: Mutex<HashRing>,
}

impl ConsistentHashSelector {
    pub fn new(replicas: usize) -> ConsistentHashSelector {
        ConsistentHashSelector {
            ring: Mutex::new(HashRing::new(replicas)),
        }
    }
}

impl Selector for ConsistentHashSelector {
    fn configure(&self, config: &LoadBalancingConfig) -> Result<(), LbError> {
        let backends = config.backends()?;
        if backends.is_empty() {
            return Err(LbError::Config(
                "consistent_hash requires at least one endpoint".to_string(),
            ));
        }
        let mut ring = self.ring.lock().unwrap();
        for backend in backends {
            ring.insert(backend);
        }
        Ok(())
    }

    fn select_backend(&self, client: SocketAddr) -> Result<Backend, LbError> {
        let ring = self.ring.lock().unwrap();
        ring.select(&client.ip()).map_err(|_| LbError::AllBackendsExcluded)
    }

    fn exclude_backend(&self, backend: &Backend) -> Result<(), LbError> {
        let mut ring = self.ring.lock().unwrap();
        if ring.physical_backends().iter().filter(|b| *b != backend).count() == 0 {
            return Err(LbError::AllBackendsExcluded);
        }
        ring.erase(backend);
        Ok(())
    }

    fn kind(&self) -> SelectorKind {
        SelectorKind::ConsistentHash
    }
}

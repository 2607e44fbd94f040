//! Plain round robin: cycle through the configured backends in order.
//!
//! Grounded in `kairos-rs::services::load_balancer::RoundRobinBalancer`
//! (an atomic counter modulo the backend count), adapted to hold the
//! backend set behind a mutex so `exclude_backend` can mutate it.

use super::{LoadBalancingConfig, Selector, SelectorKind};
use crate::models::backend::Backend;
use crate::models::error::LbError;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct RoundRobinSelector {
    backends: Mutex<Vec<Backend>>,
    next: AtomicUsize,
}

impl RoundRobinSelector {
    pub fn new() -> RoundRobinSelector {
        RoundRobinSelector {
            backends: Mutex::new(Vec::new()),
            next: AtomicUsize::new(0),
        }
    }
}

impl Default for RoundRobinSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for RoundRobinSelector {
    fn configure(&self, config: &LoadBalancingConfig) -> Result<(), LbError> {
        let backends = config.backends()?;
        if backends.is_empty() {
            return Err(LbError::Config("round_robin requires at least one endpoint".to_string()));
        }
        *self.backends.lock().unwrap() = backends;
        Ok(())
    }

    fn select_backend(&self, _client: SocketAddr) -> Result<Backend, LbError> {
        let backends = self.backends.lock().unwrap();
        if backends.is_empty() {
            return Err(LbError::AllBackendsExcluded);
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed) % backends.len();
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
        SelectorKind::RoundRobin
    }
}

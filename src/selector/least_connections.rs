//! Least connections: always pick the backend with the fewest sessions
//! currently open against it.
//!
//! Grounded in `kairos-rs::services::load_balancer::LeastConnectionsBalancer`
//! (a `Vec<AtomicUsize>` scanned linearly on every pick) and in the
//! original's use of `boost::heap` handles for O(log n) priority updates
//! (`benchmarks/benchmark_heaps.cpp`); this implementation takes the
//! latter approach via the `priority-queue` crate so selection stays
//! logarithmic as the backend set grows. The original's two-step
//! "increase on connect, decrease on disconnect" became a single
//! `select_backend` (which both picks and increments) plus
//! `record_disconnect` (which decrements), flattening the reentrant-lock
//! dance the C++ version needed between its selector and its session.

use super::{LoadBalancingConfig, Selector, SelectorKind};
use crate::models::backend::Backend;
use crate::models::error::LbError;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::net::SocketAddr;
use std::sync::Mutex;

pub struct LeastConnectionsSelector {
    counts: Mutex<PriorityQueue<Backend, Reverse<u64>>>,
}

impl LeastConnectionsSelector {
    pub fn new() -> LeastConnectionsSelector {
        LeastConnectionsSelector {
            counts: Mutex::new(PriorityQueue::new()),
        }
    }
}

impl Default for LeastConnectionsSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for LeastConnectionsSelector {
    fn configure(&self, config: &LoadBalancingConfig) -> Result<(), LbError> {
        let backends = config.backends()?;
        if backends.is_empty() {
            return Err(LbError::Config(
                "least_connections requires at least one endpoint".to_string(),
            ));
        }
        let mut counts = self.counts.lock().unwrap();
        for backend in backends {
            counts.push(backend, Reverse(0));
        }
        Ok(())
    }

    fn select_backend(&self, _client: SocketAddr) -> Result<Backend, LbError> {
        let mut counts = self.counts.lock().unwrap();
        let (backend, Reverse(current)) = counts.peek().ok_or(LbError::AllBackendsExcluded)?;
        let backend = backend.clone();
        let next = current + 1;
        counts.change_priority(&backend, Reverse(next));
        Ok(backend)
    }

    fn exclude_backend(&self, backend: &Backend) -> Result<(), LbError> {
        let mut counts = self.counts.lock().unwrap();
        if counts.iter().filter(|(b, _)| *b != backend).count() == 0 {
            return Err(LbError::AllBackendsExcluded);
        }
        counts.remove(backend);
        Ok(())
    }

    fn kind(&self) -> SelectorKind {
        SelectorKind::LeastConnections
    }

    fn record_disconnect(&self, backend: &Backend) {
        let mut counts = self.counts.lock().unwrap();
        if let Some(&Reverse(current)) = counts.get_priority(backend) {
            let next = current.saturating_sub(1);
            counts.change_priority(backend, Reverse(next));
        }
    }
}

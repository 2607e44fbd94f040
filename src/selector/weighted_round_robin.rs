//! Weighted round robin: backends with higher weight are picked more often,
//! in strict rotation rather than probabilistically.
//!
//! Grounded in `kairos-rs::services::load_balancer::WeightedRoundRobinBalancer`
//! (expands the backend list into a weighted sequence once, then walks it
//! with the same atomic-counter technique as plain round robin), extended
//! to support runtime exclusion by re-expanding the sequence under a lock.

use super::{LoadBalancingConfig, Selector, SelectorKind};
use crate::models::backend::Backend;
use crate::models::error::LbError;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Weighted {
    backend: Backend,
    weight: u32,
}

pub struct WeightedRoundRobinSelector {
    entries: Mutex<Vec<Weighted>>,
    sequence: Mutex<Vec<usize>>,
    next: AtomicUsize,
}

/// Expands `entries` (index, weight) into a sequence sorted by weight
/// descending, with each backend's index repeated contiguously `weight`
/// times — `[3, 1]` becomes `[0, 0, 0, 1]`, not interleaved. Mirrors the
/// original's "sorted by weight descending, repeat counter" construction.
fn expand(entries: &[Weighted]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| entries[b].weight.cmp(&entries[a].weight));
    let mut sequence = Vec::with_capacity(entries.iter().map(|e| e.weight as usize).sum());
    for i in order {
        for _ in 0..entries[i].weight {
            sequence.push(i);
        }
    }
    sequence
}

impl WeightedRoundRobinSelector {
    pub fn new() -> WeightedRoundRobinSelector {
        WeightedRoundRobinSelector {
            entries: Mutex::new(Vec::new()),
            sequence: Mutex::new(Vec::new()),
            next: AtomicUsize::new(0),
        }
    }
}

impl Default for WeightedRoundRobinSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for WeightedRoundRobinSelector {
    fn configure(&self, config: &LoadBalancingConfig) -> Result<(), LbError> {
        let backends = config.backends()?;
        let weights = config.weights();
        if backends.is_empty() {
            return Err(LbError::Config(
                "weighted_round_robin requires at least one endpoint".to_string(),
            ));
        }
        if weights.iter().any(|w| *w == 0) {
            return Err(LbError::Config("endpoint weight must be nonzero".to_string()));
        }
        let entries: Vec<Weighted> = backends
            .into_iter()
            .zip(weights)
            .map(|(backend, weight)| Weighted { backend, weight })
            .collect();
        let sequence = expand(&entries);
        *self.entries.lock().unwrap() = entries;
        *self.sequence.lock().unwrap() = sequence;
        self.next.store(0, Ordering::Relaxed);
        Ok(())
    }

    fn select_backend(&self, _client: SocketAddr) -> Result<Backend, LbError> {
        let entries = self.entries.lock().unwrap();
        let sequence = self.sequence.lock().unwrap();
        if sequence.is_empty() {
            return Err(LbError::AllBackendsExcluded);
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed) % sequence.len();
        Ok(entries[sequence[i]].backend.clone())
    }

    fn exclude_backend(&self, backend: &Backend) -> Result<(), LbError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().filter(|e| &e.backend != backend).count() == 0 {
            return Err(LbError::AllBackendsExcluded);
        }
        entries.retain(|e| &e.backend != backend);
        let mut sequence = self.sequence.lock().unwrap();
        *sequence = expand(&entries);
        self.next.store(0, Ordering::Relaxed);
        Ok(())
    }

    fn kind(&self) -> SelectorKind {
        SelectorKind::WeightedRoundRobin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::EndpointConfig;

    fn cfg(weights: &[u32]) -> LoadBalancingConfig {
        LoadBalancingConfig {
            algorithm: "weighted_round_robin".to_string(),
            replicas: None,
            endpoints: weights
                .iter()
                .enumerate()
                .map(|(i, w)| EndpointConfig {
                    ip: Some("127.0.0.1".to_string()),
                    port: Some(9000 + i as u16),
                    url: None,
                    weight: Some(*w),
                })
                .collect(),
        }
    }

    fn client() -> SocketAddr {
        "10.0.0.1:1234".parse().unwrap()
    }

    #[test]
    fn picks_proportionally_to_weight_over_one_cycle() {
        let s = WeightedRoundRobinSelector::new();
        s.configure(&cfg(&[3, 1])).unwrap();
        let mut counts = std::collections::HashMap::new();
        for _ in 0..4 {
            *counts.entry(s.select_backend(client()).unwrap()).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 2);
        let max = *counts.values().max().unwrap();
        let min = *counts.values().min().unwrap();
        assert_eq!(max, 3);
        assert_eq!(min, 1);
    }

    #[test]
    fn one_cycle_runs_each_backend_contiguously_by_descending_weight() {
        let s = WeightedRoundRobinSelector::new();
        s.configure(&cfg(&[1, 2, 3, 4, 5])).unwrap();
        let picks: Vec<Backend> = (0..15).map(|_| s.select_backend(client()).unwrap()).collect();
        let runs: Vec<(Backend, usize)> = picks.iter().fold(Vec::new(), |mut acc, b| {
            match acc.last_mut() {
                Some((last, count)) if last == b => *count += 1,
                _ => acc.push((b.clone(), 1)),
            }
            acc
        });
        let run_lengths: Vec<usize> = runs.iter().map(|(_, c)| *c).collect();
        assert_eq!(run_lengths, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn zero_weight_endpoint_is_config_error() {
        let s = WeightedRoundRobinSelector::new();
        assert!(matches!(s.configure(&cfg(&[0, 1])), Err(LbError::Config(_))));
    }

    #[test]
    fn excluding_backend_rebuilds_sequence() {
        let s = WeightedRoundRobinSelector::new();
        s.configure(&cfg(&[1, 1])).unwrap();
        let first = s.select_backend(client()).unwrap();
        s.exclude_backend(&first).unwrap();
        for _ in 0..4 {
            assert_ne!(s.select_backend(client()).unwrap(), first);
        }
    }
}

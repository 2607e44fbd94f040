//! Consistent-hash ring: a sorted `hash -> backend` map with `R` virtual
//! replicas per physical backend and successor lookup.
//!
//! Grounded on the original `lb::tcp` ring embedded in
//! `ConsistentHashSelector` (`selectors.hpp`/`selectors.cpp`): insert
//! appends to a physical list and writes `R` replica hashes into the ring;
//! erase sweeps every replica pointing at a backend; select walks to the
//! first entry whose hash is `>= key`, wrapping to the smallest entry.

use crate::models::backend::Backend;
use crate::models::error::LbError;
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash64<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Ordered hash-ring with `replicas` virtual nodes per physical backend.
///
/// Complexity: `insert` is `O(R log N)`, `erase` is `O(R + N)`, `select` is
/// `O(log N)`.
#[derive(Debug, Default)]
pub struct HashRing {
    replicas: usize,
    ring: BTreeMap<u64, Backend>,
    physical: Vec<Backend>,
}

impl HashRing {
    pub fn new(replicas: usize) -> HashRing {
        HashRing {
            replicas,
            ring: BTreeMap::new(),
            physical: Vec::new(),
        }
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn physical_len(&self) -> usize {
        self.physical.len()
    }

    pub fn physical_backends(&self) -> &[Backend] {
        &self.physical
    }

    /// Appends `node` to the physical list and maps `R` replica hashes
    /// `hash(node_string + "#" + i)` onto the ring. Hash collisions
    /// overwrite the prior entry — acceptable, the original notes, because
    /// collision probability is negligible at 64 bits.
    pub fn insert(&mut self, node: Backend) {
        for i in 0..self.replicas {
            let replica_key = format!("{}#{}", node, i);
            self.ring.insert(hash64(&replica_key), node.clone());
        }
        self.physical.push(node);
    }

    /// Removes every ring entry pointing at `node` and drops it from the
    /// physical list. All `R` entries for a backend disappear atomically
    /// from the caller's point of view (single-threaded mutation under the
    /// owning selector's lock).
    pub fn erase(&mut self, node: &Backend) {
        self.ring.retain(|_, v| v != node);
        self.physical.retain(|b| b != node);
    }

    /// Returns the backend mapped to the first ring entry with
    /// `hash >= hash(key_node)`, wrapping to the smallest entry if none
    /// exists (the "successor" rule). Fails with [`LbError::EmptyRing`] if
    /// no physical backends remain.
    pub fn select<T: std::fmt::Display>(&self, key_node: &T) -> Result<Backend, LbError> {
        if self.physical.is_empty() {
            return Err(LbError::EmptyRing);
        }
        let key = hash64(&key_node.to_string());
        let found = self
            .ring
            .range(key..)
            .next()
            .or_else(|| self.ring.iter().next())
            .map(|(_, backend)| backend.clone());
        found.ok_or(LbError::EmptyRing)
    }
}

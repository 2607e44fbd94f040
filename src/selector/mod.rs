//! The selector family: six backend-selection policies behind one trait.
//!
//! Grounded in `kairos-rs::services::load_balancer` (the `LoadBalancer`
//! trait plus round-robin/weighted/ip-hash/least-connections
//! implementations) and in the original `lb::tcp::ISelector` /
//! `DetectSelector`, which adds consistent-hash and least-response-time.

pub mod consistent_hash;
pub mod ip_hash;
pub mod least_connections;
pub mod least_response_time;
pub mod ring;
pub mod round_robin;
pub mod weighted_round_robin;

use crate::models::backend::Backend;
use crate::models::error::LbError;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub use consistent_hash::ConsistentHashSelector;
pub use ip_hash::IpHashSelector;
pub use least_connections::LeastConnectionsSelector;
pub use least_response_time::LeastResponseTimeSelector;
pub use round_robin::RoundRobinSelector;
pub use weighted_round_robin::WeightedRoundRobinSelector;

/// One endpoint entry from `load_balancing.endpoints` in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub url: Option<String>,
    #[serde(default)]
    pub weight: Option<u32>,
}

/// The `load_balancing` section of the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancingConfig {
    pub algorithm: String,
    #[serde(default)]
    pub replicas: Option<usize>,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl LoadBalancingConfig {
    /// Converts `endpoints` into backend values, failing on malformed URLs
    /// or entries that specify neither/both of `ip`/`url`.
    pub fn backends(&self) -> Result<Vec<Backend>, LbError> {
        self.endpoints
            .iter()
            .map(|e| match (&e.ip, &e.port, &e.url) {
                (Some(ip), Some(port), None) => Backend::from_ip_port(ip, *port),
                (None, None, Some(url)) => crate::models::url::Url::parse(url).map(Backend::url),
                _ => Err(LbError::Config(
                    "endpoint must specify exactly one of {ip,port} or {url}".to_string(),
                )),
            })
            .collect()
    }

    /// Weights parallel to [`backends`](Self::backends), defaulting to 1.
    pub fn weights(&self) -> Vec<u32> {
        self.endpoints.iter().map(|e| e.weight.unwrap_or(1)).collect()
    }
}

/// The policy a selector implements, mirroring the original's
/// `SelectorType` enum (extended with the two policies the original's
/// surviving header snapshot dropped but `DetectSelector` still switches
/// on: weighted round robin, ip hash and least response time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    RoundRobin,
    WeightedRoundRobin,
    IpHash,
    ConsistentHash,
    LeastConnections,
    LeastResponseTime,
}

/// Backend-selection policy, safe to call concurrently from any number of
/// sessions via a single shared `Arc<dyn Selector>`.
///
/// `record_disconnect` and `record_response_time` are the selector-facing
/// half of the session's lifecycle feedback (see `proxy::visitor`): every
/// policy gets a no-op default, and only `LeastConnections` /
/// `LeastResponseTime` override the one that matters to it.
pub trait Selector: Send + Sync {
    /// Populates the backend set from the `load_balancing` config node.
    fn configure(&self, config: &LoadBalancingConfig) -> Result<(), LbError>;

    /// Returns a backend by policy. Must be safe under concurrent callers.
    fn select_backend(&self, client: SocketAddr) -> Result<Backend, LbError>;

    /// Permanently removes a backend. Fails with
    /// [`LbError::AllBackendsExcluded`] if it is the last one.
    fn exclude_backend(&self, backend: &Backend) -> Result<(), LbError>;

    fn kind(&self) -> SelectorKind;

    /// Feedback hook fired when a session using `backend` ends. Only
    /// `LeastConnections` gives this teeth (decrement its counter).
    fn record_disconnect(&self, _backend: &Backend) {}

    /// Feedback hook fired with the observed response latency for
    /// `backend`. Only `LeastResponseTime` gives this teeth (EMA update).
    fn record_response_time(&self, _backend: &Backend, _latency: Duration) {}
}

/// Reads `load_balancing.algorithm` and constructs + configures the
/// matching selector. Unknown algorithm names fail with
/// [`LbError::Config`], mirroring the original's `DetectSelector`.
pub fn detect_selector(config: &LoadBalancingConfig) -> Result<Arc<dyn Selector>, LbError> {
    let selector: Arc<dyn Selector> = match config.algorithm.as_str() {
        "round_robin" => Arc::new(RoundRobinSelector::new()),
        "weighted_round_robin" => Arc::new(WeightedRoundRobinSelector::new()),
        "ip_hash" => Arc::new(IpHashSelector::new()),
        "consistent_hash" => {
            let replicas = config.replicas.ok_or_else(|| {
                LbError::Config("consistent_hash requires a replicas field".to_string())
            })?;
            if replicas == 0 {
                return Err(LbError::Config("replicas must be nonzero".to_string()));
            }
            Arc::new(ConsistentHashSelector::new(replicas))
        }
        "least_connections" => Arc::new(LeastConnectionsSelector::new()),
        "least_response_time" => Arc::new(LeastResponseTimeSelector::new(0.9)),
        other => {
            return Err(LbError::Config(format!("unknown balancing algorithm: {other}")));
        }
    };
    selector.configure(config)?;
    Ok(selector)
}

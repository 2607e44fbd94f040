//! Least response time: pick the backend with the lowest exponentially
//! weighted moving average (EMA) of observed response latency.
//!
//! Grounded in the original `lb::tcp` selector family's latency-tracking
//! variant and, for the data structure, the same `priority-queue`-based
//! approach as [`super::least_connections`]. `f64` isn't `Ord`, so
//! priorities are wrapped in `ordered_float::OrderedFloat` the way
//! `other_examples/manifests/harborgrid-justin-caddy` and
//! `other_examples/manifests/eisenzopf-rvoip` do for latency-ranked data.
//!
//! EMA convention: `ema' = (1 - alpha) * ema + alpha * sample`, so a
//! larger `alpha` weighs fresh samples more heavily over history. A
//! backend with no observations yet carries an EMA of zero and is
//! therefore preferred until it has been measured at least once.

use super::{LoadBalancingConfig, Selector, SelectorKind};
use crate::models::backend::Backend;
use crate::models::error::LbError;
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

pub struct LeastResponseTimeSelector {
    alpha: f64,
    ema: Mutex<PriorityQueue<Backend, Reverse<OrderedFloat<f64>>>>,
}

impl LeastResponseTimeSelector {
    pub fn new(alpha: f64) -> LeastResponseTimeSelector {
        LeastResponseTimeSelector {
            alpha,
            ema: Mutex::new(PriorityQueue::new()),
        }
    }
}

impl Selector for LeastResponseTimeSelector {
    fn configure(&self, config: &LoadBalancingConfig) -> Result<(), LbError> {
        let backends = config.backends()?;
        if backends.is_empty() {
            return Err(LbError::Config(
                "least_response_time requires at least one endpoint".to_string(),
            ));
        }
        let mut ema = self.ema.lock().unwrap();
        for backend in backends {
            ema.push(backend, Reverse(OrderedFloat(0.0)));
        }
        Ok(())
    }

    fn select_backend(&self, _client: SocketAddr) -> Result<Backend, LbError> {
        let ema = self.ema.lock().unwrap();
        let (backend, _) = ema.peek().ok_or(LbError::AllBackendsExcluded)?;
        Ok(backend.clone())
    }

    fn exclude_backend(&self, backend: &Backend) -> Result<(), LbError> {
        let mut ema = self.ema.lock().unwrap();
        if ema.iter().filter(|(b, _)| *b != backend).count() == 0 {
            return Err(LbError::AllBackendsExcluded);
        }
        ema.remove(backend);
        Ok(())
    }

    fn kind(&self) -> SelectorKind {
        SelectorKind::LeastResponseTime
    }

    fn record_response_time(&self, backend: &Backend, latency: Duration) {
        let sample = latency.as_secs_f64();
        let mut ema = self.ema.lock().unwrap();
        if let Some(&Reverse(OrderedFloat(current))) = ema.get_priority(backend) {
            let updated = (1.0 - self.alpha) * current + self.alpha * sample;
            ema.change_priority(backend, Reverse(OrderedFloat(updated)));
        }
    }
}

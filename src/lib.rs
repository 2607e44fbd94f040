//! A reverse proxy / load balancer: one TCP acceptor, a pluggable
//! backend-selection policy, and a serial HTTP/1.1 forwarding session per
//! connection.

pub mod acceptor;
pub mod config;
pub mod logs;
pub mod models;
pub mod proxy;
pub mod runtime;
pub mod selector;

pub use models::{Backend, LbError, Url};
pub use runtime::Runtime;

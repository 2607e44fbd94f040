//! Connection handling: resolve, connect, and forward one TCP session at
//! a time. Grounded in the original's `lb::tcp` namespace
//! (`connector.hpp`, `session.hpp`).

pub mod connector;
pub mod http_message;
pub mod resolver;
pub mod session;
pub mod visitor;

pub use connector::Connector;
pub use session::Session;

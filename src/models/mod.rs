//! Core value types shared across the selector, connector and session layers.

pub mod backend;
pub mod error;
pub mod url;

pub use backend::Backend;
pub use error::LbError;
pub use url::Url;

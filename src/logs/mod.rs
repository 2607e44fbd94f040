//! Structured console logging, configured once at startup.

pub mod logger;

pub use logger::configure_logger;

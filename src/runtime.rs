//! Runtime bootstrap: thread pool sizing and graceful shutdown.
//!
//! Grounded in `kairos-gateway`'s `main.rs` (`tokio::select!` racing the
//! server future against `signal::ctrl_c()`) and the original's
//! `Application::ConfigureThreadPool` (a config-driven `auto`-vs-fixed
//! worker count); tokio's `#[tokio::main]` attribute can't take a
//! runtime-computed thread count, so this crate builds the runtime by
//! hand with `tokio::runtime::Builder` instead.

use crate::acceptor;
use crate::config::settings::ThreadsNumber;
use crate::config::Settings;
use crate::models::error::LbError;
use crate::proxy::Connector;
use crate::selector::detect_selector;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::runtime::Runtime as TokioRuntime;
use tokio_util::sync::CancellationToken;

/// Owns the tokio runtime and runs the acceptor loop to completion.
pub struct Runtime {
    tokio: TokioRuntime,
    settings: Settings,
}

impl Runtime {
    pub fn build(settings: Settings) -> Result<Runtime, LbError> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.enable_all();
        if let ThreadsNumber::Fixed(n) = settings.thread_pool.threads_number {
            builder.worker_threads(n.max(1));
        }
        let tokio = builder
            .build()
            .map_err(|e| LbError::Config(format!("building tokio runtime: {e}")))?;
        Ok(Runtime { tokio, settings })
    }

    /// Runs the proxy until SIGINT/SIGTERM requests a graceful shutdown.
    pub fn run(self) -> Result<(), LbError> {
        self.tokio.block_on(run_until_shutdown(self.settings))
    }
}

async fn run_until_shutdown(settings: Settings) -> Result<(), LbError> {
    let selector = detect_selector(&settings.load_balancing)?;
    let connector = Arc::new(Connector::new(selector));
    let shutdown = CancellationToken::new();

    let ip = if settings.acceptor.ip_version == 6 {
        IpAddr::V6(Ipv6Addr::UNSPECIFIED)
    } else {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    };
    let addr = SocketAddr::new(ip, settings.acceptor.port);

    let acceptor_shutdown = shutdown.clone();
    let acceptor_task = tokio::spawn(acceptor::run(addr, connector, acceptor_shutdown));

    wait_for_shutdown_signal().await;
    log::info!("shutdown signal received, draining connections");
    shutdown.cancel();

    match acceptor_task.await {
        Ok(result) => result,
        Err(e) => Err(LbError::Config(format!("acceptor task panicked: {e}"))),
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("installing SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

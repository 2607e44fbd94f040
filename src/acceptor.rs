//! The TCP accept loop.
//!
//! Grounded in the original's `Acceptor::DoAccept`, which re-arms itself
//! recursively from inside its own completion handler. Tokio's listener
//! already offers a plain blocking `accept().await` in a loop, which is
//! that same "always listening" shape without the recursive callback
//! machinery.

use crate::models::error::LbError;
use crate::proxy::Connector;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Binds `addr` and hands every accepted connection to `connector`, until
/// `shutdown` is triggered.
pub async fn run(
    addr: std::net::SocketAddr,
    connector: Arc<Connector>,
    shutdown: CancellationToken,
) -> Result<(), LbError> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on {addr}");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                log::info!("acceptor on {addr} shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, peer)) => {
                        log::info!("accepted {peer}");
                        let connector = connector.clone();
                        tokio::spawn(async move {
                            if let Err(e) = connector.make_and_run_session(socket).await {
                                log::warn!("failed to start session for {peer}: {e}");
                            }
                        });
                    }
                    Err(e) => {
                        log::error!("acceptor error: {e}");
                    }
                }
            }
        }
    }
}

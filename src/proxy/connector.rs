//! Connects to a selected backend and hands the paired sockets off to a
//! session.
//!
//! Grounded in the original's `Connector::MakeAndRunSession`: select a
//! backend, connect (resolving first for URL backends), and on
//! `ConnectionRefused` exclude that backend and recurse to pick another
//! one — `async_connect`'s recursive-callback retry becomes a `Box::pin`
//! recursive `async fn` here, the idiomatic tokio equivalent.

use super::resolver::resolve;
use super::session::Session;
use super::visitor::SessionVisitor;
use crate::models::backend::Backend;
use crate::models::error::LbError;
use crate::selector::Selector;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpStream;

pub struct Connector {
    selector: Arc<dyn Selector>,
}

impl Connector {
    pub fn new(selector: Arc<dyn Selector>) -> Connector {
        Connector { selector }
    }

    /// Picks a backend for `client`, connects to it (retrying on refusal
    /// by excluding the backend and picking again), and spawns a session
    /// running the forwarding loop. Returns once the session's task has
    /// been spawned, not once it finishes.
    pub async fn make_and_run_session(&self, client: TcpStream) -> Result<(), LbError> {
        let peer = client.peer_addr()?;
        let (server, backend) = self.connect_with_retry(peer).await?;
        let visitor = SessionVisitor::new(self.selector.clone(), backend);
        let session = Session::new(client, server, visitor);
        tokio::spawn(async move {
            if let Err(e) = session.run().await {
                log::warn!("session ended with error: {e}");
            }
        });
        Ok(())
    }

    fn connect_with_retry(
        &self,
        client_addr: std::net::SocketAddr,
    ) -> Pin<Box<dyn Future<Output = Result<(TcpStream, Backend), LbError>> + Send + '_>> {
        Box::pin(async move {
            let backend = self.selector.select_backend(client_addr)?;
            match self.connect_to(&backend).await {
                Ok(stream) => Ok((stream, backend)),
                Err(e) if matches!(e, LbError::ConnectionRefused) => {
                    log::warn!("connection refused by {backend}, excluding it");
                    self.selector.exclude_backend(&backend)?;
                    self.connect_with_retry(client_addr).await
                }
                Err(e) => Err(e),
            }
        })
    }

    async fn connect_to(&self, backend: &Backend) -> Result<TcpStream, LbError> {
        match backend {
            Backend::Endpoint(addr) => connect_refusal_aware(*addr).await,
            Backend::UrlRef(url) => {
                let candidates = resolve(url.hostname(), url.port()).await?;
                let mut last_err = None;
                for addr in candidates {
                    match connect_refusal_aware(addr).await {
                        Ok(stream) => return Ok(stream),
                        Err(e) => last_err = Some(e),
                    }
                }
                Err(last_err.unwrap_or_else(|| LbError::Connect(format!("no addresses resolved for {url}"))))
            }
        }
    }
}

async fn connect_refusal_aware(addr: std::net::SocketAddr) -> Result<TcpStream, LbError> {
    TcpStream::connect(addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::ConnectionRefused {
            LbError::ConnectionRefused
        } else {
            LbError::Connect(format!("connecting to {addr}: {e}"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::round_robin::RoundRobinSelector;
    use crate::selector::{EndpointConfig, LoadBalancingConfig};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn connects_to_a_listening_backend() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let selector = Arc::new(RoundRobinSelector::new());
        selector
            .configure(&LoadBalancingConfig {
                algorithm: "round_robin".to_string(),
                replicas: None,
                endpoints: vec![EndpointConfig {
                    ip: Some(addr.ip().to_string()),
                    port: Some(addr.port()),
                    url: None,
                    weight: None,
                }],
            })
            .unwrap();

        let connector = Connector::new(selector);
        let stream = connector.connect_to(&Backend::endpoint(addr)).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap(), addr);
    }

    #[tokio::test]
    async fn excludes_refusing_backend_and_retries_the_next_one() {
        let good_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let good_addr = good_listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = good_listener.accept().await;
        });

        // Bind-then-drop to get a port nothing listens on, guaranteeing refusal.
        let dead_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = dead_listener.local_addr().unwrap();
        drop(dead_listener);

        let selector = Arc::new(RoundRobinSelector::new());
        selector
            .configure(&LoadBalancingConfig {
                algorithm: "round_robin".to_string(),
                replicas: None,
                endpoints: vec![
                    EndpointConfig {
                        ip: Some(dead_addr.ip().to_string()),
                        port: Some(dead_addr.port()),
                        url: None,
                        weight: None,
                    },
                    EndpointConfig {
                        ip: Some(good_addr.ip().to_string()),
                        port: Some(good_addr.port()),
                        url: None,
                        weight: None,
                    },
                ],
            })
            .unwrap();

        let connector = Connector::new(selector);
        let (stream, backend) = connector.connect_with_retry(good_addr).await.unwrap();
        assert_eq!(backend, Backend::endpoint(good_addr));
        assert_eq!(stream.peer_addr().unwrap(), good_addr);
    }
}

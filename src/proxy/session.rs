//! The forwarding session: one TCP connection's request/response loop.
//!
//! The original's `HttpSession` runs two independent beast read/write
//! chains (`ClientRead`/`ServerRead`) that each loop forever on their own
//! socket. A single tokio task can just as well own both sockets and walk
//! the forwarding steps in order — read a request, forward it, read the
//! matching response, forward it back, then loop — which is the serial
//! state machine this module implements: idle, read request, forward
//! request, read response, forward response, back to idle. Teardown
//! (`Cancel`/`~HttpSession`) becomes dropping both owned halves, which
//! closes the sockets the same way the original's explicit
//! `shutdown`+`close` pair does.

use super::http_message::{read_message, write_message};
use super::visitor::SessionVisitor;
use crate::models::error::LbError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::io::BufReader;
use tokio::net::TcpStream;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Owns the client and server sockets for one forwarded connection.
pub struct Session {
    id: u64,
    client: TcpStream,
    server: TcpStream,
    visitor: SessionVisitor,
}

impl Session {
    pub fn new(client: TcpStream, server: TcpStream, visitor: SessionVisitor) -> Session {
        Session {
            id: generate_id(),
            client,
            server,
            visitor,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Runs the forwarding loop until the client disconnects or an
    /// unexpected I/O error occurs. Clean teardown (client EOF, reset,
    /// abort) returns `Ok(())`; anything else propagates as `Err`.
    pub async fn run(mut self) -> Result<(), LbError> {
        let id = self.id;
        self.visitor.on_connect();
        let result = self.forward().await;
        self.visitor.on_disconnect();
        match result {
            Ok(()) => {
                log::debug!("sid:{id} session closed");
                Ok(())
            }
            Err(e) if e.is_expected_teardown() => {
                log::debug!("sid:{id} session closed: {e}");
                Ok(())
            }
            Err(e) => {
                log::warn!("sid:{id} session error: {e}");
                Err(e)
            }
        }
    }

    async fn forward(&mut self) -> Result<(), LbError> {
        let (client_read, mut client_write) = self.client.split();
        let (server_read, mut server_write) = self.server.split();
        let mut client_reader = BufReader::new(client_read);
        let mut server_reader = BufReader::new(server_read);

        loop {
            let request = read_message(&mut client_reader).await?;
            write_message(&mut server_write, &request).await?;

            let start = Instant::now();
            let response = read_message(&mut server_reader).await?;
            let latency = start.elapsed();
            self.visitor.on_response_receive(latency);

            write_message(&mut client_write, &response).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::visitor::SessionVisitor;
    use crate::selector::round_robin::RoundRobinSelector;
    use crate::selector::{EndpointConfig, LoadBalancingConfig, Selector};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connect = TcpStream::connect(addr);
        let (accept, connect) = tokio::join!(listener.accept(), connect);
        (accept.unwrap().0, connect.unwrap())
    }

    #[tokio::test]
    async fn forwards_one_request_response_round_trip() {
        let (client_side_a, client_side_b) = pair().await;
        let (server_side_a, server_side_b) = pair().await;

        let selector = Arc::new(RoundRobinSelector::new());
        selector
            .configure(&LoadBalancingConfig {
                algorithm: "round_robin".to_string(),
                replicas: None,
                endpoints: vec![EndpointConfig {
                    ip: Some("127.0.0.1".to_string()),
                    port: Some(1),
                    url: None,
                    weight: None,
                }],
            })
            .unwrap();
        let backend = selector.select_backend("10.0.0.1:1".parse().unwrap()).unwrap();
        let visitor = SessionVisitor::new(selector, backend);

        let session = Session::new(client_side_a, server_side_a, visitor);
        let handle = tokio::spawn(session.run());

        let mut upstream = server_side_b;
        let mut downstream = client_side_b;

        downstream
            .write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();

        let mut buf = vec![0u8; 1024];
        let n = upstream.read(&mut buf).await.unwrap();
        assert!(String::from_utf8_lossy(&buf[..n]).starts_with("GET / HTTP/1.1"));

        upstream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
            .await
            .unwrap();

        let mut buf = vec![0u8; 1024];
        let n = downstream.read(&mut buf).await.unwrap();
        assert!(String::from_utf8_lossy(&buf[..n]).starts_with("HTTP/1.1 200 OK"));

        drop(downstream);
        let result = tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}

//! Shared helpers for integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Bytes sent before the host misbehaves; far fewer than announced
pub const PARTIAL_BODY: &[u8] = b"\x89PNG\r\n\x1a\npart";

/// What the host does after sending the first bytes of the body
#[derive(Debug, Clone, Copy)]
pub enum AfterPartialBody {
    /// Closes the connection before `Content-Length` is reached
    Close,
    /// Keeps the connection open without sending anything else
    Stall,
}

/// An image host that announces a 100 kB body and never delivers it
pub struct TruncatingHost {
    pub base_url: String,
    connections: Arc<AtomicUsize>,
}

impl TruncatingHost {
    pub async fn start(after: AfterPartialBody) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    // Consume the request head
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }

                    let response_head = "HTTP/1.1 200 OK\r\n\
                                         Content-Type: image/png\r\n\
                                         Content-Length: 100000\r\n\r\n";
                    if socket.write_all(response_head.as_bytes()).await.is_err()
                        || socket.write_all(PARTIAL_BODY).await.is_err()
                    {
                        return;
                    }
                    let _ = socket.flush().await;

                    match after {
                        AfterPartialBody::Close => {
                            let _ = socket.shutdown().await;
                        }
                        AfterPartialBody::Stall => {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                        }
                    }
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            connections,
        }
    }

    /// Raw URL of a photo served by this host
    pub fn raw_url(&self, id: &str) -> String {
        format!("{}/images/{}?ixid=abc", self.base_url, id)
    }

    /// Number of connections accepted so far
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

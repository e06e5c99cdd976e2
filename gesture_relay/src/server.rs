//! WebSocket server.
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /`, `GET /ws` | WebSocket; one text message per dispatched gesture |
//! | `GET /healthz` | `{"status": "ok", "peers": N}` |

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, trace, warn};

use hand_gesture::Transport;

use crate::hub::PeerHub;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8765;

pub fn router(hub: Arc<PeerHub>) -> Router {
    Router::new()
        .route("/", get(websocket_handler))
        .route("/ws", get(websocket_handler))
        .route("/healthz", get(health_check))
        .with_state(hub)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, hub: Arc<PeerHub>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(hub))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health_check(State(hub): State<Arc<PeerHub>>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "peers": hub.peer_count() }))
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(hub): State<Arc<PeerHub>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, hub))
}

async fn handle_websocket(socket: WebSocket, hub: Arc<PeerHub>) {
    let (mut sender, mut receiver) = socket.split();
    let (peer_id, mut rx) = hub.on_peer_connected();

    // Hub → socket
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    // Socket → nowhere; clients only listen.  Watch for close/errors.
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => trace!(peer = %peer_id, %text, "ignoring inbound text"),
                Ok(Message::Close(_)) => {
                    debug!(peer = %peer_id, "close frame received");
                    break;
                }
                Err(e) => {
                    warn!(peer = %peer_id, error = %e, "websocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.on_peer_disconnected(&peer_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    async fn start() -> (SocketAddr, Arc<PeerHub>, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hub = Arc::new(PeerHub::new());
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        tokio::spawn(serve(listener, Arc::clone(&hub), async {
            let _ = stop_rx.await;
        }));
        (addr, hub, stop_tx)
    }

    /// Read until `buf` contains `needle` followed by at least `extra` bytes.
    async fn read_past(stream: &mut TcpStream, buf: &mut Vec<u8>, needle: &[u8], extra: usize) -> usize {
        loop {
            if let Some(pos) = buf.windows(needle.len()).position(|w| w == needle) {
                let end = pos + needle.len();
                if buf.len() >= end + extra {
                    return end;
                }
            }
            let mut chunk = [0u8; 1024];
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed early");
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    #[tokio::test]
    async fn health_reports_peer_count() {
        let (addr, _hub, _stop) = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut body = String::new();
        timeout(Duration::from_secs(5), stream.read_to_string(&mut body))
            .await
            .unwrap()
            .unwrap();
        assert!(body.starts_with("HTTP/1.1 200"));
        assert!(body.contains(r#""peers":0"#));
    }

    #[tokio::test]
    async fn websocket_client_receives_broadcast_label() {
        let (addr, hub, _stop) = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"GET / HTTP/1.1\r\n\
                  Host: localhost\r\n\
                  Connection: Upgrade\r\n\
                  Upgrade: websocket\r\n\
                  Sec-WebSocket-Version: 13\r\n\
                  Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\r\n",
            )
            .await
            .unwrap();

        let mut buf = Vec::new();
        timeout(Duration::from_secs(5), read_past(&mut stream, &mut buf, b"\r\n\r\n", 0))
            .await
            .unwrap();
        assert!(buf.starts_with(b"HTTP/1.1 101"));

        timeout(Duration::from_secs(5), async {
            while hub.peer_count() == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        hub.broadcast("FIST");

        // Unmasked text frame: FIN|text, length 4, payload.
        let header_end = timeout(
            Duration::from_secs(5),
            read_past(&mut stream, &mut buf, b"\r\n\r\n", 6),
        )
        .await
        .unwrap();
        assert_eq!(&buf[header_end..header_end + 6], &[0x81, 0x04, b'F', b'I', b'S', b'T']);
    }

    #[tokio::test]
    async fn dropped_connection_unregisters_peer() {
        let (addr, hub, _stop) = start().await;
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"GET /ws HTTP/1.1\r\n\
                  Host: localhost\r\n\
                  Connection: Upgrade\r\n\
                  Upgrade: websocket\r\n\
                  Sec-WebSocket-Version: 13\r\n\
                  Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\r\n",
            )
            .await
            .unwrap();
        let mut buf = Vec::new();
        timeout(Duration::from_secs(5), read_past(&mut stream, &mut buf, b"\r\n\r\n", 0))
            .await
            .unwrap();
        timeout(Duration::from_secs(5), async {
            while hub.peer_count() == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        drop(stream);

        timeout(Duration::from_secs(5), async {
            while hub.peer_count() != 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }
}

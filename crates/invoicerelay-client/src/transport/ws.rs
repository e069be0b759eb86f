//! WebSocket connector over `tokio-tungstenite`.
//!
//! Each open socket gets one pump task that:
//! - writes queued outbound frames
//! - forwards inbound text frames as `TransportEvent::Text`
//! - runs the close handshake once the owner drops the outbound queue
//! - always finishes with exactly one `TransportEvent::Closed`

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use invoicerelay_core::error::{RelayError, Result};

use super::{Connector, Socket, TransportEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for the peer's close frame after we sent ours.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self, url: &str) -> Result<Socket> {
        install_crypto_provider();
        let (ws, _resp) = connect_async(url)
            .await
            .map_err(|e| RelayError::Transport(format!("websocket connect: {e}")))?;

        let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<TransportEvent>();
        tokio::spawn(pump(ws, out_rx, in_tx));

        Ok(Socket {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}

/// `wss` needs a process-wide rustls provider. Installing twice is a no-op.
fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn close_event(frame: Option<CloseFrame>) -> TransportEvent {
    match frame {
        Some(f) => TransportEvent::Closed {
            code: Some(u16::from(f.code)),
            reason: f.reason.as_str().to_owned(),
        },
        None => TransportEvent::Closed {
            code: None,
            reason: String::new(),
        },
    }
}

async fn pump(
    ws: WsStream,
    mut out_rx: mpsc::UnboundedReceiver<String>,
    in_tx: mpsc::UnboundedSender<TransportEvent>,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let closed = loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(text) => {
                        if let Err(e) = ws_tx.send(Message::text(text)).await {
                            let _ = in_tx.send(TransportEvent::Error(format!("write failed: {e}")));
                            break TransportEvent::Closed { code: None, reason: "write failed".into() };
                        }
                    }
                    None => {
                        // owner let go: close handshake, then wait for the peer's close
                        let _ = ws_tx.send(Message::Close(None)).await;
                        let peer = tokio::time::timeout(CLOSE_GRACE, async {
                            while let Some(Ok(msg)) = ws_rx.next().await {
                                if let Message::Close(frame) = msg {
                                    return frame;
                                }
                            }
                            None
                        })
                        .await
                        .unwrap_or(None);
                        break close_event(peer);
                    }
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(t))) => {
                        if in_tx.send(TransportEvent::Text(t.as_str().to_owned())).is_err() {
                            // owner dropped the receiving side; nothing left to deliver to
                            let _ = ws_tx.send(Message::Close(None)).await;
                            return;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => break close_event(frame),
                    Some(Ok(Message::Binary(b))) => {
                        tracing::debug!(bytes_len = b.len(), "ignoring binary frame");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let _ = in_tx.send(TransportEvent::Error(e.to_string()));
                        break TransportEvent::Closed { code: None, reason: e.to_string() };
                    }
                    None => break TransportEvent::Closed { code: None, reason: "stream ended".into() },
                }
            }
        }
    };

    let _ = in_tx.send(closed);
}

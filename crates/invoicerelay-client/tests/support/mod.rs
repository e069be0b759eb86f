//! In-memory transport shared by the channel tests.
//!
//! `MockConnector` plays the server side: every accepted open hands a `Peer`
//! to the test, which can push frames, read what the client sent, and close.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;

use invoicerelay_client::channel::{ChannelClient, TokenSupplier};
use invoicerelay_client::config::ChannelConfig;
use invoicerelay_client::transport::{Connector, Socket, TransportEvent};
use invoicerelay_core::error::{RelayError, Result};

/// How the next `open` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Accept,
    Refuse,
    /// Never resolves; only a disconnect gets the caller out.
    Hang,
}

struct MockState {
    plan: VecDeque<Plan>,
    fallback: Plan,
    opens: Vec<(String, Instant)>,
}

pub struct MockConnector {
    state: Mutex<MockState>,
    peers_tx: mpsc::UnboundedSender<Peer>,
}

impl MockConnector {
    pub fn new() -> (Arc<Self>, Peers) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            state: Mutex::new(MockState {
                plan: VecDeque::new(),
                fallback: Plan::Accept,
                opens: Vec::new(),
            }),
            peers_tx,
        });
        (connector, Peers { rx: peers_rx })
    }

    /// Queue behaviours for the next opens, in order.
    pub fn plan(&self, plans: &[Plan]) {
        self.state.lock().unwrap().plan.extend(plans.iter().copied());
    }

    /// Behaviour once the queue is empty.
    pub fn fallback(&self, plan: Plan) {
        self.state.lock().unwrap().fallback = plan;
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().unwrap().opens.len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.state.lock().unwrap().opens.iter().map(|(u, _)| u.clone()).collect()
    }

    /// Gaps between consecutive opens, in milliseconds.
    pub fn gaps_ms(&self) -> Vec<u128> {
        let st = self.state.lock().unwrap();
        st.opens
            .windows(2)
            .map(|w| (w[1].1 - w[0].1).as_millis())
            .collect()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(&self, url: &str) -> Result<Socket> {
        let plan = {
            let mut st = self.state.lock().unwrap();
            st.opens.push((url.to_owned(), Instant::now()));
            let fallback = st.fallback;
            st.plan.pop_front().unwrap_or(fallback)
        };

        match plan {
            Plan::Refuse => Err(RelayError::Transport("connection refused".into())),
            Plan::Hang => std::future::pending::<Result<Socket>>().await,
            Plan::Accept => {
                let (out_tx, out_rx) = mpsc::unbounded_channel();
                let (in_tx, in_rx) = mpsc::unbounded_channel();
                let _ = self.peers_tx.send(Peer {
                    url: url.to_owned(),
                    to_client: in_tx,
                    from_client: out_rx,
                });
                Ok(Socket {
                    outbound: out_tx,
                    inbound: in_rx,
                })
            }
        }
    }
}

/// Accepted connections, in accept order.
pub struct Peers {
    rx: mpsc::UnboundedReceiver<Peer>,
}

impl Peers {
    pub async fn next(&mut self) -> Peer {
        within(self.rx.recv()).await.expect("connector dropped")
    }

    pub fn try_next(&mut self) -> Option<Peer> {
        self.rx.try_recv().ok()
    }
}

/// Server side of one accepted socket.
pub struct Peer {
    pub url: String,
    to_client: mpsc::UnboundedSender<TransportEvent>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl Peer {
    pub fn push(&self, frame: Value) {
        self.push_raw(&frame.to_string());
    }

    pub fn push_raw(&self, frame: &str) {
        let _ = self.to_client.send(TransportEvent::Text(frame.to_owned()));
    }

    pub fn error(&self, msg: &str) {
        let _ = self.to_client.send(TransportEvent::Error(msg.to_owned()));
    }

    pub fn close(&self, code: u16) {
        let _ = self.to_client.send(TransportEvent::Closed {
            code: Some(code),
            reason: String::new(),
        });
    }

    /// Next frame the client sent, parsed as JSON.
    pub async fn recv(&mut self) -> Value {
        let frame = within(self.from_client.recv())
            .await
            .expect("client closed the socket");
        serde_json::from_str(&frame).expect("client sent invalid json")
    }

    /// Frame already sent, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }

    /// Resolves once the client has dropped its end.
    pub async fn closed_by_client(&mut self) {
        loop {
            if within(self.from_client.recv()).await.is_none() {
                return;
            }
        }
    }
}

pub fn test_config(max_reconnect_attempts: u32) -> ChannelConfig {
    ChannelConfig {
        base_url: "ws://relay.test/ws".into(),
        max_reconnect_attempts,
        base_reconnect_delay_ms: 1000,
    }
}

pub fn client(connector: &Arc<MockConnector>) -> ChannelClient {
    client_with(&test_config(5), connector, Arc::new(|| Some("tok".to_owned())))
}

pub fn client_with(
    cfg: &ChannelConfig,
    connector: &Arc<MockConnector>,
    tokens: TokenSupplier,
) -> ChannelClient {
    ChannelClient::with_connector(cfg, tokens, connector.clone())
}

/// Let every ready task run. With a paused clock nothing scheduled later fires.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Fail instead of hanging when something never happens.
pub async fn within<F: std::future::Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(300), fut)
        .await
        .expect("timed out")
}

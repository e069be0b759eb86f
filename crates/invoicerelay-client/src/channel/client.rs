//! Channel client: one logical connection, reconnected with backoff.
//!
//! Lifecycle:
//! - `connect` opens a socket and spawns a reader task for it
//! - the reader dispatches frames in arrival order, then reports the close
//! - every close not caused by `disconnect` schedules a reconnect timer
//! - `disconnect` cancels the timer, aborts a pending open, and closes the socket
//!
//! Each socket carries a generation number. Events from a superseded socket
//! are ignored, so a late close can never schedule a duplicate reconnect.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use invoicerelay_core::error::{RelayError, Result};
use invoicerelay_core::Envelope;

use crate::channel::backoff::Backoff;
use crate::channel::registry::{ListenerRegistry, ListenerResult, Subscription};
use crate::config::ChannelConfig;
use crate::transport::{codec, endpoint_url, Connector, Socket, TransportEvent, WsConnector};

/// Credential source, called once per connection attempt.
pub type TokenSupplier = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Connecting => "connecting",
            Status::Open => "open",
            Status::Closing => "closing",
            Status::Closed => "closed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct CloseInfo {
    code: Option<u16>,
    reason: String,
}

struct ConnState {
    endpoint: Option<String>,
    socket: Option<mpsc::UnboundedSender<String>>,
    generation: u64,
    reconnect_attempts: u32,
    should_reconnect: bool,
    /// Pending reconnect, tagged with the generation whose close scheduled it.
    reconnect_timer: Option<(u64, JoinHandle<()>)>,
}

struct Inner {
    base_url: String,
    backoff: Backoff,
    connector: Arc<dyn Connector>,
    tokens: TokenSupplier,
    registry: Arc<ListenerRegistry>,
    status: watch::Sender<Status>,
    shutdown: watch::Sender<bool>,
    state: Mutex<ConnState>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some((_, timer)) = self.state.get_mut().reconnect_timer.take() {
            timer.abort();
        }
    }
}

/// Reconnecting publish/subscribe client for one endpoint.
///
/// Clones share the same connection and listeners. Background tasks only hold
/// weak references, so dropping the last clone tears everything down.
#[derive(Clone)]
pub struct ChannelClient {
    inner: Arc<Inner>,
}

impl ChannelClient {
    /// Client over the WebSocket transport.
    pub fn new<T>(cfg: &ChannelConfig, tokens: T) -> Self
    where
        T: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self::with_connector(cfg, Arc::new(tokens), Arc::new(WsConnector::new()))
    }

    pub fn with_connector(
        cfg: &ChannelConfig,
        tokens: TokenSupplier,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (status, _) = watch::channel(Status::Idle);
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                base_url: cfg.base_url.clone(),
                backoff: Backoff::from_config(cfg),
                connector,
                tokens,
                registry: Arc::new(ListenerRegistry::new()),
                status,
                shutdown,
                state: Mutex::new(ConnState {
                    endpoint: None,
                    socket: None,
                    generation: 0,
                    reconnect_attempts: 0,
                    should_reconnect: true,
                    reconnect_timer: None,
                }),
            }),
        }
    }

    /// Open the channel to `endpoint` and wait until the socket is open.
    ///
    /// Fails with `ConnectionInProgress` while another attempt is pending,
    /// `Disconnected` after [`disconnect`](Self::disconnect), and `Transport`
    /// when the open fails or is aborted. A failed open still counts as a
    /// close, so it schedules a reconnect like any other unexpected close.
    pub async fn connect(&self, endpoint: &str) -> Result<()> {
        let generation = {
            let mut st = self.inner.state.lock();
            if !st.should_reconnect {
                return Err(RelayError::Disconnected);
            }
            let status = *self.inner.status.borrow();
            match status {
                Status::Connecting => return Err(RelayError::ConnectionInProgress),
                Status::Open if st.endpoint.as_deref() == Some(endpoint) => return Ok(()),
                _ => {}
            }
            if let Some((_, timer)) = st.reconnect_timer.take() {
                timer.abort();
            }
            st.generation += 1;
            // an open socket to another endpoint is replaced, not reused
            st.socket = None;
            st.endpoint = Some(endpoint.to_owned());
            self.inner.status.send_replace(Status::Connecting);
            st.generation
        };

        let token = (self.inner.tokens)();
        let url = match endpoint_url(&self.inner.base_url, endpoint, token.as_deref()) {
            Ok(url) => url,
            Err(e) => {
                self.inner.abandon(generation);
                return Err(e);
            }
        };

        tracing::info!(endpoint, path = url.path(), generation, "connecting");

        let mut shutdown = self.inner.shutdown.subscribe();
        let opened = tokio::select! {
            res = self.inner.connector.open(url.as_str()) => res,
            _ = shutdown.wait_for(|stop| *stop) => {
                Err(RelayError::Transport("connect aborted by disconnect".into()))
            }
        };

        match opened {
            Ok(socket) => Inner::on_open(&self.inner, generation, endpoint, socket),
            Err(e) => {
                tracing::error!(endpoint, error = %e, "connect failed");
                Inner::on_close(
                    &self.inner,
                    generation,
                    CloseInfo {
                        code: None,
                        reason: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    /// Stop for good: no more reconnects, pending timer cancelled, socket closed.
    /// Safe to call any number of times, from any state.
    pub fn disconnect(&self) {
        let mut st = self.inner.state.lock();
        let first = st.should_reconnect;
        st.should_reconnect = false;
        self.inner.shutdown.send_replace(true);

        if let Some((_, timer)) = st.reconnect_timer.take() {
            timer.abort();
        }

        match st.socket.take() {
            // dropping the outbound queue starts the close handshake;
            // the reader moves us to `closed` once the transport confirms
            Some(outbound) => {
                drop(outbound);
                self.inner.status.send_replace(Status::Closing);
            }
            None => {
                let status = *self.inner.status.borrow();
                if status != Status::Closing {
                    st.generation += 1;
                    self.inner.status.send_replace(Status::Closed);
                }
            }
        }

        if first {
            tracing::info!(endpoint = st.endpoint.as_deref().unwrap_or("-"), "disconnected");
        }
    }

    /// Register `handler` for `kind`. Handlers for one kind run in registration order.
    pub fn on<F>(&self, kind: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Envelope) -> ListenerResult + Send + Sync + 'static,
    {
        self.inner.registry.insert(kind, handler)
    }

    /// Fire-and-forget send. Dropped with a warning unless the channel is open.
    pub fn send(&self, env: &Envelope) {
        let st = self.inner.state.lock();
        let status = *self.inner.status.borrow();

        let outbound = match (&st.socket, status) {
            (Some(outbound), Status::Open) => outbound,
            _ => {
                let err = RelayError::SendWhileClosed {
                    kind: env.kind.clone(),
                };
                tracing::warn!(code = err.code().as_str(), %status, error = %err, "dropping outbound message");
                return;
            }
        };

        match codec::encode(env) {
            Ok(text) => {
                if outbound.send(text).is_err() {
                    tracing::warn!(kind = %env.kind, "transport writer gone, message dropped");
                }
            }
            Err(e) => tracing::error!(kind = %env.kind, error = %e, "encode failed"),
        }
    }

    pub fn status(&self) -> Status {
        *self.inner.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<Status> {
        self.inner.status.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == Status::Open
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.state.lock().reconnect_attempts
    }

    pub fn endpoint(&self) -> Option<String> {
        self.inner.state.lock().endpoint.clone()
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.inner.registry.listener_count(kind)
    }

    fn should_reconnect(&self) -> bool {
        self.inner.state.lock().should_reconnect
    }
}

impl Inner {
    fn on_open(inner: &Arc<Inner>, generation: u64, endpoint: &str, socket: Socket) -> Result<()> {
        let Socket { outbound, inbound } = socket;

        let mut st = inner.state.lock();
        if st.generation != generation || !st.should_reconnect {
            // superseded while opening; dropping `outbound` closes the new socket
            return Err(RelayError::Transport("connect aborted".into()));
        }
        st.socket = Some(outbound);
        st.reconnect_attempts = 0;
        inner.status.send_replace(Status::Open);
        drop(st);

        tokio::spawn(read_loop(Arc::downgrade(inner), generation, inbound));
        tracing::info!(endpoint, generation, "channel open");
        Ok(())
    }

    /// Attempt ended before any socket existed (e.g. bad URL). No reconnect.
    fn abandon(&self, generation: u64) {
        let st = self.state.lock();
        if st.generation == generation {
            self.status.send_replace(Status::Closed);
        }
    }

    fn deliver(&self, generation: u64, frame: &str) {
        if *self.shutdown.borrow() || self.state.lock().generation != generation {
            return;
        }
        match codec::decode(frame) {
            Ok(env) => {
                self.registry.dispatch(&env);
            }
            Err(e) => {
                tracing::warn!(code = e.code().as_str(), error = %e, "dropping inbound frame");
            }
        }
    }

    /// The single place that decides whether to reconnect.
    fn on_close(inner: &Arc<Inner>, generation: u64, close: CloseInfo) {
        let mut st = inner.state.lock();
        if st.generation != generation {
            tracing::debug!(generation, "ignoring close of superseded socket");
            return;
        }
        st.socket = None;
        inner.status.send_replace(Status::Closed);

        let endpoint = st.endpoint.clone().unwrap_or_default();
        tracing::info!(endpoint = %endpoint, code = ?close.code, reason = %close.reason, "channel closed");

        if !st.should_reconnect {
            return;
        }
        if !inner.backoff.allows(st.reconnect_attempts) {
            tracing::warn!(
                endpoint = %endpoint,
                attempts = st.reconnect_attempts,
                "reconnect attempts exhausted, staying closed"
            );
            return;
        }

        st.reconnect_attempts += 1;
        let attempt = st.reconnect_attempts;
        let delay = inner.backoff.delay(attempt);
        tracing::info!(
            endpoint = %endpoint,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "scheduling reconnect"
        );

        let weak = Arc::downgrade(inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else { return };
            {
                // once fired, this task is no longer a cancellable timer
                let mut st = inner.state.lock();
                let ours = matches!(st.reconnect_timer, Some((scheduled_by, _)) if scheduled_by == generation);
                if !ours {
                    return;
                }
                st.reconnect_timer = None;
            }

            let client = ChannelClient { inner };
            if !client.should_reconnect() {
                return;
            }
            if let Err(e) = client.connect(&endpoint).await {
                tracing::warn!(endpoint = %endpoint, attempt, error = %e, "reconnect failed");
            }
        });

        if let Some((_, stale)) = st.reconnect_timer.replace((generation, timer)) {
            stale.abort();
        }
    }
}

async fn read_loop(
    inner: Weak<Inner>,
    generation: u64,
    mut inbound: mpsc::UnboundedReceiver<TransportEvent>,
) {
    let close = loop {
        let Some(event) = inbound.recv().await else {
            break CloseInfo {
                code: None,
                reason: "transport dropped".into(),
            };
        };
        let Some(strong) = inner.upgrade() else { return };

        match event {
            TransportEvent::Text(frame) => strong.deliver(generation, &frame),
            TransportEvent::Error(e) => {
                let err = RelayError::Transport(e);
                tracing::warn!(code = err.code().as_str(), error = %err, generation, "socket error");
            }
            TransportEvent::Closed { code, reason } => break CloseInfo { code, reason },
        }
    };

    if let Some(strong) = inner.upgrade() {
        Inner::on_close(&strong, generation, close);
    }
}

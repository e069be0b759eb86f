//! Transport layer (WebSocket).
//!
//! The channel never touches a concrete socket type. It talks to a
//! [`Connector`] that hands back a [`Socket`]: a pair of queues, outbound text
//! frames one way and [`TransportEvent`]s the other. Dropping the outbound
//! half asks the transport to close.

pub mod codec;
pub mod endpoint;
pub mod ws;

use async_trait::async_trait;
use tokio::sync::mpsc;

use invoicerelay_core::error::Result;

pub use endpoint::endpoint_url;
pub use ws::WsConnector;

/// What the transport reports for an open socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One inbound text frame.
    Text(String),
    /// Socket error. A `Closed` event follows.
    Error(String),
    /// Socket is gone. Always the last event.
    Closed { code: Option<u16>, reason: String },
}

/// One open duplex connection, exclusively owned by a channel client.
#[derive(Debug)]
pub struct Socket {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Opens sockets. Implemented by [`WsConnector`] and by in-memory test doubles.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Resolves once the socket is open.
    async fn open(&self, url: &str) -> Result<Socket>;
}

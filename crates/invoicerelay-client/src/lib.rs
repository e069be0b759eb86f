//! invoicerelay client library entry.
//!
//! This crate wires the config loader, the WebSocket transport, the
//! reconnecting channel client and the endpoint adapters into one stack. It is
//! consumed by the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod adapters;
pub mod channel;
pub mod config;
pub mod transport;

pub use adapters::{InsightChannel, InvoiceChannel, NotificationChannel};
pub use channel::{ChannelClient, Status, Subscription};

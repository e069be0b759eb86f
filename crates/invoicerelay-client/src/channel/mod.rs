//! Reconnecting publish/subscribe channel.
//!
//! Exposes the channel client, its listener registry, and the reconnect
//! backoff schedule.

pub mod backoff;
pub mod client;
pub mod registry;

pub use backoff::Backoff;
pub use client::{ChannelClient, Status, TokenSupplier};
pub use registry::{ListenerRegistry, ListenerResult, Subscription};

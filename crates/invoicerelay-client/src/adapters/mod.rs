//! Endpoint adapters.
//!
//! Each adapter owns one [`ChannelClient`] bound to a fixed endpoint and
//! narrows the kind-keyed registry to typed helpers. All connection and
//! dispatch logic stays in the client.

mod insights;
mod invoices;
mod notifications;

pub use insights::InsightChannel;
pub use invoices::InvoiceChannel;
pub use notifications::NotificationChannel;

use serde::de::DeserializeOwned;

use invoicerelay_core::Envelope;

use crate::channel::{ChannelClient, ListenerResult, Subscription};

/// Register `handler` for `kind`, decoding each envelope into `T` first.
/// A payload that does not decode counts as a failure of that listener.
fn on_typed<T, F>(client: &ChannelClient, kind: &'static str, handler: F) -> Subscription
where
    T: DeserializeOwned + 'static,
    F: Fn(T) -> ListenerResult + Send + Sync + 'static,
{
    client.on(kind, move |env: &Envelope| {
        let event: T = env.decode()?;
        handler(event)
    })
}

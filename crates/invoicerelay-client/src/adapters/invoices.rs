use serde_json::json;

use invoicerelay_core::error::Result;
use invoicerelay_core::protocol::events::{
    endpoints, kinds, InvoiceEvent, ServerError, SubscriptionConfirmed,
};
use invoicerelay_core::Envelope;

use crate::channel::{ChannelClient, ListenerResult, Subscription};
use crate::config::ChannelConfig;

use super::on_typed;

/// Invoice state events on the `invoices` endpoint.
pub struct InvoiceChannel {
    client: ChannelClient,
}

impl InvoiceChannel {
    pub fn new<T>(cfg: &ChannelConfig, tokens: T) -> Self
    where
        T: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self::with_client(ChannelClient::new(cfg, tokens))
    }

    pub fn with_client(client: ChannelClient) -> Self {
        Self { client }
    }

    pub async fn connect_to_invoices(&self) -> Result<()> {
        self.client.connect(endpoints::INVOICES).await
    }

    pub fn on_invoice_updated<F>(&self, handler: F) -> Subscription
    where
        F: Fn(InvoiceEvent) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::INVOICE_UPDATED, handler)
    }

    pub fn on_invoice_status_changed<F>(&self, handler: F) -> Subscription
    where
        F: Fn(InvoiceEvent) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::INVOICE_STATUS_CHANGED, handler)
    }

    pub fn on_ai_processing_complete<F>(&self, handler: F) -> Subscription
    where
        F: Fn(InvoiceEvent) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::AI_PROCESSING_COMPLETE, handler)
    }

    pub fn on_subscription_confirmed<F>(&self, handler: F) -> Subscription
    where
        F: Fn(SubscriptionConfirmed) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::SUBSCRIPTION_CONFIRMED, handler)
    }

    pub fn on_server_error<F>(&self, handler: F) -> Subscription
    where
        F: Fn(ServerError) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::ERROR, handler)
    }

    /// Ask the server for events about one invoice.
    pub fn subscribe_to_invoice(&self, invoice_id: &str) {
        self.client.send(&invoice_command(kinds::SUBSCRIBE_INVOICE, invoice_id));
    }

    pub fn unsubscribe_from_invoice(&self, invoice_id: &str) {
        self.client.send(&invoice_command(kinds::UNSUBSCRIBE_INVOICE, invoice_id));
    }

    pub fn client(&self) -> &ChannelClient {
        &self.client
    }

    pub fn disconnect(&self) {
        self.client.disconnect();
    }
}

// The id goes both under `data` and at the top level; servers read either.
fn invoice_command(kind: &str, invoice_id: &str) -> Envelope {
    Envelope::new(kind)
        .with_data(json!({ "invoice_id": invoice_id }))
        .with_field("invoice_id", json!(invoice_id))
}

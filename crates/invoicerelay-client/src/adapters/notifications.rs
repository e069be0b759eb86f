use invoicerelay_core::error::Result;
use invoicerelay_core::protocol::events::{endpoints, kinds, NotificationEvent};

use crate::channel::{ChannelClient, ListenerResult, Subscription};
use crate::config::ChannelConfig;

use super::on_typed;

/// User notifications on the `notifications` endpoint.
pub struct NotificationChannel {
    client: ChannelClient,
}

impl NotificationChannel {
    pub fn new<T>(cfg: &ChannelConfig, tokens: T) -> Self
    where
        T: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self::with_client(ChannelClient::new(cfg, tokens))
    }

    pub fn with_client(client: ChannelClient) -> Self {
        Self { client }
    }

    pub async fn connect_to_notifications(&self) -> Result<()> {
        self.client.connect(endpoints::NOTIFICATIONS).await
    }

    pub fn on_new_notification<F>(&self, handler: F) -> Subscription
    where
        F: Fn(NotificationEvent) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::NEW_NOTIFICATION, handler)
    }

    pub fn on_notification_read<F>(&self, handler: F) -> Subscription
    where
        F: Fn(NotificationEvent) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::NOTIFICATION_READ, handler)
    }

    pub fn client(&self) -> &ChannelClient {
        &self.client
    }

    pub fn disconnect(&self) {
        self.client.disconnect();
    }
}

use invoicerelay_core::error::Result;
use invoicerelay_core::protocol::events::{endpoints, kinds, InsightEvent};

use crate::channel::{ChannelClient, ListenerResult, Subscription};
use crate::config::ChannelConfig;

use super::on_typed;

/// AI insight events on the `ai-insights` endpoint.
pub struct InsightChannel {
    client: ChannelClient,
}

impl InsightChannel {
    pub fn new<T>(cfg: &ChannelConfig, tokens: T) -> Self
    where
        T: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self::with_client(ChannelClient::new(cfg, tokens))
    }

    pub fn with_client(client: ChannelClient) -> Self {
        Self { client }
    }

    pub async fn connect_to_insights(&self) -> Result<()> {
        self.client.connect(endpoints::AI_INSIGHTS).await
    }

    pub fn on_new_insight<F>(&self, handler: F) -> Subscription
    where
        F: Fn(InsightEvent) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::NEW_INSIGHT, handler)
    }

    pub fn on_anomaly_detected<F>(&self, handler: F) -> Subscription
    where
        F: Fn(InsightEvent) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::ANOMALY_DETECTED, handler)
    }

    pub fn on_prediction_updated<F>(&self, handler: F) -> Subscription
    where
        F: Fn(InsightEvent) -> ListenerResult + Send + Sync + 'static,
    {
        on_typed(&self.client, kinds::PREDICTION_UPDATED, handler)
    }

    pub fn client(&self) -> &ChannelClient {
        &self.client
    }

    pub fn disconnect(&self) {
        self.client.disconnect();
    }
}

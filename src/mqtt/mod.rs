pub mod homeassistant;
pub mod topics;

use std::future::Future;

use rumqttc::{AsyncClient, QoS};

pub const PAYLOAD_ON: &str = "on";
pub const PAYLOAD_OFF: &str = "off";
pub const PAYLOAD_ONLINE: &str = "online";
pub const PAYLOAD_OFFLINE: &str = "offline";

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct BusError(#[from] rumqttc::ClientError);

/// One planned outbound message. Presence, discovery and job-outcome
/// reporting all build ordered lists of these before touching the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

impl Publication {
    /// A message the broker stores and replays to new subscribers.
    pub fn retained(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain: true,
        }
    }

    pub fn transient(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain: false,
        }
    }
}

/// Publish/subscribe capability handed out to components. Connecting,
/// reconnecting and closing the session stay with the session supervisor.
pub trait Bus: Clone + Send + Sync + 'static {
    fn publish(
        &self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> impl Future<Output = Result<(), BusError>> + Send;

    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), BusError>> + Send;
}

impl Bus for AsyncClient {
    async fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<(), BusError> {
        AsyncClient::publish(self, topic, QoS::AtLeastOnce, retain, payload).await?;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<(), BusError> {
        AsyncClient::subscribe(self, topic, QoS::AtLeastOnce).await?;
        Ok(())
    }
}

/// Publishes a pre-built plan in order. Delivery failures are logged rather
/// than propagated; the broker's retained store is the durable record, not us.
pub async fn publish_all<B: Bus>(bus: &B, publications: &[Publication]) {
    for publication in publications {
        if let Err(err) = bus
            .publish(&publication.topic, &publication.payload, publication.retain)
            .await
        {
            log::error!("Failed to publish to {}: {}", publication.topic, err);
        }
    }
}

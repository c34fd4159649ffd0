//! Publishes domain events to NATS when a connection is configured.

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    pub fn disabled() -> Self { Self::default() }

    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(%url, "connected to NATS");
                Self::new(Some(client))
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "NATS unavailable, events will not be published");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    /// Never fails the caller: errors are logged.
    pub async fn publish(&self, event: DomainEvent) {
        let Some(client) = &self.nats else {
            tracing::debug!(subject = %event.subject(), "event publishing disabled");
            return;
        };
        let subject = event.subject();
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(%subject, error = %e, "failed to encode event");
                return;
            }
        };
        if let Err(e) = client.publish(subject.clone(), payload.into()).await {
            tracing::warn!(%subject, error = %e, "failed to publish event");
        }
    }
}

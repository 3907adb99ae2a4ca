use async_trait::async_trait;
use uuid::Uuid;

use crate::events::{
    EventDelivery, EventDeliveryAttempt, EventDeliveryStatus, EventPayload, Webhook,
};

#[async_trait]
pub trait DeliveryStore: Send + Sync {
    async fn insert_payload(&self, payload: String) -> anyhow::Result<EventPayload>;
    async fn payload(&self, payload_id: Uuid) -> anyhow::Result<Option<EventPayload>>;

    /// Active webhooks subscribed to `event_type`.
    async fn webhooks_for_event(&self, event_type: &str) -> anyhow::Result<Vec<Webhook>>;
    async fn webhook(&self, webhook_id: Uuid) -> anyhow::Result<Option<Webhook>>;

    /// Writes all deliveries in a single batch.
    async fn insert_deliveries(
        &self,
        deliveries: Vec<EventDelivery>,
    ) -> anyhow::Result<Vec<EventDelivery>>;
    /// Writes the payload and its deliveries together; neither is stored when
    /// either write fails.
    async fn insert_event(
        &self,
        payload: EventPayload,
        deliveries: Vec<EventDelivery>,
    ) -> anyhow::Result<(EventPayload, Vec<EventDelivery>)>;
    async fn delivery(&self, delivery_id: Uuid) -> anyhow::Result<Option<EventDelivery>>;
    async fn save_delivery_status(
        &self,
        delivery_id: Uuid,
        status: EventDeliveryStatus,
    ) -> anyhow::Result<()>;
    /// Removes the delivery; its attempts survive with a cleared reference.
    async fn delete_delivery(&self, delivery_id: Uuid) -> anyhow::Result<()>;

    async fn insert_attempt(
        &self,
        attempt: EventDeliveryAttempt,
    ) -> anyhow::Result<EventDeliveryAttempt>;
    /// Persists duration, response, both header blobs and status.
    async fn save_attempt_outcome(&self, attempt: &EventDeliveryAttempt) -> anyhow::Result<()>;
    async fn attempts(&self, delivery_id: Uuid) -> anyhow::Result<Vec<EventDeliveryAttempt>>;
}

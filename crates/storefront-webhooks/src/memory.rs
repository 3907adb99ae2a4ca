use std::collections::HashMap;

use anyhow::bail;
use async_trait::async_trait;
use storefront_core::{
    DeliveryStore, EventDelivery, EventDeliveryAttempt, EventDeliveryStatus, EventPayload, Webhook,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryDeliveryStore {
    payloads: RwLock<HashMap<Uuid, EventPayload>>,
    webhooks: RwLock<Vec<Webhook>>,
    deliveries: RwLock<HashMap<Uuid, EventDelivery>>,
    attempts: RwLock<Vec<EventDeliveryAttempt>>,
}

impl InMemoryDeliveryStore {
    pub async fn add_webhook(&self, webhook: Webhook) {
        self.webhooks.write().await.push(webhook);
    }

    pub async fn payload_count(&self) -> usize {
        self.payloads.read().await.len()
    }

    pub async fn attempt(&self, attempt_id: Uuid) -> Option<EventDeliveryAttempt> {
        let attempts = self.attempts.read().await;
        attempts.iter().find(|attempt| attempt.id == attempt_id).cloned()
    }
}

#[async_trait]
impl DeliveryStore for InMemoryDeliveryStore {
    async fn insert_payload(&self, payload: String) -> anyhow::Result<EventPayload> {
        let event_payload = EventPayload::new(payload);

        let mut payloads = self.payloads.write().await;
        payloads.insert(event_payload.id, event_payload.clone());

        Ok(event_payload)
    }

    async fn payload(&self, payload_id: Uuid) -> anyhow::Result<Option<EventPayload>> {
        let payloads = self.payloads.read().await;
        Ok(payloads.get(&payload_id).cloned())
    }

    async fn webhooks_for_event(&self, event_type: &str) -> anyhow::Result<Vec<Webhook>> {
        let webhooks = self.webhooks.read().await;
        Ok(webhooks
            .iter()
            .filter(|webhook| webhook.subscribes_to(event_type))
            .cloned()
            .collect())
    }

    async fn webhook(&self, webhook_id: Uuid) -> anyhow::Result<Option<Webhook>> {
        let webhooks = self.webhooks.read().await;
        Ok(webhooks.iter().find(|webhook| webhook.id == webhook_id).cloned())
    }

    async fn insert_deliveries(
        &self,
        deliveries: Vec<EventDelivery>,
    ) -> anyhow::Result<Vec<EventDelivery>> {
        let mut stored = self.deliveries.write().await;
        for delivery in &deliveries {
            stored.insert(delivery.id, delivery.clone());
        }
        Ok(deliveries)
    }

    async fn insert_event(
        &self,
        payload: EventPayload,
        deliveries: Vec<EventDelivery>,
    ) -> anyhow::Result<(EventPayload, Vec<EventDelivery>)> {
        let mut payloads = self.payloads.write().await;
        let mut stored = self.deliveries.write().await;

        if let Some(delivery) = deliveries
            .iter()
            .find(|delivery| delivery.payload_id != payload.id)
        {
            bail!(
                "event delivery {} does not reference payload {}",
                delivery.id,
                payload.id
            );
        }

        payloads.insert(payload.id, payload.clone());
        for delivery in &deliveries {
            stored.insert(delivery.id, delivery.clone());
        }
        Ok((payload, deliveries))
    }

    async fn delivery(&self, delivery_id: Uuid) -> anyhow::Result<Option<EventDelivery>> {
        let deliveries = self.deliveries.read().await;
        Ok(deliveries.get(&delivery_id).cloned())
    }

    async fn save_delivery_status(
        &self,
        delivery_id: Uuid,
        status: EventDeliveryStatus,
    ) -> anyhow::Result<()> {
        let mut deliveries = self.deliveries.write().await;
        let Some(delivery) = deliveries.get_mut(&delivery_id) else {
            bail!("event delivery {delivery_id} not found");
        };
        delivery.status = status;
        Ok(())
    }

    async fn delete_delivery(&self, delivery_id: Uuid) -> anyhow::Result<()> {
        let mut deliveries = self.deliveries.write().await;
        let mut attempts = self.attempts.write().await;

        deliveries.remove(&delivery_id);
        for attempt in attempts.iter_mut() {
            if attempt.delivery_id == Some(delivery_id) {
                attempt.delivery_id = None;
            }
        }
        Ok(())
    }

    async fn insert_attempt(
        &self,
        attempt: EventDeliveryAttempt,
    ) -> anyhow::Result<EventDeliveryAttempt> {
        let mut attempts = self.attempts.write().await;
        attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn save_attempt_outcome(&self, attempt: &EventDeliveryAttempt) -> anyhow::Result<()> {
        let mut attempts = self.attempts.write().await;
        let Some(stored) = attempts.iter_mut().find(|stored| stored.id == attempt.id) else {
            bail!("event delivery attempt {} not found", attempt.id);
        };

        stored.duration = attempt.duration;
        stored.response = attempt.response.clone();
        stored.request_headers = attempt.request_headers.clone();
        stored.response_headers = attempt.response_headers.clone();
        stored.status = attempt.status;
        Ok(())
    }

    async fn attempts(&self, delivery_id: Uuid) -> anyhow::Result<Vec<EventDeliveryAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .iter()
            .filter(|attempt| attempt.delivery_id == Some(delivery_id))
            .cloned()
            .collect())
    }
}

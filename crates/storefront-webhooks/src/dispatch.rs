use anyhow::{Context, Result};
use serde_json::Value;
use storefront_core::{DeliveryStore, EventDelivery, EventDeliveryStatus, EventPayload};
use tracing::{info, warn};
use uuid::Uuid;

use crate::delivery::{
    clear_if_successful, create_attempt, pending_deliveries, update_attempt,
    update_delivery_status,
};
use crate::transport::WebhookTransport;

/// Stores the payload once and fans it out to every subscribed webhook. The
/// payload and its deliveries are written together.
pub async fn trigger_event<S>(
    store: &S,
    event_type: &str,
    payload: &Value,
) -> Result<(EventPayload, Vec<EventDelivery>)>
where
    S: DeliveryStore + ?Sized,
{
    let serialized = serde_json::to_string(payload).context("failed to serialize payload")?;
    let event_payload = EventPayload::new(serialized);
    let webhooks = store.webhooks_for_event(event_type).await?;
    let deliveries = pending_deliveries(&webhooks, &event_payload, event_type);

    let (event_payload, deliveries) = store.insert_event(event_payload, deliveries).await?;
    info!(
        event_type,
        payload_id = %event_payload.id,
        count = deliveries.len(),
        "created event deliveries"
    );

    Ok((event_payload, deliveries))
}

/// Performs one attempt for a delivery and records its outcome.
///
/// Returns `None` when the delivery no longer exists, e.g. it was already
/// sent and cleared by an earlier message.
pub async fn deliver<S, T>(
    store: &S,
    transport: &T,
    delivery_id: Uuid,
    task_id: Option<&str>,
) -> Result<Option<EventDeliveryStatus>>
where
    S: DeliveryStore + ?Sized,
    T: WebhookTransport + ?Sized,
{
    let Some(mut delivery) = store.delivery(delivery_id).await? else {
        warn!(%delivery_id, "event delivery not found; skipping");
        return Ok(None);
    };

    let webhook = match store.webhook(delivery.webhook_id).await? {
        Some(webhook) if webhook.is_active => webhook,
        _ => {
            warn!(
                %delivery_id,
                webhook_id = %delivery.webhook_id,
                "webhook missing or inactive"
            );
            update_delivery_status(store, &mut delivery, EventDeliveryStatus::Failed).await?;
            return Ok(Some(EventDeliveryStatus::Failed));
        }
    };
    let payload_id = delivery.payload_id;
    let payload = store
        .payload(payload_id)
        .await?
        .with_context(|| format!("payload {payload_id} of delivery {delivery_id} not found"))?;

    let mut attempt = create_attempt(store, &delivery, task_id).await?;
    let response = transport.send(&webhook, &delivery.event_type, &payload).await;
    update_attempt(store, &mut attempt, &response).await?;
    update_delivery_status(store, &mut delivery, response.status).await?;
    clear_if_successful(store, &delivery).await?;

    info!(
        %delivery_id,
        webhook_id = %webhook.id,
        status = %response.status,
        duration = response.duration,
        "delivered event"
    );

    Ok(Some(response.status))
}

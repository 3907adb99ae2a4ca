//! Bookkeeping for webhook deliveries and their attempts.
//!
//! A delivery moves from `pending` to `success` or `failed`; transitions are
//! not validated here. Attempts are history and are never removed.

use anyhow::{Context, Result};
use chrono::Utc;
use storefront_core::{
    DeliveryStore, EventDelivery, EventDeliveryAttempt, EventDeliveryStatus, EventPayload,
    Webhook, WebhookResponse,
};
use tracing::{debug, info};
use uuid::Uuid;

/// One pending delivery per webhook, not yet stored.
pub fn pending_deliveries(
    webhooks: &[Webhook],
    event_payload: &EventPayload,
    event_type: &str,
) -> Vec<EventDelivery> {
    let now = Utc::now();
    webhooks
        .iter()
        .map(|webhook| EventDelivery {
            id: Uuid::new_v4(),
            status: EventDeliveryStatus::Pending,
            event_type: event_type.to_string(),
            payload_id: event_payload.id,
            webhook_id: webhook.id,
            created_at: now,
        })
        .collect()
}

/// One pending delivery per webhook, written as a single batch.
pub async fn create_deliveries<S>(
    store: &S,
    webhooks: &[Webhook],
    event_payload: &EventPayload,
    event_type: &str,
) -> Result<Vec<EventDelivery>>
where
    S: DeliveryStore + ?Sized,
{
    if webhooks.is_empty() {
        return Ok(Vec::new());
    }

    let deliveries = pending_deliveries(webhooks, event_payload, event_type);
    let deliveries = store.insert_deliveries(deliveries).await?;
    info!(
        event_type,
        count = deliveries.len(),
        "created event deliveries"
    );

    Ok(deliveries)
}

pub async fn create_attempt<S>(
    store: &S,
    delivery: &EventDelivery,
    task_id: Option<&str>,
) -> Result<EventDeliveryAttempt>
where
    S: DeliveryStore + ?Sized,
{
    let attempt = EventDeliveryAttempt {
        id: Uuid::new_v4(),
        delivery_id: Some(delivery.id),
        task_id: task_id.map(str::to_string),
        duration: None,
        response: None,
        request_headers: None,
        response_headers: None,
        status: EventDeliveryStatus::Pending,
        created_at: Utc::now(),
    };

    store.insert_attempt(attempt).await
}

/// Records the outcome of an attempt and persists only the outcome fields.
/// The response is stored as `{"text": .., "truncated": ..}`.
pub async fn update_attempt<S>(
    store: &S,
    attempt: &mut EventDeliveryAttempt,
    webhook_response: &WebhookResponse,
) -> Result<()>
where
    S: DeliveryStore + ?Sized,
{
    attempt.duration = Some(webhook_response.duration);
    attempt.response = Some(
        serde_json::to_string(&webhook_response.content)
            .context("failed to serialize response body")?,
    );
    attempt.response_headers = Some(
        serde_json::to_string(&webhook_response.response_headers)
            .context("failed to serialize response headers")?,
    );
    attempt.request_headers = Some(
        serde_json::to_string(&webhook_response.request_headers)
            .context("failed to serialize request headers")?,
    );
    attempt.status = webhook_response.status;

    store.save_attempt_outcome(attempt).await?;
    debug!(
        attempt_id = %attempt.id,
        status = %attempt.status,
        duration = webhook_response.duration,
        "recorded delivery attempt"
    );

    Ok(())
}

pub async fn update_delivery_status<S>(
    store: &S,
    delivery: &mut EventDelivery,
    status: EventDeliveryStatus,
) -> Result<()>
where
    S: DeliveryStore + ?Sized,
{
    delivery.status = status;
    store.save_delivery_status(delivery.id, status).await
}

/// Prunes a delivery once it succeeded. Pending and failed deliveries stay
/// for inspection. Returns whether the delivery was removed.
pub async fn clear_if_successful<S>(store: &S, delivery: &EventDelivery) -> Result<bool>
where
    S: DeliveryStore + ?Sized,
{
    if delivery.status != EventDeliveryStatus::Success {
        return Ok(false);
    }

    store.delete_delivery(delivery.id).await?;
    debug!(delivery_id = %delivery.id, "cleared successful delivery");
    Ok(true)
}

use anyhow::Result;
use redis::{AsyncCommands, Client};
use storefront_core::EventDelivery;
use tracing::debug;
use uuid::Uuid;

use crate::contracts::{DELIVERIES_CHANNEL, DeliveryScheduledEvent};

#[derive(Clone)]
pub struct RedisBus {
    client: Client,
}

impl RedisBus {
    pub fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Announces each delivery to the dispatcher over one connection.
    pub async fn schedule_deliveries(&self, deliveries: &[EventDelivery]) -> Result<()> {
        let messages = scheduled_messages(deliveries)?;
        if messages.is_empty() {
            return Ok(());
        }

        let mut connection = self.client.get_multiplexed_async_connection().await?;
        for (delivery_id, message) in messages {
            let receivers: i64 = connection.publish(DELIVERIES_CHANNEL, message).await?;
            debug!(%delivery_id, receivers, "scheduled event delivery");
        }
        Ok(())
    }
}

/// Serialized bus messages for `deliveries`, in order.
pub fn scheduled_messages(deliveries: &[EventDelivery]) -> Result<Vec<(Uuid, String)>> {
    deliveries
        .iter()
        .map(|delivery| {
            let message = serde_json::to_string(&DeliveryScheduledEvent::from(delivery))?;
            Ok((delivery.id, message))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use storefront_core::EventDeliveryStatus;

    use super::*;

    fn delivery(event_type: &str) -> EventDelivery {
        EventDelivery {
            id: Uuid::new_v4(),
            status: EventDeliveryStatus::Pending,
            event_type: event_type.to_string(),
            payload_id: Uuid::new_v4(),
            webhook_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn one_message_per_delivery_in_order() {
        let deliveries = vec![delivery("order_created"), delivery("order_paid")];

        let messages = scheduled_messages(&deliveries).unwrap();

        assert_eq!(messages.len(), 2);
        for ((delivery_id, message), delivery) in messages.iter().zip(&deliveries) {
            assert_eq!(*delivery_id, delivery.id);
            let event: DeliveryScheduledEvent = serde_json::from_str(message).unwrap();
            assert_eq!(event, DeliveryScheduledEvent::from(delivery));
        }
    }

    #[test]
    fn no_deliveries_means_no_messages() {
        assert!(scheduled_messages(&[]).unwrap().is_empty());
    }
}

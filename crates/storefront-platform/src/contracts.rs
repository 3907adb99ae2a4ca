use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_core::{EventDelivery, EventDeliveryAttempt};
use uuid::Uuid;

pub const DELIVERIES_CHANNEL: &str = "webhooks.deliveries";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEventRequest {
    pub event_type: String,
    #[serde(default)]
    pub payload: Value,
}

impl TriggerEventRequest {
    /// The trimmed event type. Blank types are rejected.
    pub fn event_type(&self) -> Result<&str> {
        let event_type = self.event_type.trim();
        if event_type.is_empty() {
            bail!("event_type is required");
        }
        Ok(event_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEventResponse {
    pub payload_id: Uuid,
    pub delivery_ids: Vec<Uuid>,
}

/// Bus message telling the dispatcher a delivery is ready to be sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryScheduledEvent {
    pub delivery_id: Uuid,
    pub event_type: String,
}

impl From<&EventDelivery> for DeliveryScheduledEvent {
    fn from(delivery: &EventDelivery) -> Self {
        Self {
            delivery_id: delivery.id,
            event_type: delivery.event_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryDetailResponse {
    pub delivery: EventDelivery,
    pub attempts: Vec<EventDeliveryAttempt>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

impl ProductSearchQuery {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn text(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSearchHit {
    pub product_id: Uuid,
    pub name: String,
    pub search_rank: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSearchResponse {
    pub hits: Vec<ProductSearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexRequest {
    pub product_ids: Vec<Uuid>,
}

impl ReindexRequest {
    pub const MAX_BATCH: usize = 500;

    pub fn validate(&self) -> Result<()> {
        if self.product_ids.len() > Self::MAX_BATCH {
            bail!(
                "at most {} products can be reindexed at once",
                Self::MAX_BATCH
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexResponse {
    pub updated: usize,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use storefront_core::EventDeliveryStatus;

    use super::*;

    #[test]
    fn search_limit_is_clamped() {
        let query = |limit| ProductSearchQuery { q: None, limit };

        assert_eq!(query(None).limit(), 20);
        assert_eq!(query(Some(0)).limit(), 1);
        assert_eq!(query(Some(500)).limit(), 100);
        assert_eq!(query(Some(35)).limit(), 35);
    }

    #[test]
    fn search_text_is_trimmed() {
        let query = ProductSearchQuery {
            q: Some("  blue shirt ".to_string()),
            limit: None,
        };
        assert_eq!(query.text(), "blue shirt");
        assert_eq!(ProductSearchQuery::default().text(), "");
    }

    #[test]
    fn event_type_is_trimmed_and_required() {
        let request = |event_type: &str| TriggerEventRequest {
            event_type: event_type.to_string(),
            payload: Value::Null,
        };

        assert_eq!(request(" order_created ").event_type().unwrap(), "order_created");
        assert!(request("").event_type().is_err());
        assert!(request("   ").event_type().is_err());
    }

    #[test]
    fn reindex_batch_is_capped() {
        let request = |count| ReindexRequest {
            product_ids: (0..count).map(|_| Uuid::new_v4()).collect(),
        };

        assert!(request(0).validate().is_ok());
        assert!(request(ReindexRequest::MAX_BATCH).validate().is_ok());
        let err = request(ReindexRequest::MAX_BATCH + 1).validate().unwrap_err();
        assert_eq!(err.to_string(), "at most 500 products can be reindexed at once");
    }

    #[test]
    fn scheduled_event_carries_delivery_id_and_type() {
        let delivery = EventDelivery {
            id: Uuid::new_v4(),
            status: EventDeliveryStatus::Pending,
            event_type: "order_created".to_string(),
            payload_id: Uuid::new_v4(),
            webhook_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        let event = DeliveryScheduledEvent::from(&delivery);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["delivery_id"], delivery.id.to_string());
        assert_eq!(json["event_type"], "order_created");
    }
}

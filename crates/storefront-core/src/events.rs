use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::json::JsonTruncText;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventDeliveryStatus {
    Pending,
    Success,
    Failed,
}

impl EventDeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for EventDeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventDeliveryStatus {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::UnknownDeliveryStatus(other.to_string())),
        }
    }
}

/// Synchronous webhook events an app can answer on behalf of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventSyncType {
    PaymentListGateways,
    PaymentProcess,
    ShippingListMethodsForCheckout,
    CheckoutCalculateTaxes,
    OrderCalculateTaxes,
    FetchTaxCodes,
}

impl WebhookEventSyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentListGateways => "payment_list_gateways",
            Self::PaymentProcess => "payment_process",
            Self::ShippingListMethodsForCheckout => "shipping_list_methods_for_checkout",
            Self::CheckoutCalculateTaxes => "checkout_calculate_taxes",
            Self::OrderCalculateTaxes => "order_calculate_taxes",
            Self::FetchTaxCodes => "fetch_tax_codes",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: Uuid,
    pub app_id: i64,
    pub name: String,
    pub target_url: String,
    pub secret_key: Option<String>,
    pub is_active: bool,
    pub events: Vec<String>,
}

impl Webhook {
    pub fn subscribes_to(&self, event_type: &str) -> bool {
        self.is_active && self.events.iter().any(|event| event == event_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: i64,
    pub identifier: String,
    pub name: String,
    pub is_active: bool,
    pub webhooks: Vec<Webhook>,
}

impl App {
    pub fn handles_event(&self, event_type: WebhookEventSyncType) -> bool {
        self.is_active
            && self
                .webhooks
                .iter()
                .any(|webhook| webhook.subscribes_to(event_type.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    pub id: Uuid,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

impl EventPayload {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload: payload.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDelivery {
    pub id: Uuid,
    pub status: EventDeliveryStatus,
    pub event_type: String,
    pub payload_id: Uuid,
    pub webhook_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One HTTP call made for a delivery. The delivery reference is cleared, not
/// cascaded, when the delivery itself is pruned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDeliveryAttempt {
    pub id: Uuid,
    pub delivery_id: Option<Uuid>,
    pub task_id: Option<String>,
    pub duration: Option<f64>,
    pub response: Option<String>,
    pub request_headers: Option<String>,
    pub response_headers: Option<String>,
    pub status: EventDeliveryStatus,
    pub created_at: DateTime<Utc>,
}

/// Outcome of sending a payload to a webhook target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub content: JsonTruncText,
    pub request_headers: BTreeMap<String, String>,
    pub response_headers: BTreeMap<String, String>,
    pub duration: f64,
    pub status: EventDeliveryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn webhook(events: &[&str], is_active: bool) -> Webhook {
        Webhook {
            id: Uuid::new_v4(),
            app_id: 1,
            name: "tax".to_string(),
            target_url: "https://tax.example.com/hook".to_string(),
            secret_key: None,
            is_active,
            events: events.iter().map(|event| event.to_string()).collect(),
        }
    }

    #[test]
    fn status_strings_round_trip_through_from_str() {
        for status in [
            EventDeliveryStatus::Pending,
            EventDeliveryStatus::Success,
            EventDeliveryStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<EventDeliveryStatus>(), Ok(status));
        }
        assert_eq!(
            "retrying".parse::<EventDeliveryStatus>(),
            Err(CoreError::UnknownDeliveryStatus("retrying".to_string()))
        );
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&EventDeliveryStatus::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }

    #[test]
    fn inactive_webhooks_do_not_subscribe() {
        assert!(webhook(&["order_created"], true).subscribes_to("order_created"));
        assert!(!webhook(&["order_created"], false).subscribes_to("order_created"));
        assert!(!webhook(&["order_created"], true).subscribes_to("order_updated"));
    }

    #[test]
    fn inactive_app_handles_nothing() {
        let mut app = App {
            id: 3,
            identifier: "acme.tax".to_string(),
            name: "Acme Tax".to_string(),
            is_active: true,
            webhooks: vec![webhook(&["fetch_tax_codes"], true)],
        };
        assert!(app.handles_event(WebhookEventSyncType::FetchTaxCodes));
        assert!(!app.handles_event(WebhookEventSyncType::OrderCalculateTaxes));

        app.is_active = false;
        assert!(!app.handles_event(WebhookEventSyncType::FetchTaxCodes));
    }
}

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use storefront_core::{EventDeliveryStatus, EventPayload, JsonTruncText, Webhook, WebhookResponse};
use tracing::{debug, warn};

use crate::timing::DurationTimer;

pub const EVENT_TYPE_HEADER: &str = "X-Event-Type";
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Sends the payload. Transport failures are reported as a failed
    /// response rather than an error so they end up in the attempt record.
    async fn send(
        &self,
        webhook: &Webhook,
        event_type: &str,
        payload: &EventPayload,
    ) -> WebhookResponse;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    response_limit: usize,
}

impl HttpTransport {
    pub fn new(timeout: Duration, response_limit: usize) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            response_limit,
        })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn send(
        &self,
        webhook: &Webhook,
        event_type: &str,
        payload: &EventPayload,
    ) -> WebhookResponse {
        let request_headers = request_headers(webhook, event_type, &payload.payload);

        let mut request = self
            .client
            .post(&webhook.target_url)
            .body(payload.payload.clone());
        for (name, value) in &request_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let timer = DurationTimer::start();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(webhook_id = %webhook.id, "webhook request failed: {err}");
                return WebhookResponse {
                    content: JsonTruncText::truncate(&err.to_string(), self.response_limit),
                    request_headers,
                    response_headers: BTreeMap::new(),
                    duration: timer.elapsed_secs(),
                    status: EventDeliveryStatus::Failed,
                };
            }
        };

        let status = if response.status().is_success() {
            EventDeliveryStatus::Success
        } else {
            EventDeliveryStatus::Failed
        };
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await.unwrap_or_else(|err| err.to_string());
        let duration = timer.elapsed_secs();

        let content = JsonTruncText::truncate(&body, self.response_limit);
        if content.truncated {
            debug!(webhook_id = %webhook.id, "truncated webhook response body");
        }

        WebhookResponse {
            content,
            request_headers,
            response_headers,
            duration,
            status,
        }
    }
}

pub fn request_headers(
    webhook: &Webhook,
    event_type: &str,
    payload: &str,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        (EVENT_TYPE_HEADER.to_string(), event_type.to_string()),
    ]);
    if let Some(signature) = webhook
        .secret_key
        .as_deref()
        .and_then(|secret| sign_payload(secret, payload))
    {
        headers.insert(SIGNATURE_HEADER.to_string(), signature);
    }
    headers
}

/// Hex HMAC-SHA256 of the payload keyed with the webhook secret.
pub fn sign_payload(secret: &str, payload: &str) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

use anyhow::{Context, Result};
use futures_util::StreamExt;
use redis::Msg;
use storefront_platform::{
    DELIVERIES_CHANNEL, DeliveryScheduledEvent, PgDeliveryStore, RedisBus, ServiceConfig,
    connect_database,
};
use storefront_webhooks::{HttpTransport, deliver};
use tracing::{error, info};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "storefront_dispatcher=info".to_string()),
        )
        .init();

    let config = ServiceConfig::worker_from_env()?;
    let pool = connect_database(&config).await?;
    let redis = RedisBus::connect(&config.redis_url)?;
    let store = PgDeliveryStore::new(pool);
    let transport = HttpTransport::new(config.webhook_timeout, config.webhook_response_limit)?;

    let mut pubsub = redis.client().get_async_pubsub().await?;
    pubsub.subscribe(DELIVERIES_CHANNEL).await?;
    let mut messages = pubsub.on_message();

    info!("webhook dispatcher subscribed to {DELIVERIES_CHANNEL}");

    loop {
        let msg = messages
            .next()
            .await
            .with_context(|| format!("{DELIVERIES_CHANNEL} stream ended unexpectedly"))?;
        if let Err(err) = handle_message(&store, &transport, msg).await {
            error!("failed to process delivery message: {err:#}");
        }
    }
}

async fn handle_message(
    store: &PgDeliveryStore,
    transport: &HttpTransport,
    msg: Msg,
) -> Result<()> {
    let payload: String = msg.get_payload()?;
    let event: DeliveryScheduledEvent = serde_json::from_str(&payload)?;
    let task_id = Uuid::new_v4().to_string();

    if let Some(status) = deliver(store, transport, event.delivery_id, Some(&task_id)).await? {
        info!(
            delivery_id = %event.delivery_id,
            event_type = %event.event_type,
            %status,
            %task_id,
            "delivery attempt finished"
        );
    }
    Ok(())
}

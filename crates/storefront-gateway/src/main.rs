use std::net::SocketAddr;

use anyhow::Result as AnyResult;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use storefront_core::DeliveryStore;
use storefront_platform::{
    DeliveryDetailResponse, PgCatalogStore, PgDeliveryStore, ProductSearchQuery,
    ProductSearchResponse, RedisBus, ReindexRequest, ReindexResponse, ServiceConfig,
    TriggerEventRequest, TriggerEventResponse, connect_database,
};
use storefront_search::update_products_search_document;
use storefront_webhooks::trigger_event;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
struct AppState {
    deliveries: PgDeliveryStore,
    catalog: PgCatalogStore,
    redis: RedisBus,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "storefront_gateway=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let pool = connect_database(&config).await?;
    let redis = RedisBus::connect(&config.redis_url)?;

    let state = AppState {
        deliveries: PgDeliveryStore::new(pool.clone()),
        catalog: PgCatalogStore::new(pool, config.search_text_config.clone()),
        redis,
    };
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/webhooks/events", post(create_event))
        .route("/webhooks/deliveries/{id}", get(get_delivery))
        .route("/products/search", get(search_products))
        .route("/products/search-index", post(reindex_products))
        .with_state(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("storefront gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<TriggerEventRequest>,
) -> Result<(StatusCode, Json<TriggerEventResponse>), (StatusCode, String)> {
    let event_type = payload.event_type().map_err(invalid_request)?;

    let (event_payload, deliveries) =
        trigger_event(&state.deliveries, event_type, &payload.payload)
            .await
            .map_err(|err| {
                error!("failed to record event {event_type}: {err:#}");
                internal_error(err)
            })?;

    state
        .redis
        .schedule_deliveries(&deliveries)
        .await
        .map_err(|err| {
            error!(payload_id = %event_payload.id, "failed to schedule deliveries: {err:#}");
            internal_error(err)
        })?;

    info!(
        %event_type,
        payload_id = %event_payload.id,
        deliveries = deliveries.len(),
        "event recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(TriggerEventResponse {
            payload_id: event_payload.id,
            delivery_ids: deliveries.iter().map(|delivery| delivery.id).collect(),
        }),
    ))
}

async fn get_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
) -> Result<Json<DeliveryDetailResponse>, (StatusCode, String)> {
    let delivery = state
        .deliveries
        .delivery(delivery_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("event delivery {delivery_id} not found"),
            )
        })?;
    let attempts = state
        .deliveries
        .attempts(delivery_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(DeliveryDetailResponse { delivery, attempts }))
}

async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<ProductSearchQuery>,
) -> Result<Json<ProductSearchResponse>, (StatusCode, String)> {
    let hits = state
        .catalog
        .search_products(query.text(), query.limit())
        .await
        .map_err(|err| {
            error!("product search failed: {err:#}");
            internal_error(err)
        })?;

    Ok(Json(ProductSearchResponse { hits }))
}

async fn reindex_products(
    State(state): State<AppState>,
    Json(payload): Json<ReindexRequest>,
) -> Result<Json<ReindexResponse>, (StatusCode, String)> {
    payload.validate().map_err(invalid_request)?;

    let updated = update_products_search_document(&state.catalog, &payload.product_ids)
        .await
        .map_err(|err| {
            error!("failed to update product search index: {err:#}");
            internal_error(err)
        })?;

    Ok(Json(ReindexResponse { updated }))
}

fn invalid_request(err: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

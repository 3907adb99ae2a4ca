pub mod catalog;
pub mod config;
pub mod contracts;
pub mod db;
pub mod deliveries;
pub mod redis_bus;

pub use catalog::PgCatalogStore;
pub use config::ServiceConfig;
pub use contracts::{
    DELIVERIES_CHANNEL, DeliveryDetailResponse, DeliveryScheduledEvent, ProductSearchHit,
    ProductSearchQuery, ProductSearchResponse, ReindexRequest, ReindexResponse,
    TriggerEventRequest, TriggerEventResponse,
};
pub use db::connect_database;
pub use deliveries::PgDeliveryStore;
pub use redis_bus::RedisBus;

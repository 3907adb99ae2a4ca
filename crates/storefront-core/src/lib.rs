pub mod catalog;
pub mod error;
pub mod events;
pub mod json;
pub mod models;
pub mod storage;

pub use catalog::{
    AssignedAttribute, Attribute, AttributeInputType, AttributeValue, Product, ProductVariant,
};
pub use error::CoreError;
pub use events::{
    App, EventDelivery, EventDeliveryAttempt, EventDeliveryStatus, EventPayload, Webhook,
    WebhookEventSyncType, WebhookResponse,
};
pub use json::JsonTruncText;
pub use models::{
    GatewayConfigLine, GatewayResponse, Money, PaymentData, PaymentGateway, PaymentMethodInfo,
    ShippingMethodData, TaxData, TaxLineData,
};
pub use storage::DeliveryStore;

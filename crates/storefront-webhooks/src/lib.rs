pub mod app_id;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod parsers;
pub mod tax_app;
pub mod timing;
pub mod transport;

pub use app_id::{
    PaymentAppData, ShippingAppData, from_payment_app_id, from_shipping_app_id,
    to_payment_app_id, to_shipping_app_id,
};
pub use delivery::{
    clear_if_successful, create_attempt, create_deliveries, update_attempt,
    update_delivery_status,
};
pub use dispatch::{deliver, trigger_event};
pub use error::ResponseParseError;
pub use memory::InMemoryDeliveryStore;
pub use parsers::{
    parse_list_payment_gateways_response, parse_list_shipping_methods_response,
    parse_payment_action_response, parse_tax_codes, parse_tax_data,
};
pub use tax_app::current_tax_app;
pub use timing::DurationTimer;
pub use transport::{HttpTransport, WebhookTransport};

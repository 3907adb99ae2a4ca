use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use storefront_core::App;

use crate::error::ResponseParseError;

pub const APP_ID_PREFIX: &str = "app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAppData {
    pub app_pk: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAppData {
    pub app_pk: i64,
    pub shipping_method_id: String,
}

pub fn to_payment_app_id(app: &App, gateway_id: &str) -> String {
    format!("{APP_ID_PREFIX}:{}:{gateway_id}", app.id)
}

pub fn to_shipping_app_id(app: &App, shipping_method_id: &str) -> String {
    STANDARD.encode(format!("{APP_ID_PREFIX}:{}:{shipping_method_id}", app.id))
}

pub fn try_from_payment_app_id(
    app_gateway_id: &str,
) -> Result<PaymentAppData, ResponseParseError> {
    let (app_pk, name) = split_app_id(app_gateway_id)?;
    Ok(PaymentAppData {
        app_pk,
        name: name.to_string(),
    })
}

pub fn from_payment_app_id(app_gateway_id: &str) -> Option<PaymentAppData> {
    try_from_payment_app_id(app_gateway_id).ok()
}

pub fn try_from_shipping_app_id(
    shipping_app_id: &str,
) -> Result<ShippingAppData, ResponseParseError> {
    let invalid = || ResponseParseError::InvalidAppId(shipping_app_id.to_string());
    let decoded = STANDARD.decode(shipping_app_id).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let (app_pk, shipping_method_id) = split_app_id(&decoded)?;

    Ok(ShippingAppData {
        app_pk,
        shipping_method_id: shipping_method_id.to_string(),
    })
}

pub fn from_shipping_app_id(shipping_app_id: &str) -> Option<ShippingAppData> {
    try_from_shipping_app_id(shipping_app_id).ok()
}

/// Splits `app:<pk>:<id>`; every segment must be present and non-empty.
fn split_app_id(value: &str) -> Result<(i64, &str), ResponseParseError> {
    let invalid = || ResponseParseError::InvalidAppId(value.to_string());
    let segments: Vec<&str> = value.split(':').collect();

    let [prefix, pk, id] = segments.as_slice() else {
        return Err(invalid());
    };
    if *prefix != APP_ID_PREFIX || pk.is_empty() || id.is_empty() {
        return Err(invalid());
    }
    let app_pk = pk.parse::<i64>().map_err(|_| invalid())?;

    Ok((app_pk, *id))
}

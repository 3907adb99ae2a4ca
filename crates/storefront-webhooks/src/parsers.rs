//! Parsers for responses returned by payment, shipping and tax apps.
//!
//! Every parser follows the same contract: the `try_*` form reports why a
//! response was rejected, the plain form never fails and yields `None` (or an
//! empty list) for anything malformed.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use storefront_core::{
    App, GatewayConfigLine, GatewayResponse, Money, PaymentData, PaymentGateway,
    PaymentMethodInfo, ShippingMethodData, TaxData, TaxLineData,
};
use tracing::debug;

use crate::app_id::{to_payment_app_id, to_shipping_app_id};
use crate::error::ResponseParseError;

type Object = Map<String, Value>;

pub fn try_parse_list_payment_gateways_response(
    response_data: &Value,
    app: &App,
) -> Result<Vec<PaymentGateway>, ResponseParseError> {
    let mut gateways = Vec::new();

    for gateway_data in as_array(response_data, "a list of payment gateways")? {
        let gateway_data = as_object(gateway_data, "a payment gateway object")?;
        let gateway_id = optional_string(gateway_data, "id").unwrap_or_default();
        if gateway_id.is_empty() {
            continue;
        }

        let currencies = gateway_data
            .get("currencies")
            .and_then(Value::as_array)
            .map(|currencies| {
                currencies
                    .iter()
                    .filter_map(|currency| currency.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let config = gateway_data
            .get("config")
            .cloned()
            .and_then(|config| serde_json::from_value::<Vec<GatewayConfigLine>>(config).ok())
            .unwrap_or_default();

        gateways.push(PaymentGateway {
            id: to_payment_app_id(app, &gateway_id),
            name: optional_string(gateway_data, "name"),
            currencies,
            config,
        });
    }

    Ok(gateways)
}

pub fn parse_list_payment_gateways_response(
    response_data: &Value,
    app: &App,
) -> Vec<PaymentGateway> {
    try_parse_list_payment_gateways_response(response_data, app).unwrap_or_else(|err| {
        debug!(app_id = app.id, "discarding payment gateway list: {err}");
        Vec::new()
    })
}

pub fn try_parse_payment_action_response(
    payment_information: &PaymentData,
    response_data: &Value,
    transaction_kind: &str,
) -> Result<GatewayResponse, ResponseParseError> {
    let data = as_object(response_data, "a payment action object")?;

    let error = data
        .get("error")
        .filter(|error| is_truthy(error))
        .map(|error| match error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        });

    let payment_method_info = data
        .get("payment_method")
        .filter(|method| is_truthy(method))
        .and_then(Value::as_object)
        .map(|method| PaymentMethodInfo {
            brand: optional_string(method, "brand"),
            exp_month: optional_integer(method, "exp_month"),
            exp_year: optional_integer(method, "exp_year"),
            last_4: optional_string(method, "last_4"),
            name: optional_string(method, "name"),
            method_type: optional_string(method, "type"),
        });

    let amount = data
        .get("amount")
        .and_then(to_decimal)
        .unwrap_or(payment_information.amount);

    Ok(GatewayResponse {
        is_success: error.is_none(),
        action_required: data.get("action_required").is_some_and(is_truthy),
        kind: optional_string(data, "kind").unwrap_or_else(|| transaction_kind.to_string()),
        amount,
        currency: payment_information.currency.clone(),
        transaction_id: optional_string(data, "transaction_id").unwrap_or_default(),
        error,
        customer_id: optional_string(data, "customer_id"),
        psp_reference: optional_string(data, "psp_reference"),
        action_required_data: data
            .get("action_required_data")
            .filter(|value| !value.is_null())
            .cloned(),
        payment_method_info,
        raw_response: response_data.clone(),
        transaction_already_processed: data
            .get("transaction_already_processed")
            .is_some_and(is_truthy),
    })
}

pub fn parse_payment_action_response(
    payment_information: &PaymentData,
    response_data: &Value,
    transaction_kind: &str,
) -> Option<GatewayResponse> {
    try_parse_payment_action_response(payment_information, response_data, transaction_kind)
        .inspect_err(|err| {
            debug!(
                payment_id = payment_information.payment_id,
                "discarding payment action response: {err}"
            )
        })
        .ok()
}

fn try_parse_tax_line_data(line: &Value) -> Result<TaxLineData, ResponseParseError> {
    let line = as_object(line, "a tax line object")?;

    Ok(TaxLineData {
        id: required_integer(line, "id")?,
        currency: required_string(line, "currency")?,
        unit_net_amount: required_decimal(line, "unit_net_amount")?,
        unit_gross_amount: required_decimal(line, "unit_gross_amount")?,
        total_gross_amount: required_decimal(line, "total_gross_amount")?,
        total_net_amount: required_decimal(line, "total_net_amount")?,
        tax_rate: required_decimal(line, "tax_rate")?,
    })
}

pub fn try_parse_tax_data(response_data: &Value) -> Result<TaxData, ResponseParseError> {
    let data = as_object(response_data, "a tax data object")?;
    let lines = as_array(required(data, "lines")?, "a list of tax lines")?
        .iter()
        .map(try_parse_tax_line_data)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TaxData {
        currency: required_string(data, "currency")?,
        total_net_amount: required_decimal(data, "total_net_amount")?,
        total_gross_amount: required_decimal(data, "total_gross_amount")?,
        subtotal_net_amount: required_decimal(data, "subtotal_net_amount")?,
        subtotal_gross_amount: required_decimal(data, "subtotal_gross_amount")?,
        shipping_price_gross_amount: required_decimal(data, "shipping_price_gross_amount")?,
        shipping_price_net_amount: required_decimal(data, "shipping_price_net_amount")?,
        shipping_tax_rate: required_decimal(data, "shipping_tax_rate")?,
        lines,
    })
}

/// Tax data from a tax app, or `None` when any field is missing or any
/// amount is not a decimal.
pub fn parse_tax_data(response_data: &Value) -> Option<TaxData> {
    try_parse_tax_data(response_data)
        .inspect_err(|err| debug!("discarding tax data: {err}"))
        .ok()
}

pub fn try_parse_list_shipping_methods_response(
    response_data: &Value,
    app: &App,
) -> Result<Vec<ShippingMethodData>, ResponseParseError> {
    as_array(response_data, "a list of shipping methods")?
        .iter()
        .map(|method| {
            let method = as_object(method, "a shipping method object")?;
            let method_id = required_string(method, "id")?;
            let price = Money::new(
                required_decimal(method, "amount")?,
                required_string(method, "currency")?,
            );

            Ok(ShippingMethodData {
                id: to_shipping_app_id(app, &method_id),
                name: optional_string(method, "name"),
                price,
                maximum_delivery_days: optional_integer(method, "maximum_delivery_days"),
            })
        })
        .collect()
}

pub fn parse_list_shipping_methods_response(
    response_data: &Value,
    app: &App,
) -> Vec<ShippingMethodData> {
    try_parse_list_shipping_methods_response(response_data, app).unwrap_or_else(|err| {
        debug!(app_id = app.id, "discarding shipping method list: {err}");
        Vec::new()
    })
}

/// Tax code to description. A missing description falls back to the code
/// itself since some integrations only provide codes.
pub fn try_parse_tax_codes(
    response_tax_data: &Value,
) -> Result<BTreeMap<String, String>, ResponseParseError> {
    let mut tax_types = BTreeMap::new();

    for tax in as_array(response_tax_data, "a list of tax codes")? {
        let tax = as_object(tax, "a tax code object")?;
        let code = optional_string(tax, "code")
            .filter(|code| !code.is_empty())
            .ok_or(ResponseParseError::MissingField("code"))?;
        let description = optional_string(tax, "description")
            .filter(|description| !description.is_empty())
            .unwrap_or_else(|| code.clone());

        tax_types.insert(code, description);
    }

    Ok(tax_types)
}

pub fn parse_tax_codes(response_tax_data: &Value) -> Option<BTreeMap<String, String>> {
    try_parse_tax_codes(response_tax_data)
        .inspect_err(|err| debug!("discarding tax codes: {err}"))
        .ok()
}

fn as_object<'a>(
    value: &'a Value,
    expected: &'static str,
) -> Result<&'a Object, ResponseParseError> {
    value
        .as_object()
        .ok_or(ResponseParseError::UnexpectedShape { expected })
}

fn as_array<'a>(
    value: &'a Value,
    expected: &'static str,
) -> Result<&'a Vec<Value>, ResponseParseError> {
    value
        .as_array()
        .ok_or(ResponseParseError::UnexpectedShape { expected })
}

fn required<'a>(data: &'a Object, field: &'static str) -> Result<&'a Value, ResponseParseError> {
    data.get(field).ok_or(ResponseParseError::MissingField(field))
}

fn required_string(data: &Object, field: &'static str) -> Result<String, ResponseParseError> {
    match required(data, field)? {
        Value::String(value) => Ok(value.clone()),
        Value::Number(value) => Ok(value.to_string()),
        _ => Err(ResponseParseError::InvalidField(field)),
    }
}

fn required_integer(data: &Object, field: &'static str) -> Result<i64, ResponseParseError> {
    to_integer(required(data, field)?).ok_or(ResponseParseError::InvalidField(field))
}

fn required_decimal(data: &Object, field: &'static str) -> Result<Decimal, ResponseParseError> {
    let value = required(data, field)?;
    to_decimal(value).ok_or_else(|| ResponseParseError::InvalidDecimal {
        field,
        value: value.to_string(),
    })
}

fn optional_string(data: &Object, field: &str) -> Option<String> {
    match data.get(field)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn optional_integer(data: &Object, field: &str) -> Option<i64> {
    data.get(field).and_then(to_integer)
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts JSON numbers and numeric strings, including exponent notation.
fn to_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn app() -> App {
        App {
            id: 7,
            identifier: "acme.app".to_string(),
            name: "Acme".to_string(),
            is_active: true,
            webhooks: Vec::new(),
        }
    }

    fn payment() -> PaymentData {
        PaymentData {
            gateway: "app:7:stripe".to_string(),
            amount: Decimal::new(1000, 2),
            currency: "USD".to_string(),
            payment_id: 42,
            graphql_payment_id: "UGF5bWVudDo0Mg==".to_string(),
            customer_email: Some("buyer@example.com".to_string()),
        }
    }

    fn tax_line() -> Value {
        json!({
            "id": 1,
            "currency": "USD",
            "unit_net_amount": "10.00",
            "unit_gross_amount": "12.30",
            "total_gross_amount": "24.60",
            "total_net_amount": "20.00",
            "tax_rate": "23"
        })
    }

    fn tax_data() -> Value {
        json!({
            "currency": "USD",
            "total_net_amount": "30.00",
            "total_gross_amount": "36.90",
            "subtotal_net_amount": "20.00",
            "subtotal_gross_amount": "24.60",
            "shipping_price_gross_amount": "12.30",
            "shipping_price_net_amount": "10.00",
            "shipping_tax_rate": 23,
            "lines": [tax_line()]
        })
    }

    #[test]
    fn gateways_get_app_ids_and_skip_entries_without_id() {
        let response = json!([
            {
                "id": "stripe",
                "name": "Stripe",
                "currencies": ["USD", "EUR"],
                "config": [{"field": "api_key", "value": "pk_test"}]
            },
            {"name": "No id"},
            {"id": "", "name": "Empty id"}
        ]);

        let gateways = parse_list_payment_gateways_response(&response, &app());

        assert_eq!(gateways.len(), 1);
        assert_eq!(gateways[0].id, "app:7:stripe");
        assert_eq!(gateways[0].name.as_deref(), Some("Stripe"));
        assert_eq!(gateways[0].currencies, vec!["USD", "EUR"]);
        assert_eq!(gateways[0].config[0].field, "api_key");
    }

    #[test]
    fn gateway_list_that_is_not_a_list_yields_nothing() {
        assert!(parse_list_payment_gateways_response(&json!({"id": "x"}), &app()).is_empty());
        assert_eq!(
            try_parse_list_payment_gateways_response(&json!([1]), &app()),
            Err(ResponseParseError::UnexpectedShape {
                expected: "a payment gateway object"
            })
        );
    }

    #[test]
    fn payment_action_defaults() {
        let response = json!({"psp_reference": "psp-1"});

        let parsed = parse_payment_action_response(&payment(), &response, "capture").unwrap();

        assert!(parsed.is_success);
        assert!(!parsed.action_required);
        assert_eq!(parsed.kind, "capture");
        assert_eq!(parsed.amount, Decimal::new(1000, 2));
        assert_eq!(parsed.currency, "USD");
        assert_eq!(parsed.transaction_id, "");
        assert_eq!(parsed.psp_reference.as_deref(), Some("psp-1"));
        assert!(parsed.payment_method_info.is_none());
        assert!(!parsed.transaction_already_processed);
        assert_eq!(parsed.raw_response, response);
    }

    #[test]
    fn payment_action_error_marks_failure() {
        let response = json!({"error": "card declined", "kind": "auth"});

        let parsed = parse_payment_action_response(&payment(), &response, "capture").unwrap();

        assert!(!parsed.is_success);
        assert_eq!(parsed.error.as_deref(), Some("card declined"));
        assert_eq!(parsed.kind, "auth");
    }

    #[test]
    fn payment_action_empty_error_is_success() {
        let parsed =
            parse_payment_action_response(&payment(), &json!({"error": ""}), "capture").unwrap();
        assert!(parsed.is_success);
        assert!(parsed.error.is_none());
    }

    #[test]
    fn payment_action_amount_and_method() {
        let response = json!({
            "amount": "7.25",
            "action_required": true,
            "transaction_id": "tx-9",
            "payment_method": {
                "brand": "visa",
                "exp_month": 4,
                "exp_year": "2030",
                "last_4": "4242",
                "type": "card"
            }
        });

        let parsed = parse_payment_action_response(&payment(), &response, "capture").unwrap();

        assert_eq!(parsed.amount, Decimal::new(725, 2));
        assert!(parsed.action_required);
        assert_eq!(parsed.transaction_id, "tx-9");
        let method = parsed.payment_method_info.unwrap();
        assert_eq!(method.brand.as_deref(), Some("visa"));
        assert_eq!(method.exp_month, Some(4));
        assert_eq!(method.exp_year, Some(2030));
        assert_eq!(method.method_type.as_deref(), Some("card"));
    }

    #[test]
    fn payment_action_invalid_amount_keeps_payment_amount() {
        let parsed =
            parse_payment_action_response(&payment(), &json!({"amount": "lots"}), "capture")
                .unwrap();
        assert_eq!(parsed.amount, Decimal::new(1000, 2));
    }

    #[test]
    fn payment_action_rejects_non_object() {
        assert!(parse_payment_action_response(&payment(), &json!("ok"), "capture").is_none());
    }

    #[test]
    fn tax_data_parses_all_fields() {
        let parsed = parse_tax_data(&tax_data()).unwrap();

        assert_eq!(parsed.currency, "USD");
        assert_eq!(parsed.total_gross_amount, Decimal::new(3690, 2));
        assert_eq!(parsed.shipping_tax_rate, Decimal::from(23));
        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.lines[0].id, 1);
        assert_eq!(parsed.lines[0].unit_gross_amount, Decimal::new(1230, 2));
    }

    #[test]
    fn tax_data_missing_total_net_amount_is_none() {
        let mut data = tax_data();
        data.as_object_mut().unwrap().remove("total_net_amount");

        assert_eq!(parse_tax_data(&data), None);
        assert_eq!(
            try_parse_tax_data(&data),
            Err(ResponseParseError::MissingField("total_net_amount"))
        );
    }

    #[test]
    fn tax_data_missing_any_field_is_none() {
        let fields = tax_data().as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        for field in fields {
            let mut data = tax_data();
            data.as_object_mut().unwrap().remove(&field);
            assert_eq!(parse_tax_data(&data), None, "{field}");
        }
    }

    #[test]
    fn tax_data_with_non_decimal_amount_is_none() {
        let mut data = tax_data();
        data["subtotal_net_amount"] = json!("twenty");
        assert_eq!(parse_tax_data(&data), None);

        let mut data = tax_data();
        data["lines"][0]["tax_rate"] = json!(null);
        assert_eq!(parse_tax_data(&data), None);
    }

    #[test]
    fn tax_data_with_broken_line_is_none() {
        let mut data = tax_data();
        data["lines"][0].as_object_mut().unwrap().remove("currency");
        assert_eq!(parse_tax_data(&data), None);

        assert_eq!(parse_tax_data(&json!([])), None);
    }

    #[test]
    fn shipping_methods_get_encoded_ids_and_money() {
        let response = json!([
            {
                "id": "express",
                "name": "Express",
                "amount": 12.5,
                "currency": "EUR",
                "maximum_delivery_days": 2
            }
        ]);

        let methods = parse_list_shipping_methods_response(&response, &app());

        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].id, to_shipping_app_id(&app(), "express"));
        assert_eq!(methods[0].price, Money::new(Decimal::new(125, 1), "EUR"));
        assert_eq!(methods[0].maximum_delivery_days, Some(2));
    }

    #[test]
    fn shipping_methods_missing_amount_rejects_response() {
        let response = json!([{"id": "express", "currency": "EUR"}]);

        assert!(parse_list_shipping_methods_response(&response, &app()).is_empty());
        assert_eq!(
            try_parse_list_shipping_methods_response(&response, &app()),
            Err(ResponseParseError::MissingField("amount"))
        );
    }

    #[test]
    fn tax_codes_default_description_to_code() {
        let response = json!([
            {"code": "P0000000", "description": "Tangible goods"},
            {"code": "FR020100"}
        ]);

        let codes = parse_tax_codes(&response).unwrap();

        assert_eq!(codes["P0000000"], "Tangible goods");
        assert_eq!(codes["FR020100"], "FR020100");
    }

    #[test]
    fn tax_codes_require_list_and_codes() {
        assert_eq!(parse_tax_codes(&json!({"code": "X"})), None);
        assert_eq!(parse_tax_codes(&json!([{"description": "no code"}])), None);
        assert_eq!(parse_tax_codes(&json!([])), Some(BTreeMap::new()));
    }

    #[test]
    fn decimals_accept_numbers_strings_and_exponents() {
        assert_eq!(to_decimal(&json!(3)), Some(Decimal::from(3)));
        assert_eq!(to_decimal(&json!(" 1.50 ")), Some(Decimal::new(150, 2)));
        assert_eq!(to_decimal(&json!("1e2")), Some(Decimal::from(100)));
        assert_eq!(to_decimal(&json!(true)), None);
        assert_eq!(to_decimal(&json!("NaN")), None);
    }
}

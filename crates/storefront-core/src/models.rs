use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Amount in a given currency. Serializes tagged with `"_type": "Money"` so
/// webhook consumers can tell prices apart from plain numbers.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Money", 3)?;
        state.serialize_field("_type", "Money")?;
        state.serialize_field("amount", &self.amount)?;
        state.serialize_field("currency", &self.currency)?;
        state.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfigLine {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentGateway {
    pub id: String,
    pub name: Option<String>,
    pub currencies: Vec<String>,
    pub config: Vec<GatewayConfigLine>,
}

/// Payment being processed, as known by the store before asking the app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentData {
    pub gateway: String,
    pub amount: Decimal,
    pub currency: String,
    pub payment_id: i64,
    pub graphql_payment_id: String,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentMethodInfo {
    pub brand: Option<String>,
    pub exp_month: Option<i64>,
    pub exp_year: Option<i64>,
    pub last_4: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub method_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub is_success: bool,
    pub action_required: bool,
    pub kind: String,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: String,
    pub error: Option<String>,
    pub customer_id: Option<String>,
    pub psp_reference: Option<String>,
    pub action_required_data: Option<Value>,
    pub payment_method_info: Option<PaymentMethodInfo>,
    pub raw_response: Value,
    pub transaction_already_processed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingMethodData {
    pub id: String,
    pub name: Option<String>,
    pub price: Money,
    pub maximum_delivery_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxLineData {
    pub id: i64,
    pub currency: String,
    pub unit_net_amount: Decimal,
    pub unit_gross_amount: Decimal,
    pub total_gross_amount: Decimal,
    pub total_net_amount: Decimal,
    pub tax_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxData {
    pub currency: String,
    pub total_net_amount: Decimal,
    pub total_gross_amount: Decimal,
    pub subtotal_net_amount: Decimal,
    pub subtotal_gross_amount: Decimal,
    pub shipping_price_gross_amount: Decimal,
    pub shipping_price_net_amount: Decimal,
    pub shipping_tax_rate: Decimal,
    pub lines: Vec<TaxLineData>,
}

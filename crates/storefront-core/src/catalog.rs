use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeInputType {
    Dropdown,
    Multiselect,
    File,
    Reference,
    Numeric,
    RichText,
    PlainText,
    Swatch,
    Boolean,
    Date,
    DateTime,
}

impl AttributeInputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dropdown => "dropdown",
            Self::Multiselect => "multiselect",
            Self::File => "file",
            Self::Reference => "reference",
            Self::Numeric => "numeric",
            Self::RichText => "rich-text",
            Self::PlainText => "plain-text",
            Self::Swatch => "swatch",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "date-time",
        }
    }
}

impl FromStr for AttributeInputType {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let input_type = match value {
            "dropdown" => Self::Dropdown,
            "multiselect" => Self::Multiselect,
            "file" => Self::File,
            "reference" => Self::Reference,
            "numeric" => Self::Numeric,
            "rich-text" => Self::RichText,
            "plain-text" => Self::PlainText,
            "swatch" => Self::Swatch,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "date-time" => Self::DateTime,
            other => return Err(CoreError::UnknownInputType(other.to_string())),
        };
        Ok(input_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub input_type: AttributeInputType,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub rich_text: Option<Value>,
    pub date_time: Option<DateTime<Utc>>,
}

/// An attribute assigned to a product or variant together with its chosen
/// values, in assignment order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedAttribute {
    pub attribute: Attribute,
    pub values: Vec<AttributeValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: Uuid,
    pub sku: Option<String>,
    pub name: String,
    pub attributes: Vec<AssignedAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<Value>,
    pub description_plaintext: String,
    pub attributes: Vec<AssignedAttribute>,
    pub variants: Vec<ProductVariant>,
}

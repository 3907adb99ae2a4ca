use thiserror::Error;

/// Why a response from an app could not be turned into a typed record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseParseError {
    #[error("expected {expected} in app response")]
    UnexpectedShape { expected: &'static str },
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' is not a decimal: {value}")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("field '{0}' has an unexpected type")]
    InvalidField(&'static str),
    #[error("invalid app id '{0}'")]
    InvalidAppId(String),
}

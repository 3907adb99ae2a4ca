use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown event delivery status '{0}'")]
    UnknownDeliveryStatus(String),
    #[error("unknown attribute input type '{0}'")]
    UnknownInputType(String),
}

// parking_core/src/error.rs

use thiserror::Error;

/// Failures on the message link between the vehicle and the map provider.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("outgoing queue is full, message dropped")]
    Full,

    #[error("peer endpoint is disconnected")]
    Disconnected,
}

/// A configuration value outside of its allowed range.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid value for `{field}`: {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Reasons a received spot map cannot be adopted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpotMapError {
    #[error("spot id `{0}` appears more than once")]
    DuplicateId(String),

    #[error("spot `{0}` has a non-finite coordinate")]
    NonFiniteCoordinate(String),
}

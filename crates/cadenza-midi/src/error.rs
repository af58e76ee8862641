//! Error types for the MIDI message model.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("unknown message type '{0}'")]
    UnknownType(String),

    #[error("'{message_type}' message has no parameter '{name}'")]
    UnknownParameter {
        message_type: &'static str,
        name: String,
    },

    #[error("cannot decode MIDI bytes: {0}")]
    Decode(String),

    #[error("cannot parse message text: {0}")]
    Text(String),
}

pub type Result<T> = std::result::Result<T, Error>;

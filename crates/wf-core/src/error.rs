//! Error type shared by the workflow canvas crates.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CanvasError {
    #[error("unknown {kind} `{id}`")]
    UnknownObject { kind: &'static str, id: String },

    #[error("malformed object reference `{0}`")]
    MalformedObjectRef(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },
}

impl CanvasError {
    pub fn decode(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            what,
            message: err.to_string(),
        }
    }
}

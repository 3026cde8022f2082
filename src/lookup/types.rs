//! Lookup result types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Street address resolved from a CEP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
}

/// Reasons a lookup produced no address
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The code does not have exactly 8 digits, or the service rejected it
    #[error("invalid CEP '{0}'")]
    InvalidPostalCode(String),

    /// The service has no address for this code
    #[error("CEP {0} not found")]
    NotFound(String),

    /// The request failed or the service answered with an error status
    #[error("lookup request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("invalid lookup response: {0}")]
    Decode(String),
}

impl LookupError {
    /// Returns true if the service answered but had no match
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

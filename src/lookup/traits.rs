//! Trait abstraction for the address lookup service to enable mocking in tests

use async_trait::async_trait;

use super::types::{Address, LookupError};

/// Resolves a CEP to a street address
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Look up an 8-digit, digits-only CEP
    async fn lookup(&self, postal_code: &str) -> Result<Address, LookupError>;
}

//! Address lookup by CEP
//!
//! The form session only talks to the [`AddressLookup`] trait; the HTTP
//! implementation queries the public ViaCEP service.

mod client;
mod traits;
mod types;

pub use client::{ViaCepClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use traits::AddressLookup;
pub use types::{Address, LookupError};

#[cfg(test)]
pub use traits::MockAddressLookup;

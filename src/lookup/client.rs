//! HTTP client for the ViaCEP address service
//!
//! `GET {base_url}/ws/{cep}/json/` answers with the address fields, or with
//! `{"erro": true}` when the CEP does not exist.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::traits::AddressLookup;
use super::types::{Address, LookupError};
use crate::mask;

/// Default lookup service address
pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// ViaCEP response body
///
/// `erro` arrives as a boolean from the current API and as the string
/// `"true"` from older deployments.
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl ViaCepResponse {
    fn is_error(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => s == "true",
            _ => false,
        }
    }
}

/// Client for the ViaCEP address service
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    client: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    /// Create a new client against `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, postal_code: &str) -> String {
        format!("{}/ws/{}/json/", self.base_url, postal_code)
    }
}

#[async_trait]
impl AddressLookup for ViaCepClient {
    async fn lookup(&self, postal_code: &str) -> Result<Address, LookupError> {
        let cep = mask::digits(postal_code);
        if cep.len() != 8 {
            return Err(LookupError::InvalidPostalCode(postal_code.to_string()));
        }

        let url = self.url(&cep);
        debug!(url = %url, "Looking up CEP");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            return Err(LookupError::InvalidPostalCode(cep));
        }
        if !status.is_success() {
            return Err(LookupError::Transport(format!("{url} returned {status}")));
        }

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;

        if body.is_error() {
            return Err(LookupError::NotFound(cep));
        }

        debug!(cep = %cep, city = %body.localidade, state = %body.uf, "CEP resolved");

        Ok(Address {
            street: body.logradouro,
            district: body.bairro,
            city: body.localidade,
            state: body.uf,
        })
    }
}

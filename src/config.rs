//! Configuration handling for the form driver

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::lookup::{ViaCepClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::state::FormVariant;

/// Overrides `lookup_base_url`
pub const LOOKUP_URL_ENV: &str = "CADASTRO_LOOKUP_URL";
/// Overrides `form_variant`
pub const FORM_VARIANT_ENV: &str = "CADASTRO_FORM_VARIANT";

/// User configuration, every field optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CadastroConfig {
    /// Which form to open
    pub form_variant: Option<FormVariant>,
    /// Base URL of the ViaCEP-compatible lookup service
    pub lookup_base_url: Option<String>,
    /// Lookup request timeout in seconds
    pub lookup_timeout_secs: Option<u64>,
}

impl CadastroConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("br", "cadastro", "cadastro")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            _ => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var(LOOKUP_URL_ENV) {
            self.lookup_base_url = Some(url);
        }
        if let Some(variant) = var(FORM_VARIANT_ENV) {
            self.form_variant = Some(
                variant
                    .parse()
                    .with_context(|| format!("Invalid {FORM_VARIANT_ENV}"))?,
            );
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    pub fn variant(&self) -> FormVariant {
        self.form_variant.unwrap_or_default()
    }

    pub fn lookup_base_url(&self) -> &str {
        self.lookup_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Build the lookup client this configuration describes
    pub fn lookup_client(&self) -> Result<ViaCepClient> {
        ViaCepClient::new(self.lookup_base_url(), self.lookup_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CadastroConfig::default();
        assert!(config.form_variant.is_none());
        assert!(config.lookup_base_url.is_none());
        assert!(config.lookup_timeout_secs.is_none());
        assert_eq!(config.variant(), FormVariant::Short);
        assert_eq!(config.lookup_base_url(), "https://viacep.com.br");
        assert_eq!(config.lookup_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_serialization() {
        let config = CadastroConfig {
            form_variant: Some(FormVariant::Extended),
            lookup_base_url: Some("http://localhost:8080".to_string()),
            lookup_timeout_secs: Some(3),
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"extended\""));
        let parsed: CadastroConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.variant(), FormVariant::Extended);
        assert_eq!(parsed.lookup_base_url(), "http://localhost:8080");
        assert_eq!(parsed.lookup_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: CadastroConfig = serde_json::from_str("{}").unwrap();
        assert!(parsed.form_variant.is_none());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Should ignore unknown fields
        let json = r#"{"form_variant": "extended", "unknown_field": "value"}"#;
        let parsed: CadastroConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.form_variant, Some(FormVariant::Extended));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = CadastroConfig {
            form_variant: Some(FormVariant::Short),
            lookup_base_url: Some("http://file".to_string()),
            lookup_timeout_secs: None,
        };
        config
            .apply_env(env(&[
                (LOOKUP_URL_ENV, "http://env"),
                (FORM_VARIANT_ENV, "extended"),
            ]))
            .unwrap();

        assert_eq!(config.lookup_base_url(), "http://env");
        assert_eq!(config.variant(), FormVariant::Extended);
    }

    #[test]
    fn test_env_invalid_variant_is_an_error() {
        let mut config = CadastroConfig::default();
        let err = config
            .apply_env(env(&[(FORM_VARIANT_ENV, "gigantic")]))
            .unwrap_err();
        assert!(err.to_string().contains(FORM_VARIANT_ENV));
    }

    #[test]
    fn test_missing_env_keeps_config() {
        let mut config = CadastroConfig::default();
        config.apply_env(env(&[])).unwrap();
        assert!(config.lookup_base_url.is_none());
    }

    #[test]
    fn test_config_path_returns_option() {
        // Just test that the function doesn't panic
        let _path = CadastroConfig::config_path();
    }

    #[test]
    fn test_lookup_client_builds() {
        assert!(CadastroConfig::default().lookup_client().is_ok());
    }
}

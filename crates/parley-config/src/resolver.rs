//! Service resolution: turns the `[service]` section plus environment into
//! concrete connection settings.

use std::time::Duration;

use crate::secrets::{self, ResolvedSecret};
use crate::{ConfigError, ParleyConfig, Result, ServiceProvider};

/// Fully resolved service connection settings.
#[derive(Debug, Clone)]
pub struct ResolvedService {
    /// Provider flavour.
    pub provider: ServiceProvider,
    /// Base URL override (hosted API only).
    pub base_url: Option<String>,
    /// Azure endpoint (Azure only).
    pub azure_endpoint: Option<String>,
    /// Azure `api-version`.
    pub api_version: String,
    /// Resolved API key.
    pub api_key: ResolvedSecret,
    /// Request timeout.
    pub timeout: Duration,
}

/// Resolve service settings, reading API keys from the process environment.
pub fn resolve_service(config: &ParleyConfig) -> Result<ResolvedService> {
    resolve_service_with(config, |name| std::env::var(name).ok())
}

/// Resolve service settings, reading API keys through `lookup`.
pub fn resolve_service_with(
    config: &ParleyConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedService> {
    let service = config.service();
    let provider = service.provider();

    if provider == ServiceProvider::Azure && service.azure_endpoint.is_none() {
        return Err(ConfigError::MissingField {
            field: "azure_endpoint".to_string(),
            context: "[service] (provider = \"azure\")".to_string(),
        });
    }

    let api_key = secrets::resolve_api_key_with(provider, service.api_key.as_deref(), lookup)
        .ok_or_else(|| ConfigError::ApiKeyNotFound {
            provider: provider.to_string(),
            env_var: provider.env_var().to_string(),
        })?;

    Ok(ResolvedService {
        provider,
        base_url: service.base_url.clone(),
        azure_endpoint: service.azure_endpoint.clone(),
        api_version: service.api_version().to_string(),
        api_key,
        timeout: service.timeout(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretSource;

    #[test]
    fn test_resolve_openai_from_env() {
        let config = ParleyConfig::new();
        let resolved = resolve_service_with(&config, |name| {
            (name == "OPENAI_API_KEY").then(|| "sk-env".to_string())
        })
        .unwrap();

        assert_eq!(resolved.provider, ServiceProvider::OpenAi);
        assert_eq!(resolved.api_key.value, "sk-env");
        assert_eq!(
            resolved.api_key.source,
            SecretSource::EnvVar("OPENAI_API_KEY".to_string())
        );
        assert!(resolved.azure_endpoint.is_none());
    }

    #[test]
    fn test_resolve_azure_requires_endpoint() {
        let config = ParleyConfig::from_toml("[service]\nprovider = \"azure\"\n").unwrap();
        let err = resolve_service_with(&config, |_| Some("k".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field, .. } if field == "azure_endpoint"));
    }

    #[test]
    fn test_resolve_azure_from_env() {
        let mut config = ParleyConfig::new();
        let env = |name: &str| match name {
            "AZURE_OPENAI_ENDPOINT" => Some("https://x.openai.azure.com".to_string()),
            "AZURE_OPENAI_KEY" => Some("azure-key".to_string()),
            _ => None,
        };
        config.apply_env_with(env);

        let resolved = resolve_service_with(&config, env).unwrap();
        assert_eq!(resolved.provider, ServiceProvider::Azure);
        assert_eq!(
            resolved.azure_endpoint.as_deref(),
            Some("https://x.openai.azure.com")
        );
        assert_eq!(resolved.api_key.value, "azure-key");
        assert_eq!(resolved.api_version, crate::DEFAULT_AZURE_API_VERSION);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let config = ParleyConfig::new();
        let err = resolve_service_with(&config, |_| None).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}

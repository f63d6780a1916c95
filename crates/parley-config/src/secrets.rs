//! API key resolution.
//!
//! Resolution order:
//! 1. Environment variable (provider-specific)
//! 2. Config file (with warning)

use crate::ServiceProvider;

/// Result of API key resolution with provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

impl std::fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext, not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve an API key for a provider from the process environment or config.
pub fn resolve_api_key(
    provider: ServiceProvider,
    config_value: Option<&str>,
) -> Option<ResolvedSecret> {
    resolve_api_key_with(provider, config_value, |name| std::env::var(name).ok())
}

/// Resolve an API key, reading environment variables through `lookup`.
pub fn resolve_api_key_with(
    provider: ServiceProvider,
    config_value: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<ResolvedSecret> {
    let env_var = provider.env_var();
    if let Some(value) = lookup(env_var).filter(|v| !v.is_empty()) {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    config_value.map(|v| ResolvedSecret {
        value: v.to_string(),
        source: SecretSource::ConfigFile,
    })
}
